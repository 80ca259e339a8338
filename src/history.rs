//! Per-exercise history relative to a reference point in time

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{normalize_name, Exercise, Workout};

/// Look-back windows, in days, for the rolling averages
pub const ONE_WEEK_DAYS: i64 = 7;
pub const TWO_WEEK_DAYS: i64 = 14;
pub const FOUR_WEEK_DAYS: i64 = 28;

/// One earlier session of an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Sheet label of the workout
    pub date: String,
    pub date_object: NaiveDate,
    pub exercise: Exercise,
}

/// Averages over the sessions inside one look-back window.
/// `None` averages mean "no sessions", not zero volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowAverage {
    pub avg_volume: Option<f64>,
    pub avg_max_weight: Option<f64>,
    pub sessions: usize,
}

impl WindowAverage {
    fn from_sessions(sessions: &[&SessionSnapshot]) -> Self {
        if sessions.is_empty() {
            return WindowAverage {
                avg_volume: None,
                avg_max_weight: None,
                sessions: 0,
            };
        }

        let count = sessions.len() as f64;
        let volume: f64 = sessions.iter().map(|s| s.exercise.volume).sum();
        let max_weight: f64 = sessions.iter().map(|s| s.exercise.max_weight).sum();

        WindowAverage {
            avg_volume: Some((volume / count).round()),
            avg_max_weight: Some((max_weight / count).round()),
            sessions: sessions.len(),
        }
    }
}

/// Historical comparison data for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseHistory {
    pub previous_session: Option<SessionSnapshot>,
    pub one_week_avg: WindowAverage,
    pub two_week_avg: WindowAverage,
    pub four_week_avg: WindowAverage,
    pub all_time_avg: WindowAverage,
}

/// Computes exercise history from a workout collection
pub struct HistoryCalculator;

impl HistoryCalculator {
    /// History anchored at `reference`, or at the current local time when
    /// no reference is given
    pub fn history(
        exercise_name: &str,
        reference: Option<NaiveDateTime>,
        workouts: &[Workout],
    ) -> ExerciseHistory {
        let reference = reference.unwrap_or_else(|| Local::now().naive_local());
        Self::history_at(exercise_name, reference, workouts)
    }

    /// History of `exercise_name` from workouts strictly before `reference`.
    ///
    /// Workout dates count as midnight, so a workout dated on the reference
    /// day is included whenever the reference is later than midnight.
    /// Undated workouts never count.
    pub fn history_at(
        exercise_name: &str,
        reference: NaiveDateTime,
        workouts: &[Workout],
    ) -> ExerciseHistory {
        let sessions = Self::sessions_before(exercise_name, reference, workouts);

        let within = |days: i64| -> Vec<&SessionSnapshot> {
            let cutoff = reference - Duration::days(days);
            sessions
                .iter()
                .filter(|s| start_of_day(s.date_object) >= cutoff)
                .collect()
        };
        let all: Vec<&SessionSnapshot> = sessions.iter().collect();

        ExerciseHistory {
            one_week_avg: WindowAverage::from_sessions(&within(ONE_WEEK_DAYS)),
            two_week_avg: WindowAverage::from_sessions(&within(TWO_WEEK_DAYS)),
            four_week_avg: WindowAverage::from_sessions(&within(FOUR_WEEK_DAYS)),
            all_time_avg: WindowAverage::from_sessions(&all),
            previous_session: sessions.first().cloned(),
        }
    }

    /// Matching sessions before `reference`, newest first
    fn sessions_before(
        exercise_name: &str,
        reference: NaiveDateTime,
        workouts: &[Workout],
    ) -> Vec<SessionSnapshot> {
        let wanted = normalize_name(exercise_name);

        let mut sessions: Vec<SessionSnapshot> = workouts
            .iter()
            .filter_map(|w| {
                let date = w.date_object?;
                if start_of_day(date) >= reference {
                    return None;
                }
                let exercise = w.exercises.iter().find(|e| e.normalized_name() == wanted)?;
                Some(SessionSnapshot {
                    date: w.date.clone(),
                    date_object: date,
                    exercise: exercise.clone(),
                })
            })
            .collect();

        sessions.sort_by(|a, b| b.date_object.cmp(&a.date_object));
        sessions
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Direction of a change between two values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

/// Percent change between a current and a previous value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub percentage: Option<f64>,
    pub direction: Direction,
    /// One decimal place, explicit `+` for increases, `N/A` without a baseline
    pub display: String,
}

impl Change {
    /// Change from `previous` to `current`. A missing or zero baseline gives
    /// `N/A` rather than an infinite percentage.
    pub fn between(current: f64, previous: Option<f64>) -> Self {
        let previous = match previous {
            Some(p) if p != 0.0 => p,
            _ => {
                return Change {
                    percentage: None,
                    direction: Direction::Neutral,
                    display: "N/A".to_string(),
                }
            }
        };

        let percentage = (current - previous) * 100.0 / previous;
        let direction = if percentage > 0.0 {
            Direction::Up
        } else if percentage < 0.0 {
            Direction::Down
        } else {
            Direction::Neutral
        };

        let display = if percentage > 0.0 {
            format!("+{:.1}%", percentage)
        } else {
            format!("{:.1}%", percentage)
        };

        Change {
            percentage: Some(percentage),
            direction,
            display,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

/// Volume and max-weight changes for one metric baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricChanges {
    pub volume: Change,
    pub max_weight: Change,
}

impl MetricChanges {
    fn new(current: &Exercise, volume: Option<f64>, max_weight: Option<f64>) -> Self {
        MetricChanges {
            volume: Change::between(current.volume, volume),
            max_weight: Change::between(current.max_weight, max_weight),
        }
    }

    fn against_window(current: &Exercise, window: &WindowAverage) -> Self {
        Self::new(current, window.avg_volume, window.avg_max_weight)
    }
}

/// How today's exercise compares with its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryComparison {
    pub vs_previous: MetricChanges,
    pub vs_one_week: MetricChanges,
    pub vs_two_week: MetricChanges,
    pub vs_four_week: MetricChanges,
    pub vs_all_time: MetricChanges,
}

impl HistoryComparison {
    pub fn compare(current: &Exercise, history: &ExerciseHistory) -> Self {
        let previous = history.previous_session.as_ref().map(|s| &s.exercise);

        HistoryComparison {
            vs_previous: MetricChanges::new(
                current,
                previous.map(|e| e.volume),
                previous.map(|e| e.max_weight),
            ),
            vs_one_week: MetricChanges::against_window(current, &history.one_week_avg),
            vs_two_week: MetricChanges::against_window(current, &history.two_week_avg),
            vs_four_week: MetricChanges::against_window(current, &history.four_week_avg),
            vs_all_time: MetricChanges::against_window(current, &history.all_time_avg),
        }
    }
}

/// A point in an exercise's progression over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub max_weight: f64,
    pub volume: f64,
}

/// Chronological max weight and volume for one exercise.
/// Undated workouts are skipped.
pub fn progression(exercise_name: &str, workouts: &[Workout]) -> Vec<ProgressPoint> {
    let mut points: Vec<ProgressPoint> = workouts
        .iter()
        .filter_map(|w| {
            let date = w.date_object?;
            let exercise = w.find_exercise(exercise_name)?;
            Some(ProgressPoint {
                date,
                max_weight: exercise.max_weight,
                volume: exercise.volume,
            })
        })
        .collect();

    points.sort_by_key(|p| p.date);
    points
}
