use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single untyped spreadsheet value
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Blank or absent cell
    #[default]
    Empty,
    /// Numeric cell value
    Number(f64),
    /// Text cell value (booleans are read as text)
    Text(String),
}

impl Cell {
    /// Render the cell as text, the way a spreadsheet would display it
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = Cell;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a spreadsheet cell (null, number, string or boolean)")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Cell, E> {
                Ok(Cell::Empty)
            }

            fn visit_none<E: de::Error>(self) -> Result<Cell, E> {
                Ok(Cell::Empty)
            }

            fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Cell, D::Error> {
                deserializer.deserialize_any(CellVisitor)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Cell, E> {
                Ok(Cell::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Cell, E> {
                Ok(Cell::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Cell, E> {
                Ok(Cell::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Cell, E> {
                Ok(Cell::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Cell, E> {
                Ok(Cell::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Cell, E> {
                Ok(Cell::Text(v))
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Text(value.to_string())
    }
}

/// Shortest display form of a number (`100` rather than `100.0`)
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// One exercise as logged on a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Exercise name as written in the log
    pub name: String,

    /// Weight lifted per set, in set order
    pub sets: Vec<f64>,

    /// Reps per set, in set order (may be shorter than `sets`)
    pub reps: Vec<f64>,

    /// Heaviest weight recorded for the day
    pub max_weight: f64,

    /// Total training volume (supplied, or inferred from sets x reps)
    pub volume: f64,

    /// Muscle group ids this exercise trains
    pub muscle_groups: Vec<String>,
}

impl Exercise {
    /// Reps for the set at `index`, inheriting the last known rep count
    /// when the rep list is shorter than the set list
    pub fn reps_for_set(&self, index: usize) -> Option<f64> {
        reps_for_index(&self.reps, index)
    }

    /// Lower-cased, trimmed name used for cross-workout matching
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

pub(crate) fn reps_for_index(reps: &[f64], index: usize) -> Option<f64> {
    reps.get(index).or_else(|| reps.last()).copied()
}

/// Normalize an exercise name for lookups: lower-cased and trimmed
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One day's worth of logged exercises (one worksheet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Raw worksheet label, normally M/D/YYYY
    pub date: String,

    /// Parsed date; `None` when the label is not a valid date
    pub date_object: Option<NaiveDate>,

    /// Accepted exercises in sheet order
    pub exercises: Vec<Exercise>,

    /// Sum of exercise volumes
    pub total_volume: f64,

    /// Number of accepted exercises
    pub exercise_count: usize,
}

impl Workout {
    /// Create an empty workout for a sheet label
    pub fn new(date: impl Into<String>, date_object: Option<NaiveDate>) -> Self {
        Workout {
            date: date.into(),
            date_object,
            exercises: Vec::new(),
            total_volume: 0.0,
            exercise_count: 0,
        }
    }

    /// Append an exercise, keeping the aggregate totals in step
    pub fn push_exercise(&mut self, exercise: Exercise) {
        self.total_volume += exercise.volume;
        self.exercises.push(exercise);
        self.exercise_count = self.exercises.len();
    }

    /// First exercise matching `name` (case-insensitive, trimmed)
    pub fn find_exercise(&self, name: &str) -> Option<&Exercise> {
        let wanted = normalize_name(name);
        self.exercises
            .iter()
            .find(|e| e.normalized_name() == wanted)
    }

    /// Flatten the workout into individual sets
    pub fn sets(&self) -> Vec<WorkoutSet> {
        self.exercises
            .iter()
            .flat_map(|exercise| {
                exercise
                    .sets
                    .iter()
                    .enumerate()
                    .map(move |(i, weight)| WorkoutSet {
                        exercise: exercise.name.clone(),
                        set_number: i + 1,
                        weight: *weight,
                        reps: exercise.reps_for_set(i),
                        timestamp: None,
                    })
            })
            .collect()
    }
}

/// A single set within a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub exercise: String,

    /// 1-based position within the exercise
    pub set_number: usize,

    pub weight: f64,

    pub reps: Option<f64>,

    /// Seconds from activity start, when the set was timed
    pub timestamp: Option<f64>,
}

impl WorkoutSet {
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Best weight ever recorded for an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub name: String,
    pub weight: f64,
    /// Sheet label of the workout that set the record
    pub date: String,
}

/// Heart-rate time series for one activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HrStream {
    /// Seconds from activity start, monotonically increasing
    pub time: Vec<f64>,

    /// Beats per minute, parallel to `time`
    pub heartrate: Vec<f64>,
}

impl HrStream {
    pub fn new(time: Vec<f64>, heartrate: Vec<f64>) -> Self {
        let mut stream = HrStream { time, heartrate };
        let len = stream.len();
        stream.time.truncate(len);
        stream.heartrate.truncate(len);
        stream
    }

    /// Number of usable samples (the shorter of the two series)
    pub fn len(&self) -> usize {
        self.time.len().min(self.heartrate.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timestamp of the last sample, if any
    pub fn duration(&self) -> Option<f64> {
        self.time.get(self.len().checked_sub(1)?).copied()
    }
}

/// A local heart-rate maximum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrPeak {
    /// Sample index in the stream
    pub index: usize,

    /// Seconds from activity start
    pub time: f64,

    pub hr: f64,

    /// Local rolling average at `index`
    pub avg_hr: f64,
}

/// Rounded heart-rate statistics over a time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrWindowSummary {
    pub avg_hr: Option<u16>,
    pub max_hr: Option<u16>,
    pub min_hr: Option<u16>,
}

impl HrWindowSummary {
    pub fn is_empty(&self) -> bool {
        self.avg_hr.is_none()
    }
}

/// How a set was matched to heart-rate data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Timestamp,
    Position,
    Segment,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Timestamp => write!(f, "timestamp"),
            MatchMethod::Position => write!(f, "position"),
            MatchMethod::Segment => write!(f, "segment"),
        }
    }
}

/// Heart-rate data attached to a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetHrData {
    pub peak_hr: Option<f64>,
    pub peak_time: Option<f64>,
    pub avg_hr: Option<u16>,
    pub max_hr: Option<u16>,
    pub min_hr: Option<u16>,
    pub matched_by: MatchMethod,
}

impl SetHrData {
    pub(crate) fn from_peak(peak: &HrPeak, summary: HrWindowSummary, matched_by: MatchMethod) -> Self {
        SetHrData {
            peak_hr: Some(peak.hr),
            peak_time: Some(peak.time),
            avg_hr: summary.avg_hr,
            max_hr: summary.max_hr,
            min_hr: summary.min_hr,
            matched_by,
        }
    }

    pub(crate) fn from_summary(summary: HrWindowSummary, matched_by: MatchMethod) -> Self {
        SetHrData {
            peak_hr: None,
            peak_time: None,
            avg_hr: summary.avg_hr,
            max_hr: summary.max_hr,
            min_hr: summary.min_hr,
            matched_by,
        }
    }
}

/// A set together with whatever heart-rate data could be matched to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedSet {
    #[serde(flatten)]
    pub set: WorkoutSet,
    pub hr_data: Option<SetHrData>,
}
