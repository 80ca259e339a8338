use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{PersonalRecord, Workout};

/// Totals and personal records across a set of workouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_volume: f64,
    pub total_exercises: usize,
    /// One record per exercise (case-insensitive), in first-seen order
    pub personal_records: Vec<PersonalRecord>,
    pub pr_count: usize,
}

/// Volume attributed to one muscle group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleVolume {
    /// Attributed volume, rounded to the nearest integer
    pub volume: f64,
    /// Distinct exercise names that touched this muscle, first-seen order
    pub exercises: Vec<String>,
}

/// Aggregate statistics over workout collections
pub struct StatsAggregator;

impl StatsAggregator {
    /// Totals plus the heaviest `max_weight` ever seen per exercise.
    ///
    /// A record only moves on a strictly heavier weight, so ties keep the
    /// earliest workout in input order. Records of 0 are not records.
    pub fn aggregate(workouts: &[Workout]) -> WorkoutStats {
        let mut records: Vec<PersonalRecord> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut total_volume = 0.0;
        let mut total_exercises = 0;

        for workout in workouts {
            total_volume += workout.total_volume;
            total_exercises += workout.exercise_count;

            for exercise in &workout.exercises {
                let key = exercise.name.to_lowercase();
                match index.get(&key) {
                    Some(&i) => {
                        if exercise.max_weight > records[i].weight {
                            records[i] = PersonalRecord {
                                name: exercise.name.clone(),
                                weight: exercise.max_weight,
                                date: workout.date.clone(),
                            };
                        }
                    }
                    None => {
                        index.insert(key, records.len());
                        records.push(PersonalRecord {
                            name: exercise.name.clone(),
                            weight: exercise.max_weight,
                            date: workout.date.clone(),
                        });
                    }
                }
            }
        }

        let personal_records: Vec<PersonalRecord> =
            records.into_iter().filter(|r| r.weight != 0.0).collect();

        tracing::debug!(
            workouts = workouts.len(),
            total_volume,
            prs = personal_records.len(),
            "aggregated workout stats"
        );

        WorkoutStats {
            total_workouts: workouts.len(),
            total_volume,
            total_exercises,
            pr_count: personal_records.len(),
            personal_records,
        }
    }

    /// Split each exercise's volume evenly over its muscle groups.
    ///
    /// Exercises without muscle groups are left out of this view entirely.
    /// Volumes are rounded only once all workouts are summed.
    pub fn muscle_volume(workouts: &[Workout]) -> BTreeMap<String, MuscleVolume> {
        let mut volumes: BTreeMap<String, (f64, Vec<String>)> = BTreeMap::new();

        for exercise in workouts.iter().flat_map(|w| &w.exercises) {
            let share = exercise.volume / exercise.muscle_groups.len().max(1) as f64;

            for muscle in &exercise.muscle_groups {
                let (volume, names) = volumes.entry(muscle.clone()).or_default();
                *volume += share;
                if !names.contains(&exercise.name) {
                    names.push(exercise.name.clone());
                }
            }
        }

        volumes
            .into_iter()
            .map(|(muscle, (volume, exercises))| {
                (
                    muscle,
                    MuscleVolume {
                        volume: volume.round(),
                        exercises,
                    },
                )
            })
            .collect()
    }
}

/// Workouts ordered newest first; undated workouts go last in input order
pub fn sort_newest_first(workouts: &[Workout]) -> Vec<Workout> {
    let mut sorted = workouts.to_vec();
    sorted.sort_by(|a, b| match (a.date_object, b.date_object) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted
}

/// Workouts dated within the inclusive `[start, end]` range.
///
/// With neither bound every workout is kept. With any bound, undated
/// workouts are excluded.
pub fn filter_by_date_range(
    workouts: &[Workout],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Workout> {
    if start.is_none() && end.is_none() {
        return workouts.to_vec();
    }

    workouts
        .iter()
        .filter(|w| match w.date_object {
            Some(d) => start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e),
            None => false,
        })
        .cloned()
        .collect()
}

/// Distinct exercise names (case-insensitive), sorted alphabetically
pub fn exercise_names(workouts: &[Workout]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names: Vec<String> = workouts
        .iter()
        .flat_map(|w| &w.exercises)
        .filter(|e| seen.insert(e.normalized_name()))
        .map(|e| e.name.clone())
        .collect();

    names.sort_by_key(|n| n.to_lowercase());
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Exercise;
    use crate::sheet::parse_sheet_date;

    fn exercise(name: &str, max_weight: f64, volume: f64, muscles: &[&str]) -> Exercise {
        Exercise {
            name: name.to_string(),
            sets: vec![max_weight],
            reps: vec![1.0],
            max_weight,
            volume,
            muscle_groups: muscles.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn workout(label: &str, exercises: Vec<Exercise>) -> Workout {
        let mut workout = Workout::new(label, parse_sheet_date(label));
        for e in exercises {
            workout.push_exercise(e);
        }
        workout
    }

    #[test]
    fn test_personal_record_from_later_workout() {
        let workouts = vec![
            workout("1/1/2026", vec![exercise("Bench Press", 155.0, 1550.0, &["chest"])]),
            workout("1/8/2026", vec![exercise("Bench Press", 185.0, 1850.0, &["chest"])]),
        ];

        let stats = StatsAggregator::aggregate(&workouts);
        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.total_volume, 3400.0);
        assert_eq!(stats.total_exercises, 2);
        assert_eq!(stats.pr_count, 1);
        assert_eq!(
            stats.personal_records[0],
            PersonalRecord {
                name: "Bench Press".to_string(),
                weight: 185.0,
                date: "1/8/2026".to_string(),
            }
        );
    }

    #[test]
    fn test_personal_record_ties_keep_earliest() {
        let workouts = vec![
            workout("1/1/2026", vec![exercise("Squat", 225.0, 0.0, &[])]),
            workout("1/8/2026", vec![exercise("squat", 225.0, 0.0, &[])]),
        ];

        let stats = StatsAggregator::aggregate(&workouts);
        assert_eq!(stats.pr_count, 1);
        assert_eq!(stats.personal_records[0].date, "1/1/2026");
        assert_eq!(stats.personal_records[0].name, "Squat");
    }

    #[test]
    fn test_zero_weight_records_excluded() {
        let workouts = vec![workout(
            "1/1/2026",
            vec![
                exercise("Plank", 0.0, 0.0, &["abs"]),
                exercise("Deadlift", 315.0, 1575.0, &["hamstrings"]),
            ],
        )];

        let stats = StatsAggregator::aggregate(&workouts);
        assert_eq!(stats.pr_count, 1);
        assert_eq!(stats.personal_records[0].name, "Deadlift");
        assert_eq!(stats.total_exercises, 2);
    }

    #[test]
    fn test_empty_aggregate() {
        let stats = StatsAggregator::aggregate(&[]);
        assert_eq!(stats.total_workouts, 0);
        assert_eq!(stats.total_volume, 0.0);
        assert!(stats.personal_records.is_empty());
    }

    #[test]
    fn test_muscle_volume_even_split() {
        let workouts = vec![
            workout(
                "1/1/2026",
                vec![
                    exercise("Bench Press", 100.0, 1000.0, &["chest", "triceps", "front_delts"]),
                    exercise("Pushdown", 50.0, 500.0, &["triceps"]),
                    exercise("Sled Push", 90.0, 900.0, &[]),
                ],
            ),
            workout(
                "1/2/2026",
                vec![exercise("Bench Press", 100.0, 1000.0, &["chest", "triceps", "front_delts"])],
            ),
        ];

        let volumes = StatsAggregator::muscle_volume(&workouts);
        assert_eq!(volumes.len(), 3);
        // 2 x 333.33 rounded once at the end
        assert_eq!(volumes["chest"].volume, 667.0);
        assert_eq!(volumes["triceps"].volume, 1167.0);
        assert_eq!(volumes["triceps"].exercises, vec!["Bench Press", "Pushdown"]);
        assert_eq!(volumes["chest"].exercises, vec!["Bench Press"]);
    }

    #[test]
    fn test_sort_newest_first() {
        let workouts = vec![
            workout("Template", vec![]),
            workout("1/1/2026", vec![]),
            workout("3/1/2026", vec![]),
            workout("Notes", vec![]),
            workout("2/1/2026", vec![]),
        ];

        let labels: Vec<String> = sort_newest_first(&workouts)
            .into_iter()
            .map(|w| w.date)
            .collect();
        assert_eq!(labels, vec!["3/1/2026", "2/1/2026", "1/1/2026", "Template", "Notes"]);
    }

    #[test]
    fn test_filter_by_date_range() {
        let workouts = vec![
            workout("1/1/2026", vec![]),
            workout("2/1/2026", vec![]),
            workout("3/1/2026", vec![]),
            workout("Template", vec![]),
        ];

        let start = NaiveDate::from_ymd_opt(2026, 2, 1);
        let filtered = filter_by_date_range(&workouts, start, None);
        assert_eq!(filtered.len(), 2);

        let end = NaiveDate::from_ymd_opt(2026, 2, 1);
        let filtered = filter_by_date_range(&workouts, start, end);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date, "2/1/2026");

        assert_eq!(filter_by_date_range(&workouts, None, None).len(), 4);
    }

    #[test]
    fn test_exercise_names() {
        let workouts = vec![
            workout("1/1/2026", vec![exercise("squat", 1.0, 1.0, &[]), exercise("Bench Press", 1.0, 1.0, &[])]),
            workout("1/2/2026", vec![exercise("Squat", 1.0, 1.0, &[]), exercise("Arnold Press", 1.0, 1.0, &[])]),
        ];
        assert_eq!(exercise_names(&workouts), vec!["Arnold Press", "Bench Press", "squat"]);
    }
}
