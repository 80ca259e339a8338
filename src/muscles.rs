use crate::models::{normalize_name, Workout};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// User overrides: normalized exercise name -> ordered muscle group ids.
/// Entries keep insertion order, which decides partial matches.
pub type CustomMappings = IndexMap<String, Vec<String>>;

/// Reference entry for a muscle group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuscleGroup {
    /// Stable identifier used in mappings
    pub id: String,

    /// Human-readable name
    pub display_name: String,

    /// Grouping used for display (chest, back, legs, ...)
    pub category: String,

    /// Hex color for charts
    pub color: String,
}

impl MuscleGroup {
    pub fn new(id: &str, display_name: &str, category: &str, color: &str) -> Self {
        MuscleGroup {
            id: id.to_string(),
            display_name: display_name.to_string(),
            category: category.to_string(),
            color: color.to_string(),
        }
    }
}

/// Built-in muscle groups: (id, display name, category, color)
pub const DEFAULT_MUSCLE_GROUPS: &[(&str, &str, &str, &str)] = &[
    ("chest", "Chest", "chest", "#e74c3c"),
    ("front_delts", "Front Delts", "shoulders", "#f39c12"),
    ("side_delts", "Side Delts", "shoulders", "#f1c40f"),
    ("rear_delts", "Rear Delts", "shoulders", "#d4ac0d"),
    ("triceps", "Triceps", "arms", "#9b59b6"),
    ("biceps", "Biceps", "arms", "#8e44ad"),
    ("forearms", "Forearms", "arms", "#af7ac5"),
    ("lats", "Lats", "back", "#3498db"),
    ("upper_back", "Upper Back", "back", "#2980b9"),
    ("traps", "Traps", "back", "#5dade2"),
    ("lower_back", "Lower Back", "back", "#1f618d"),
    ("abs", "Abs", "core", "#1abc9c"),
    ("obliques", "Obliques", "core", "#16a085"),
    ("quads", "Quads", "legs", "#2ecc71"),
    ("hamstrings", "Hamstrings", "legs", "#27ae60"),
    ("glutes", "Glutes", "legs", "#58d68d"),
    ("calves", "Calves", "legs", "#186a3b"),
    ("adductors", "Adductors", "legs", "#82e0aa"),
];

/// Built-in exercise -> muscle mapping.
///
/// Partial matching walks this table top to bottom and takes the first
/// hit, so more specific names must come before the generic ones they
/// contain (e.g. "romanian deadlift" before "deadlift").
pub const DEFAULT_MAPPINGS: &[(&str, &[&str])] = &[
    ("incline bench press", &["chest", "front_delts", "triceps"]),
    ("bench press", &["chest", "triceps", "front_delts"]),
    ("chest press", &["chest", "triceps"]),
    ("chest fly", &["chest"]),
    ("pec deck", &["chest"]),
    ("push up", &["chest", "triceps"]),
    ("dip", &["triceps", "chest"]),
    ("shoulder press", &["front_delts", "side_delts", "triceps"]),
    ("overhead press", &["front_delts", "side_delts", "triceps"]),
    ("lateral raise", &["side_delts"]),
    ("front raise", &["front_delts"]),
    ("rear delt fly", &["rear_delts"]),
    ("face pull", &["rear_delts", "upper_back"]),
    ("upright row", &["side_delts", "traps"]),
    ("shrug", &["traps"]),
    ("tricep extension", &["triceps"]),
    ("tricep pushdown", &["triceps"]),
    ("skull crusher", &["triceps"]),
    ("hammer curl", &["biceps", "forearms"]),
    ("preacher curl", &["biceps"]),
    ("bicep curl", &["biceps"]),
    ("wrist curl", &["forearms"]),
    ("pull up", &["lats", "biceps"]),
    ("chin up", &["lats", "biceps"]),
    ("lat pulldown", &["lats", "biceps"]),
    ("seated row", &["upper_back", "lats", "biceps"]),
    ("barbell row", &["upper_back", "lats", "lower_back"]),
    ("dumbbell row", &["upper_back", "lats"]),
    ("t-bar row", &["upper_back", "lats"]),
    ("romanian deadlift", &["hamstrings", "glutes", "lower_back"]),
    ("deadlift", &["hamstrings", "glutes", "lower_back"]),
    ("back extension", &["lower_back", "glutes"]),
    ("front squat", &["quads", "glutes"]),
    ("squat", &["quads", "glutes", "hamstrings"]),
    ("leg press", &["quads", "glutes"]),
    ("lunge", &["quads", "glutes"]),
    ("leg extension", &["quads"]),
    ("leg curl", &["hamstrings"]),
    ("hip thrust", &["glutes", "hamstrings"]),
    ("glute bridge", &["glutes"]),
    ("hip adduction", &["adductors"]),
    ("hip abduction", &["glutes"]),
    ("calf raise", &["calves"]),
    ("cable crunch", &["abs"]),
    ("crunch", &["abs"]),
    ("plank", &["abs", "obliques"]),
    ("leg raise", &["abs"]),
    ("russian twist", &["obliques"]),
    ("ab wheel", &["abs"]),
];

/// Resolves exercise names to muscle group ids
pub struct MuscleAttributor;

impl MuscleAttributor {
    /// Look up the muscle groups for an exercise name.
    ///
    /// Resolution order, first hit wins:
    /// 1. exact match in `custom`
    /// 2. exact match in [`DEFAULT_MAPPINGS`]
    /// 3. partial match in [`DEFAULT_MAPPINGS`] (either name contains the other)
    /// 4. partial match in `custom`, in insertion order
    ///
    /// A custom exact entry beats every default, but a default exact entry
    /// beats a custom partial one. A name that is blank after normalization
    /// maps to no muscle group, even though every key contains it.
    pub fn lookup(exercise_name: &str, custom: &CustomMappings) -> Vec<String> {
        let normalized = normalize_name(exercise_name);
        if normalized.is_empty() {
            return Vec::new();
        }

        if let Some(groups) = custom.get(&normalized) {
            return groups.clone();
        }

        if let Some((_, groups)) = DEFAULT_MAPPINGS.iter().find(|(key, _)| *key == normalized) {
            return to_owned(groups);
        }

        if let Some((key, groups)) = DEFAULT_MAPPINGS
            .iter()
            .find(|(key, _)| is_partial_match(&normalized, key))
        {
            tracing::trace!(exercise = %normalized, key, "partial default muscle match");
            return to_owned(groups);
        }

        if let Some((key, groups)) = custom
            .iter()
            .find(|(key, _)| is_partial_match(&normalized, key))
        {
            tracing::trace!(exercise = %normalized, key = %key, "partial custom muscle match");
            return groups.clone();
        }

        Vec::new()
    }
}

fn is_partial_match(normalized: &str, key: &str) -> bool {
    !key.is_empty() && (normalized.contains(key) || key.contains(normalized))
}

fn to_owned(groups: &[&str]) -> Vec<String> {
    groups.iter().map(|g| g.to_string()).collect()
}

/// Muscle group reference catalog: built-ins plus user additions
#[derive(Debug, Clone, PartialEq)]
pub struct MuscleCatalog {
    groups: Vec<MuscleGroup>,
}

impl MuscleCatalog {
    /// Catalog with user-defined groups merged in. A custom group with a
    /// built-in id replaces that entry in place; new ids are appended.
    pub fn with_custom(custom: &[MuscleGroup]) -> Self {
        let mut catalog = Self::default();
        for group in custom {
            match catalog.groups.iter_mut().find(|g| g.id == group.id) {
                Some(existing) => *existing = group.clone(),
                None => catalog.groups.push(group.clone()),
            }
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&MuscleGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn groups(&self) -> &[MuscleGroup] {
        &self.groups
    }

    /// Display name for an id, falling back to the id itself
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|g| g.display_name.as_str()).unwrap_or(id)
    }

    /// Groups keyed by category, categories in order of first appearance
    pub fn by_category(&self) -> Vec<(String, Vec<&MuscleGroup>)> {
        let mut categories: Vec<(String, Vec<&MuscleGroup>)> = Vec::new();
        for group in &self.groups {
            match categories.iter_mut().find(|(c, _)| *c == group.category) {
                Some((_, members)) => members.push(group),
                None => categories.push((group.category.clone(), vec![group])),
            }
        }
        categories
    }
}

impl Default for MuscleCatalog {
    fn default() -> Self {
        MuscleCatalog {
            groups: DEFAULT_MUSCLE_GROUPS
                .iter()
                .map(|(id, name, category, color)| MuscleGroup::new(id, name, category, color))
                .collect(),
        }
    }
}

/// Distinct exercise names that were attributed to no muscle group.
///
/// Names are deduplicated case-insensitively, keeping the first spelling
/// seen, in first-seen order.
pub fn unmapped_exercises(workouts: &[Workout]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for exercise in workouts.iter().flat_map(|w| &w.exercises) {
        if exercise.muscle_groups.is_empty() && seen.insert(exercise.normalized_name()) {
            names.push(exercise.name.clone());
        }
    }

    names
}
