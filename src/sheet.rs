//! Worksheet parsing
//!
//! Turns raw spreadsheet rows into [`Exercise`] records and a worksheet into
//! a [`Workout`]. Spreadsheet data is messy, so nothing in here fails: bad
//! numbers are dropped, header and placeholder rows are skipped, and an
//! unreadable sheet label simply leaves the workout undated.

use chrono::NaiveDate;

use crate::models::{reps_for_index, Cell, Exercise, Workout};
use crate::muscles::{CustomMappings, MuscleAttributor};

/// Fixed column positions of an exercise row
const NAME_COL: usize = 0;
const SETS_COL: usize = 1;
const MAX_WEIGHT_COL: usize = 2;
const REPS_COL: usize = 3;
const VOLUME_COL: usize = 4;

/// Substrings that mark a header row repeated mid-sheet
const HEADER_MARKERS: &[&str] = &["exercise", "s1"];

/// Parse one `[name, sets, max weight, reps, volume]` row.
///
/// Returns `None` for blank names, embedded header rows and placeholder rows
/// (no sets, no max weight and no volume).
pub fn parse_row(row: &[Cell], custom: &CustomMappings) -> Option<Exercise> {
    let raw_name = cell_at(row, NAME_COL).as_text();
    let name = raw_name.trim();
    if name.is_empty() {
        return None;
    }

    let lowered = name.to_lowercase();
    if HEADER_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        tracing::debug!(row = %name, "skipping header row");
        return None;
    }

    let sets = parse_comma_separated(&cell_at(row, SETS_COL).as_text());
    let reps = parse_comma_separated(&cell_at(row, REPS_COL).as_text());
    let max_weight = parse_cell_number(cell_at(row, MAX_WEIGHT_COL));
    let supplied_volume = parse_cell_number(cell_at(row, VOLUME_COL));

    if sets.is_empty() && max_weight == 0.0 && supplied_volume == 0.0 {
        tracing::debug!(exercise = %name, "skipping placeholder row");
        return None;
    }

    let volume = if supplied_volume == 0.0 && !sets.is_empty() && !reps.is_empty() {
        infer_volume(&sets, &reps)
    } else {
        supplied_volume
    };

    Some(Exercise {
        name: name.to_string(),
        muscle_groups: MuscleAttributor::lookup(&raw_name, custom),
        sets,
        reps,
        max_weight,
        volume,
    })
}

/// Parse a worksheet into a workout. Row 0 is the header and is skipped.
pub fn parse_worksheet(label: &str, rows: &[Vec<Cell>], custom: &CustomMappings) -> Workout {
    let mut workout = Workout::new(label, parse_sheet_date(label));

    for row in rows.iter().skip(1) {
        if let Some(exercise) = parse_row(row, custom) {
            workout.push_exercise(exercise);
        }
    }

    tracing::debug!(
        sheet = label,
        rows = rows.len().saturating_sub(1),
        exercises = workout.exercise_count,
        total_volume = workout.total_volume,
        "parsed worksheet"
    );

    workout
}

/// Sum of `weight * reps` over every set. Sets without a matching rep entry
/// reuse the last rep count (trailing drop-set convention).
pub fn infer_volume(sets: &[f64], reps: &[f64]) -> f64 {
    sets.iter()
        .enumerate()
        .map(|(i, weight)| weight * reps_for_index(reps, i).unwrap_or(0.0))
        .sum()
}

/// Split a comma-separated cell into numbers, dropping anything that does
/// not parse. Order of the surviving values is kept.
pub fn parse_comma_separated(value: &str) -> Vec<f64> {
    value.split(',').filter_map(parse_leading_float).collect()
}

/// Numeric value of a cell, 0 when it holds no number
pub fn parse_cell_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Number(_) | Cell::Empty => 0.0,
        Cell::Text(text) => parse_leading_float(text).unwrap_or(0.0),
    }
}

/// Parse the numeric prefix of a token, the way a spreadsheet user expects
/// "135lbs" or " 8 " to read. Returns `None` when there is no leading number.
pub fn parse_leading_float(token: &str) -> Option<f64> {
    let token = token.trim();
    let bytes = token.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Optional exponent, only consumed when complete
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    token[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a `M/D/YYYY` or `M/D/YY` sheet label.
///
/// Each part must be plain ASCII digits; signs are rejected.
/// Two-digit years above 50 land in the 1900s, the rest in the 2000s.
/// Anything else, including impossible calendar dates, yields `None`.
pub fn parse_sheet_date(label: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = label.trim().split('/').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    if !parts
        .iter()
        .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let month: u32 = parts[0].parse().ok()?;
    let day: u32 = parts[1].parse().ok()?;
    let year_part = parts[2];
    let mut year: i32 = year_part.parse().ok()?;

    if year_part.len() <= 2 {
        year += if year > 50 { 1900 } else { 2000 };
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

fn cell_at(row: &[Cell], index: usize) -> &Cell {
    const EMPTY: &Cell = &Cell::Empty;
    row.get(index).unwrap_or(EMPTY)
}
