//! Set prescription for planned exercises.
//!
//! Every planned exercise gets exactly three sets:
//! - The most common weight/rep pairs from its history, padded to three
//! - A small ramp when history would otherwise repeat one pair three times
//! - A bodyweight default when nothing usable was logged

use crate::aggregate::HistoryStats;
use crate::{Category, ExerciseIdentity, LogEntry, SetScheme};

/// Weight added per set when synthesizing a ramp (standard plate increment)
pub const PROGRESSION_STEP_KG: f64 = 2.5;

/// Reps suggested when an exercise has no weighted history
pub const DEFAULT_REPS: u32 = 8;

/// Prescription for exercises without any usable set history
pub const DEFAULT_SETS: [SetScheme; 3] = [
    SetScheme { weight_kg: 0.0, reps: DEFAULT_REPS },
    SetScheme { weight_kg: 0.0, reps: DEFAULT_REPS },
    SetScheme { weight_kg: 0.0, reps: DEFAULT_REPS },
];

/// Turn a flat pair into a three-step ramp: `w`, `w + 2.5`, `w + 5`
pub fn synthesize_progression(base: SetScheme) -> [SetScheme; 3] {
    [
        base,
        SetScheme::new(base.weight_kg + PROGRESSION_STEP_KG, base.reps),
        SetScheme::new(base.weight_kg + 2.0 * PROGRESSION_STEP_KG, base.reps),
    ]
}

/// Pick the three sets to suggest from an exercise's recorded pairs
///
/// Pairs are counted and ordered by descending frequency; ties keep the
/// order in which the pairs first appear. Fewer than three distinct pairs
/// are padded with the most frequent one.
pub fn top_sets<I>(pairs: I) -> [SetScheme; 3]
where
    I: IntoIterator<Item = SetScheme>,
{
    // f64 is not hashable, so buckets are a small ordered list
    let mut buckets: Vec<(SetScheme, usize)> = Vec::new();
    for pair in pairs {
        match buckets.iter_mut().find(|(seen, _)| *seen == pair) {
            Some((_, count)) => *count += 1,
            None => buckets.push((pair, 1)),
        }
    }

    if buckets.is_empty() {
        return DEFAULT_SETS;
    }

    // Stable sort keeps first-appearance order among equal counts
    buckets.sort_by(|a, b| b.1.cmp(&a.1));

    let most_common = buckets[0].0;
    let pick = |i: usize| buckets.get(i).map(|(s, _)| *s).unwrap_or(most_common);
    let sets = [pick(0), pick(1), pick(2)];

    if sets[1] == sets[0] && sets[2] == sets[0] && most_common.weight_kg > 0.0 {
        tracing::trace!(
            "Flat history at {}kg x {}, synthesizing ramp",
            most_common.weight_kg,
            most_common.reps
        );
        return synthesize_progression(most_common);
    }

    sets
}

/// Sets for an exercise as trained under `category`, or the defaults when
/// it was never logged there
pub fn prescribe_sets(
    stats: &HistoryStats,
    category: Category,
    identity: &ExerciseIdentity,
) -> [SetScheme; 3] {
    match stats.find_exercise(category, identity) {
        Some(stat) => stat.top_sets,
        None => {
            tracing::debug!("No {} history for {}, using default sets", category, identity);
            DEFAULT_SETS
        }
    }
}

/// Sets derived straight from a single raw log row
pub fn sets_from_entry(entry: &LogEntry) -> [SetScheme; 3] {
    match entry.set_scheme() {
        Some(scheme) => [scheme; 3],
        None => DEFAULT_SETS,
    }
}
