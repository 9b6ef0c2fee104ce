//! Exercise ranking within a category.

use crate::selector::window_start;
use crate::{ExerciseIdentity, ExerciseStat};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Exercises used within this many days rank behind the rest
pub const RECENT_EXERCISE_DAYS: i64 = 2;

/// Exercise slots per category when a plan spans two categories
pub const SLOTS_PER_CATEGORY: usize = 3;

/// Exercise slots when a plan covers a single category
pub const SINGLE_CATEGORY_SLOTS: usize = 4;

/// Rank exercises for a category
///
/// Excluded identities are dropped. Exercises used within the recency
/// window are moved behind the others but kept; within each group the
/// most-used come first, ties keeping their aggregation order.
pub fn rank_exercises<'a>(
    exercises: &'a [ExerciseStat],
    excluded: &HashSet<ExerciseIdentity>,
    today: NaiveDate,
    recent_days: i64,
) -> Vec<&'a ExerciseStat> {
    let cutoff = window_start(today, recent_days);
    let mut ranked: Vec<_> = exercises
        .iter()
        .filter(|e| !excluded.contains(&e.identity))
        .collect();

    ranked.sort_by(|a, b| {
        let a_recent = a.last_used >= cutoff;
        let b_recent = b.last_used >= cutoff;
        a_recent
            .cmp(&b_recent)
            .then_with(|| b.usage_count.cmp(&a.usage_count))
    });

    ranked
}

/// Split exercise slots between the primary and secondary category
///
/// Each side gets its base quota; slots one side cannot fill are handed to
/// the other. Without a secondary category the primary gets
/// [`SINGLE_CATEGORY_SLOTS`].
pub fn split_quotas(primary_available: usize, secondary_available: Option<usize>) -> (usize, usize) {
    let Some(secondary_available) = secondary_available else {
        return (primary_available.min(SINGLE_CATEGORY_SLOTS), 0);
    };

    let total = 2 * SLOTS_PER_CATEGORY;
    let primary = primary_available.min(SLOTS_PER_CATEGORY);
    let secondary = secondary_available.min(total - primary);
    let primary = primary_available.min(total - secondary);
    (primary, secondary)
}
