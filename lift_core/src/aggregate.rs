//! History aggregation.
//!
//! Turns a flat list of logged sets into per-category and per-exercise
//! statistics. Recomputed from scratch on every call; nothing is cached.

use crate::progression::top_sets;
use crate::{Category, CategoryStat, ExerciseIdentity, ExerciseStat, LogEntry, SetScheme};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Aggregated view of a log history
///
/// Both the category list and each per-category exercise list keep the
/// order in which entries first appear in the input logs. That order is
/// the tie-break for every selection made from these stats.
#[derive(Clone, Debug, Default)]
pub struct HistoryStats {
    pub categories: Vec<CategoryStat>,
    pub exercises: HashMap<Category, Vec<ExerciseStat>>,
}

impl HistoryStats {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn category(&self, category: Category) -> Option<&CategoryStat> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Exercises logged under `category`, in first-appearance order
    pub fn exercises_in(&self, category: Category) -> &[ExerciseStat] {
        self.exercises
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Stats for `identity` as logged under `category`
    ///
    /// An exercise logged under two categories has a separate stat in each.
    pub fn find_exercise(
        &self,
        category: Category,
        identity: &ExerciseIdentity,
    ) -> Option<&ExerciseStat> {
        self.exercises_in(category)
            .iter()
            .find(|e| &e.identity == identity)
    }

    pub fn exercise_count(&self) -> usize {
        self.exercises.values().map(Vec::len).sum()
    }
}

/// Working accumulator for one exercise identity
struct ExerciseAccumulator {
    identity: ExerciseIdentity,
    display_name: String,
    usage_count: usize,
    last_used: NaiveDate,
    pairs: Vec<SetScheme>,
}

/// Aggregate logged sets into category and exercise statistics
///
/// Rows without an exercise identity are ignored. Rows missing weight or
/// reps still count towards usage, but not towards the set statistics.
pub fn aggregate(logs: &[LogEntry]) -> HistoryStats {
    let mut categories: Vec<CategoryStat> = Vec::new();
    let mut accumulators: HashMap<Category, Vec<ExerciseAccumulator>> = HashMap::new();
    let mut skipped = 0usize;

    for entry in logs {
        let Some(identity) = entry.identity() else {
            skipped += 1;
            continue;
        };

        match categories.iter_mut().find(|c| c.category == entry.category) {
            Some(stat) => {
                stat.total_set_count += 1;
                stat.last_used = stat.last_used.max(entry.workout_date);
            }
            None => categories.push(CategoryStat {
                category: entry.category,
                total_set_count: 1,
                last_used: entry.workout_date,
            }),
        }

        let bucket = accumulators.entry(entry.category).or_default();
        let acc = match bucket.iter().position(|a| a.identity == identity) {
            Some(i) => &mut bucket[i],
            None => {
                bucket.push(ExerciseAccumulator {
                    identity,
                    display_name: entry.exercise_name.clone(),
                    usage_count: 0,
                    last_used: entry.workout_date,
                    pairs: Vec::new(),
                });
                let last = bucket.len() - 1;
                &mut bucket[last]
            }
        };

        acc.usage_count += 1;
        acc.last_used = acc.last_used.max(entry.workout_date);
        if let Some(pair) = entry.set_scheme() {
            acc.pairs.push(pair);
        }
    }

    if skipped > 0 {
        tracing::debug!("Ignored {} log rows without an exercise identity", skipped);
    }

    let exercises = accumulators
        .into_iter()
        .map(|(category, bucket)| {
            let stats = bucket
                .into_iter()
                .map(|acc| ExerciseStat {
                    top_sets: top_sets(acc.pairs),
                    identity: acc.identity,
                    display_name: acc.display_name,
                    category,
                    usage_count: acc.usage_count,
                    last_used: acc.last_used,
                })
                .collect();
            (category, stats)
        })
        .collect();

    let stats = HistoryStats {
        categories,
        exercises,
    };

    tracing::debug!(
        "Aggregated {} rows into {} categories / {} exercises",
        logs.len(),
        stats.categories.len(),
        stats.exercise_count()
    );

    stats
}
