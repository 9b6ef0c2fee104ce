//! Plan assembly.
//!
//! This module composes one workout plan from the user's history:
//! - Aggregate the logs and pick primary/secondary categories
//! - Rank exercises per category and fill the slot quotas
//! - Attach three prescribed sets per exercise
//! - Walk an ordered fallback chain when history is too thin

use crate::aggregate::{aggregate, HistoryStats};
use crate::progression::{prescribe_sets, sets_from_entry};
use crate::ranker::{rank_exercises, split_quotas, RECENT_EXERCISE_DAYS};
use crate::selector::{
    recently_trained, select_categories, CategorySelection, RECENT_CATEGORY_DAYS,
};
use crate::session::INITIAL_CANDIDATES;
use crate::{
    Category, ExerciseIdentity, ExerciseStat, Exclusions, LogEntry, Plan, PlannedExercise,
    SetScheme,
};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use uuid::Uuid;

/// Plans with fewer exercises than this trigger the fallback chain
pub const MIN_PLAN_EXERCISES: usize = 3;

/// Exercises taken when exclusions are ignored as a last resort
const IGNORE_EXCLUSIONS_TAKE: usize = 2;

/// Tunable windows and counts for plan generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    pub recent_category_days: i64,
    pub recent_exercise_days: i64,
    pub initial_candidates: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            recent_category_days: RECENT_CATEGORY_DAYS,
            recent_exercise_days: RECENT_EXERCISE_DAYS,
            initial_candidates: INITIAL_CANDIDATES,
        }
    }
}

/// Runtime context for plan generation
#[derive(Clone, Debug)]
pub struct EngineContext {
    pub today: NaiveDate,
    pub settings: EngineSettings,
}

impl EngineContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            settings: EngineSettings::default(),
        }
    }

    pub fn with_settings(today: NaiveDate, settings: EngineSettings) -> Self {
        Self { today, settings }
    }
}

/// Recovery strategies for plans that came out too short, in the order
/// they are tried
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// Borrow the top exercise of another category
    OtherCategory,
    /// Reuse the primary category's least recently used exercises
    IgnoreExclusions,
    /// Random exercise from anywhere in the history
    ///
    /// Kept as a last guard: the primary always has logged exercises, so
    /// `IgnoreExclusions` fills the plan before this tier is reached.
    RandomPick,
}

impl Fallback {
    pub const CHAIN: [Fallback; 3] = [
        Fallback::OtherCategory,
        Fallback::IgnoreExclusions,
        Fallback::RandomPick,
    ];

    fn applies(self, assembled: usize) -> bool {
        match self {
            Fallback::OtherCategory => assembled < MIN_PLAN_EXERCISES,
            Fallback::IgnoreExclusions | Fallback::RandomPick => assembled == 0,
        }
    }
}

/// Accumulates planned exercises without repeating an identity
struct PlanBuilder<'a> {
    stats: &'a HistoryStats,
    exercises: Vec<PlannedExercise>,
    used: HashSet<ExerciseIdentity>,
}

impl<'a> PlanBuilder<'a> {
    fn new(stats: &'a HistoryStats) -> Self {
        Self {
            stats,
            exercises: Vec::new(),
            used: HashSet::new(),
        }
    }

    fn len(&self) -> usize {
        self.exercises.len()
    }

    fn contains(&self, identity: &ExerciseIdentity) -> bool {
        self.used.contains(identity)
    }

    fn push(&mut self, stat: &ExerciseStat) -> bool {
        if !self.used.insert(stat.identity.clone()) {
            return false;
        }
        self.exercises.push(planned(
            &stat.identity,
            &stat.display_name,
            stat.category,
            prescribe_sets(self.stats, stat.category, &stat.identity),
            Some(stat.last_used),
        ));
        true
    }

    /// Take up to `quota` new exercises from a ranked list
    fn fill(&mut self, ranked: &[&ExerciseStat], quota: usize) -> usize {
        let mut taken = 0;
        for stat in ranked {
            if taken == quota {
                break;
            }
            if self.push(stat) {
                taken += 1;
            }
        }
        taken
    }

    fn push_raw(&mut self, identity: ExerciseIdentity, entry: &LogEntry) {
        self.exercises.push(planned(
            &identity,
            &entry.exercise_name,
            entry.category,
            sets_from_entry(entry),
            Some(entry.workout_date),
        ));
        self.used.insert(identity);
    }
}

fn planned(
    identity: &ExerciseIdentity,
    name: &str,
    category: Category,
    sets: [SetScheme; 3],
    last_used: Option<NaiveDate>,
) -> PlannedExercise {
    let (exercise_id, custom_exercise_name) = match identity {
        ExerciseIdentity::Catalog(id) => (Some(*id), None),
        ExerciseIdentity::Custom(name) => (None, Some(name.clone())),
    };
    PlannedExercise {
        name: name.to_string(),
        category,
        exercise_id,
        custom_exercise_name,
        sets,
        last_used,
    }
}

/// Assemble a single plan from the log history
///
/// Categories and exercises in `exclusions` are steered around. Returns
/// `None` only when the logs contain no usable exercise at all; in every
/// other case the plan holds at least one exercise.
pub fn assemble_plan<R: Rng + ?Sized>(
    logs: &[LogEntry],
    ctx: &EngineContext,
    exclusions: &Exclusions,
    force_multi_category: bool,
    rng: &mut R,
) -> Option<Plan> {
    let stats = aggregate(logs);
    if stats.is_empty() {
        tracing::info!("No usable exercises in history, nothing to plan");
        return None;
    }

    let mut avoid = recently_trained(&stats, ctx.today, ctx.settings.recent_category_days);
    tracing::debug!("Recently trained categories: {:?}", avoid);
    avoid.extend(exclusions.categories.iter().copied());

    let selection = select_categories(&stats, &avoid, force_multi_category)?;
    let recent_days = ctx.settings.recent_exercise_days;

    let primary_ranked = rank_exercises(
        stats.exercises_in(selection.primary),
        &exclusions.exercises,
        ctx.today,
        recent_days,
    );
    let secondary_ranked = selection.secondary.map(|category| {
        rank_exercises(
            stats.exercises_in(category),
            &exclusions.exercises,
            ctx.today,
            recent_days,
        )
    });

    let (primary_quota, secondary_quota) = split_quotas(
        primary_ranked.len(),
        secondary_ranked.as_ref().map(Vec::len),
    );

    let mut builder = PlanBuilder::new(&stats);
    builder.fill(&primary_ranked, primary_quota);
    let secondary_taken = secondary_ranked
        .as_ref()
        .map_or(0, |ranked| builder.fill(ranked, secondary_quota));

    for tier in Fallback::CHAIN {
        if !tier.applies(builder.len()) {
            continue;
        }
        let before = builder.len();
        match tier {
            Fallback::OtherCategory => {
                borrow_from_other_category(&mut builder, ctx, exclusions, &avoid, &selection)
            }
            Fallback::IgnoreExclusions => {
                reuse_least_recent(&mut builder, selection.primary)
            }
            Fallback::RandomPick => random_pick(&mut builder, logs, rng),
        }
        if builder.len() > before {
            tracing::info!(
                "Fallback {:?} added {} exercise(s)",
                tier,
                builder.len() - before
            );
        }
    }

    if builder.exercises.is_empty() {
        tracing::warn!("Every fallback came up empty");
        return None;
    }

    let secondary_category = selection.secondary.filter(|_| secondary_taken > 0);
    let (lead, partner) = headline(&selection, secondary_category, &builder.exercises);
    let (name, description) = describe(lead, partner, builder.len());

    tracing::info!(
        "Assembled '{}' with {} exercises",
        name,
        builder.exercises.len()
    );

    Some(Plan {
        id: Uuid::new_v4(),
        name,
        description,
        primary_category: selection.primary,
        secondary_category,
        used_identities: builder.used,
        exercises: builder.exercises,
    })
}

/// Append the best-used exercise from a category outside the selection
///
/// Categories outside the avoid set are tried first; if none has anything
/// left, avoided categories are considered too. Excluded exercises are
/// never borrowed.
fn borrow_from_other_category(
    builder: &mut PlanBuilder<'_>,
    ctx: &EngineContext,
    exclusions: &Exclusions,
    avoid: &HashSet<Category>,
    selection: &CategorySelection,
) {
    let stats = builder.stats;
    let (open, avoided): (Vec<Category>, Vec<Category>) = stats
        .categories
        .iter()
        .map(|c| c.category)
        .filter(|c| *c != selection.primary && Some(*c) != selection.secondary)
        .partition(|c| !avoid.contains(c));

    let pick = top_across(stats, &open, builder, exclusions, ctx)
        .or_else(|| top_across(stats, &avoided, builder, exclusions, ctx));

    if let Some(stat) = pick {
        builder.push(stat);
    }
}

/// Most-used top-ranked exercise across `categories`, skipping anything
/// excluded or already planned
fn top_across<'s>(
    stats: &'s HistoryStats,
    categories: &[Category],
    builder: &PlanBuilder<'_>,
    exclusions: &Exclusions,
    ctx: &EngineContext,
) -> Option<&'s ExerciseStat> {
    let mut best: Option<&'s ExerciseStat> = None;
    for &category in categories {
        let top = rank_exercises(
            stats.exercises_in(category),
            &exclusions.exercises,
            ctx.today,
            ctx.settings.recent_exercise_days,
        )
        .into_iter()
        .find(|e| !builder.contains(&e.identity));

        if let Some(top) = top {
            if best.map_or(true, |b| top.usage_count > b.usage_count) {
                best = Some(top);
            }
        }
    }
    best
}

/// Take the primary category's least recently used exercises, ignoring
/// every exclusion
fn reuse_least_recent(builder: &mut PlanBuilder<'_>, primary: Category) {
    let stats = builder.stats;
    let mut candidates: Vec<&ExerciseStat> = stats.exercises_in(primary).iter().collect();
    candidates.sort_by_key(|e| e.last_used);
    builder.fill(&candidates, IGNORE_EXCLUSIONS_TAKE);
}

/// Random category, random exercise within it, sets from one raw row
fn random_pick<R: Rng + ?Sized>(builder: &mut PlanBuilder<'_>, logs: &[LogEntry], rng: &mut R) {
    let categories: Vec<Category> = builder.stats.categories.iter().map(|c| c.category).collect();
    let Some(&category) = categories.choose(rng) else {
        return;
    };

    let mut identities: Vec<ExerciseIdentity> = Vec::new();
    for entry in logs.iter().filter(|e| e.category == category) {
        if let Some(identity) = entry.identity() {
            if !identities.contains(&identity) {
                identities.push(identity);
            }
        }
    }
    let Some(identity) = identities.choose(rng).cloned() else {
        return;
    };

    let rows: Vec<&LogEntry> = logs
        .iter()
        .filter(|e| e.category == category && e.identity().as_ref() == Some(&identity))
        .collect();
    if let Some(entry) = rows.choose(rng) {
        builder.push_raw(identity, entry);
    }
}

/// Categories to name the plan after, counting only those that supplied
/// exercises
///
/// `primary_category` on the plan stays the selected one since that is what
/// later plans steer away from.
fn headline(
    selection: &CategorySelection,
    secondary: Option<Category>,
    exercises: &[PlannedExercise],
) -> (Category, Option<Category>) {
    let primary_used = exercises.iter().any(|e| e.category == selection.primary);
    match (primary_used, secondary) {
        (true, secondary) => (selection.primary, secondary),
        (false, Some(secondary)) => (secondary, None),
        (false, None) => (
            exercises.first().map_or(selection.primary, |e| e.category),
            None,
        ),
    }
}

fn describe(primary: Category, secondary: Option<Category>, count: usize) -> (String, String) {
    match secondary {
        Some(secondary) => (
            format!("{} & {} Workout", primary.label(), secondary.label()),
            format!(
                "{} exercises pairing {} with {}, drawn from your own history",
                count,
                primary.label(),
                secondary.label()
            ),
        ),
        None => (
            format!("{} Focus Workout", primary.label()),
            format!(
                "{} exercises focused on {}, drawn from your own history",
                count,
                primary.label()
            ),
        ),
    }
}
