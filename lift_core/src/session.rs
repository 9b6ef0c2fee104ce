//! Plan session management.
//!
//! A session holds a batch of distinct plan candidates and serves them one
//! at a time. Declining the last candidate generates a fresh plan that
//! avoids every category focus and exercise shown so far. Sessions live in
//! memory only and are rebuilt whenever the log history changes.

use crate::engine::{assemble_plan, EngineContext};
use crate::{Error, Exclusions, LogEntry, Plan, PlannedExercise, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard};

/// Plans generated up front when a session starts
pub const INITIAL_CANDIDATES: usize = 5;

/// Lifecycle of a plan session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No logs loaded yet
    Empty,
    /// Candidates are being assembled
    Generating,
    /// A current plan is available
    Ready,
    /// The history holds nothing to plan from
    Exhausted,
}

/// Result of declining the current plan
#[derive(Clone, Debug)]
pub enum Advance {
    /// The next pre-generated candidate
    Next(Plan),
    /// A freshly generated plan disjoint from everything shown so far
    New(Plan),
    /// No alternative could be produced; the current plan is unchanged
    Exhausted,
}

impl Advance {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            Advance::Next(plan) | Advance::New(plan) => Some(plan),
            Advance::Exhausted => None,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Advance::New(_))
    }
}

/// Stateful orchestrator over the plan assembler
pub struct PlanSession {
    ctx: EngineContext,
    logs: Vec<LogEntry>,
    plans: Vec<Plan>,
    current: usize,
    exclusions: Exclusions,
    state: SessionState,
    multi_category: bool,
    rng: StdRng,
}

impl PlanSession {
    pub fn new(ctx: EngineContext) -> Self {
        Self::with_rng(ctx, StdRng::from_entropy())
    }

    /// Session with a fixed random seed, for reproducible fallbacks
    pub fn with_seed(ctx: EngineContext, seed: u64) -> Self {
        Self::with_rng(ctx, StdRng::seed_from_u64(seed))
    }

    fn with_rng(ctx: EngineContext, rng: StdRng) -> Self {
        Self {
            ctx,
            logs: Vec::new(),
            plans: Vec::new(),
            current: 0,
            exclusions: Exclusions::default(),
            state: SessionState::Empty,
            multi_category: true,
            rng,
        }
    }

    /// Whether plans should always try to pair a secondary category
    pub fn multi_category(mut self, enabled: bool) -> Self {
        self.multi_category = enabled;
        self
    }

    /// Start a new session over `logs`, generating the initial candidates
    ///
    /// Any previous session state is discarded. Each generated plan's
    /// category and exercises are excluded from the following ones.
    pub fn initialize(&mut self, logs: Vec<LogEntry>) {
        self.logs = logs;
        self.plans.clear();
        self.current = 0;
        self.exclusions = Exclusions::default();
        self.state = SessionState::Generating;

        for attempt in 0..self.ctx.settings.initial_candidates {
            match self.generate() {
                Some(plan) => {
                    tracing::debug!("Candidate {}: {}", attempt + 1, plan.name);
                    self.exclusions.absorb(&plan);
                    self.plans.push(plan);
                }
                None => break,
            }
        }

        self.state = if self.plans.is_empty() {
            SessionState::Exhausted
        } else {
            SessionState::Ready
        };

        tracing::info!(
            "Plan session initialized with {} candidate(s) from {} log rows",
            self.plans.len(),
            self.logs.len()
        );
    }

    pub fn current(&self) -> Option<&Plan> {
        self.plans.get(self.current)
    }

    /// Decline the current plan and move on to an alternative
    pub fn advance(&mut self) -> Advance {
        if self.current + 1 < self.plans.len() {
            self.current += 1;
            tracing::debug!("Serving pre-generated candidate {}", self.current + 1);
            return Advance::Next(self.plans[self.current].clone());
        }

        let previous = self.state;
        self.state = SessionState::Generating;
        match self.generate() {
            Some(plan) => {
                self.exclusions.absorb(&plan);
                self.plans.push(plan.clone());
                self.current = self.plans.len() - 1;
                self.state = SessionState::Ready;
                tracing::info!("Generated alternative plan: {}", plan.name);
                Advance::New(plan)
            }
            None => {
                self.state = previous;
                tracing::info!("No more alternative plans");
                Advance::Exhausted
            }
        }
    }

    /// Replace an exercise of the current plan with a hand-edited version
    ///
    /// The first exercise with the same name and category is replaced.
    /// Exclusions are left alone. Returns whether anything was replaced.
    pub fn update_exercise(&mut self, updated: PlannedExercise) -> bool {
        let Some(plan) = self.plans.get_mut(self.current) else {
            return false;
        };

        match plan
            .exercises
            .iter_mut()
            .find(|e| e.name == updated.name && e.category == updated.category)
        {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => {
                tracing::warn!(
                    "No exercise named '{}' ({:?}) in the current plan",
                    updated.name,
                    updated.category
                );
                false
            }
        }
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn generate(&mut self) -> Option<Plan> {
        assemble_plan(
            &self.logs,
            &self.ctx,
            &self.exclusions,
            self.multi_category,
            &mut self.rng,
        )
    }
}

/// A plan session shared between concurrent callers
///
/// Every call takes the session lock, so overlapping declines are applied
/// one after the other.
#[derive(Clone)]
pub struct SharedPlanSession {
    inner: Arc<Mutex<PlanSession>>,
}

impl SharedPlanSession {
    pub fn new(session: PlanSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PlanSession>> {
        self.inner
            .lock()
            .map_err(|e| Error::State(format!("plan session lock poisoned: {}", e)))
    }

    pub fn initialize(&self, logs: Vec<LogEntry>) -> Result<()> {
        self.lock()?.initialize(logs);
        Ok(())
    }

    pub fn current(&self) -> Result<Option<Plan>> {
        Ok(self.lock()?.current().cloned())
    }

    pub fn advance(&self) -> Result<Advance> {
        Ok(self.lock()?.advance())
    }

    pub fn update_exercise(&self, updated: PlannedExercise) -> Result<bool> {
        Ok(self.lock()?.update_exercise(updated))
    }

    pub fn plan_count(&self) -> Result<usize> {
        Ok(self.lock()?.plans().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, ExerciseIdentity, SetScheme};
    use chrono::{Duration, NaiveDate};
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn session() -> PlanSession {
        crate::logging::init_test();
        PlanSession::with_seed(EngineContext::new(today()), 42)
    }

    fn log(days_ago: i64, category: Category, id: i64, weight: f64, reps: u32) -> LogEntry {
        LogEntry {
            workout_date: today() - Duration::days(days_ago),
            category,
            exercise_id: Some(id),
            custom_exercise_name: None,
            exercise_name: format!("Lift {}", id),
            set_number: 1,
            weight_kg: Some(weight),
            reps: Some(reps),
        }
    }

    /// Six categories with four exercises each, all trained ten days ago
    fn rich_history() -> Vec<LogEntry> {
        let categories = [
            Category::Chest,
            Category::Back,
            Category::Legs,
            Category::Shoulders,
            Category::Biceps,
            Category::Triceps,
        ];
        let mut logs = Vec::new();
        for (ci, category) in categories.iter().enumerate() {
            for n in 0..4 {
                let id = (ci * 10 + n) as i64;
                for _ in 0..(30 - ci * 3 - n) {
                    logs.push(log(10, *category, id, 40.0, 10));
                }
            }
        }
        logs
    }

    #[test]
    fn test_new_session_is_empty() {
        let s = session();
        assert_eq!(s.state(), SessionState::Empty);
        assert!(s.current().is_none());
    }

    #[test]
    fn test_initialize_empty_logs() {
        let mut s = session();
        s.initialize(Vec::new());
        assert_eq!(s.state(), SessionState::Exhausted);
        assert!(s.plans().is_empty());
        assert!(s.current().is_none());
    }

    #[test]
    fn test_initialize_generates_distinct_candidates() {
        let mut s = session();
        s.initialize(rich_history());

        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.plans().len(), INITIAL_CANDIDATES);
        assert_eq!(s.current_index(), 0);

        let primaries: HashSet<_> = s.plans().iter().map(|p| p.primary_category).collect();
        assert_eq!(primaries.len(), s.plans().len());
    }

    #[test]
    fn test_exercises_never_repeat_across_plans() {
        let mut s = session();
        s.initialize(rich_history());

        let mut seen: HashSet<ExerciseIdentity> = HashSet::new();
        for plan in s.plans() {
            assert!(!plan.exercises.is_empty());
            for identity in &plan.used_identities {
                assert!(seen.insert(identity.clone()), "{} repeated", identity);
            }
        }
    }

    #[test]
    fn test_two_categories_give_two_distinct_primaries_first() {
        let mut logs = Vec::new();
        for id in 0..3 {
            for _ in 0..5 {
                logs.push(log(10, Category::Legs, id, 80.0, 8));
                logs.push(log(12, Category::Core, 10 + id, 0.0, 20));
            }
        }
        let mut s = session();
        s.initialize(logs);

        let plans = s.plans();
        assert!(plans.len() >= 2);
        assert_ne!(plans[0].primary_category, plans[1].primary_category);
    }

    #[test]
    fn test_advance_walks_candidates_then_generates() {
        let mut s = session();
        s.initialize(rich_history());
        let batch = s.plans().len();
        let exclusions_before = s.exclusions().clone();

        for i in 1..batch {
            match s.advance() {
                Advance::Next(plan) => assert_eq!(plan.id, s.plans()[i].id),
                other => panic!("expected pre-generated plan, got {:?}", other),
            }
            assert_eq!(s.current_index(), i);
        }
        // Walking candidates adds no exclusions
        assert_eq!(s.exclusions(), &exclusions_before);

        let outcome = s.advance();
        assert!(outcome.is_new());
        let plan = outcome.plan().unwrap();
        assert_eq!(s.plans().len(), batch + 1);
        assert_eq!(s.current_index(), batch);
        assert!(s.exclusions().categories.contains(&plan.primary_category));
        assert!(s.exclusions().categories.len() > exclusions_before.categories.len());
    }

    #[test]
    fn test_exclusions_only_grow() {
        let mut s = session();
        s.initialize(rich_history());

        let mut previous = s.exclusions().clone();
        for _ in 0..8 {
            s.advance();
            let now = s.exclusions();
            assert!(previous.categories.is_subset(&now.categories));
            assert!(previous.exercises.is_subset(&now.exercises));
            previous = now.clone();
        }
    }

    #[test]
    fn test_exercises_repeat_only_after_all_are_excluded() {
        let mut logs = Vec::new();
        for (ci, category) in [Category::Legs, Category::Core, Category::Chest]
            .into_iter()
            .enumerate()
        {
            for n in 0..2 {
                let id = (ci * 10 + n) as i64;
                for _ in 0..(6 - ci - n) {
                    logs.push(log(10, category, id, 30.0, 10));
                }
            }
        }
        let stats = crate::aggregate::aggregate(&logs);
        let every_identity: HashSet<ExerciseIdentity> = stats
            .categories
            .iter()
            .flat_map(|c| stats.exercises_in(c.category))
            .map(|e| e.identity.clone())
            .collect();
        assert_eq!(every_identity.len(), 6);

        let settings = crate::engine::EngineSettings {
            initial_candidates: 1,
            ..Default::default()
        };
        let mut s = PlanSession::with_seed(EngineContext::with_settings(today(), settings), 42);
        s.initialize(logs);

        let mut shown: HashSet<ExerciseIdentity> = s.plans()[0].used_identities.clone();
        let mut repeated = false;
        for _ in 0..6 {
            let covered = s.exclusions().exercises.clone();
            let outcome = s.advance();
            let plan = outcome.plan().expect("usable history never runs dry");

            if !plan.used_identities.is_disjoint(&shown) {
                assert!(
                    every_identity.is_subset(&covered),
                    "{} reused an exercise while others were still open",
                    plan.name
                );
                repeated = true;
            }
            shown.extend(plan.used_identities.iter().cloned());
        }
        assert!(repeated);
    }

    #[test]
    fn test_advance_on_empty_history_is_exhausted() {
        let mut s = session();
        s.initialize(Vec::new());

        assert!(matches!(s.advance(), Advance::Exhausted));
        assert_eq!(s.state(), SessionState::Exhausted);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn test_initialize_resets_previous_session() {
        let mut s = session();
        s.initialize(rich_history());
        s.advance();

        s.initialize(vec![log(20, Category::Back, 1, 40.0, 10)]);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.current().unwrap().primary_category, Category::Back);
    }

    #[test]
    fn test_update_exercise_replaces_first_match() {
        let mut s = session();
        s.initialize(rich_history());
        let exclusions_before = s.exclusions().clone();

        let mut edited = s.current().unwrap().exercises[0].clone();
        edited.sets = [SetScheme::new(100.0, 3); 3];
        assert!(s.update_exercise(edited.clone()));

        assert_eq!(s.current().unwrap().exercises[0], edited);
        assert_eq!(s.exclusions(), &exclusions_before);
    }

    #[test]
    fn test_update_exercise_without_match() {
        let mut s = session();
        s.initialize(rich_history());

        let mut stranger = s.current().unwrap().exercises[0].clone();
        stranger.name = "Not In This Plan".into();
        assert!(!s.update_exercise(stranger));
    }

    #[test]
    fn test_end_to_end_chest_and_back() {
        let mut logs = Vec::new();
        // 20 bench press sets spread over the last 30 days, newest first
        for i in 0..20 {
            logs.push(log(5 + i, Category::Chest, 1, 60.0, 8));
        }
        for _ in 0..5 {
            logs.push(log(15, Category::Back, 2, 40.0, 10));
        }

        let mut s = session();
        s.initialize(logs);

        let first = s.current().unwrap();
        assert_eq!(first.primary_category, Category::Chest);
        let bench = first
            .exercises
            .iter()
            .find(|e| e.exercise_id == Some(1))
            .unwrap();
        assert_eq!(
            bench.sets,
            [
                SetScheme::new(60.0, 8),
                SetScheme::new(62.5, 8),
                SetScheme::new(65.0, 8)
            ]
        );

        let second = &s.plans()[1];
        assert_eq!(second.primary_category, Category::Back);
    }

    #[test]
    fn test_shared_session_serializes_concurrent_declines() {
        let shared = SharedPlanSession::new(session());
        shared.initialize(rich_history()).unwrap();
        let batch = shared.plan_count().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.advance().unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // 4 declines walk the batch, the other 4 each append one plan
        assert_eq!(shared.plan_count().unwrap(), batch + 4);
        assert!(shared.current().unwrap().is_some());
    }
}
