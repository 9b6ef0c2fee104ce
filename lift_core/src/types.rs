//! Core domain types for the lift plan engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Muscle categories and exercise identities
//! - Logged sets (the read-only history input)
//! - Derived per-exercise and per-category statistics
//! - Planned exercises, plans and the exclusion sets threaded between plans

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Categories and Identities
// ============================================================================

/// Muscle-group label attached to every logged set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Chest,
    Back,
    Biceps,
    Triceps,
    Shoulders,
    Legs,
    Core,
    Cardio,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Chest,
        Category::Back,
        Category::Biceps,
        Category::Triceps,
        Category::Shoulders,
        Category::Legs,
        Category::Core,
        Category::Cardio,
    ];

    /// Lowercase key used in files and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Category::Chest => "chest",
            Category::Back => "back",
            Category::Biceps => "biceps",
            Category::Triceps => "triceps",
            Category::Shoulders => "shoulders",
            Category::Legs => "legs",
            Category::Core => "core",
            Category::Cardio => "cardio",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| crate::Error::InvalidLog(format!("Unknown category: {}", s)))
    }
}

/// Stable key distinguishing one exercise from another
///
/// A catalog id when the exercise comes from the catalog, otherwise the
/// custom exercise name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseIdentity {
    Catalog(i64),
    Custom(String),
}

impl fmt::Display for ExerciseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseIdentity::Catalog(id) => write!(f, "#{}", id),
            ExerciseIdentity::Custom(name) => f.write_str(name),
        }
    }
}

// ============================================================================
// Log Entries
// ============================================================================

/// One logged set, as handed over by the log store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub workout_date: NaiveDate,
    pub category: Category,
    #[serde(default)]
    pub exercise_id: Option<i64>,
    #[serde(default)]
    pub custom_exercise_name: Option<String>,
    pub exercise_name: String,
    pub set_number: u32,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub reps: Option<u32>,
}

impl LogEntry {
    /// Identity of the logged exercise, `None` for rows that carry neither
    /// a catalog id nor a custom name
    pub fn identity(&self) -> Option<ExerciseIdentity> {
        if let Some(id) = self.exercise_id {
            return Some(ExerciseIdentity::Catalog(id));
        }
        self.custom_exercise_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| ExerciseIdentity::Custom(name.to_string()))
    }

    /// Weight/reps pair, `None` when either half was not recorded
    pub fn set_scheme(&self) -> Option<SetScheme> {
        match (self.weight_kg, self.reps) {
            (Some(weight_kg), Some(reps)) => Some(SetScheme { weight_kg, reps }),
            _ => None,
        }
    }
}

// ============================================================================
// Derived Statistics
// ============================================================================

/// A single set prescription
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetScheme {
    pub weight_kg: f64,
    pub reps: u32,
}

impl SetScheme {
    pub fn new(weight_kg: f64, reps: u32) -> Self {
        Self { weight_kg, reps }
    }
}

/// Usage statistics for one exercise identity within a category
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseStat {
    pub identity: ExerciseIdentity,
    pub display_name: String,
    pub category: Category,
    /// Number of logged sets, not distinct workout days
    pub usage_count: usize,
    pub last_used: NaiveDate,
    pub top_sets: [SetScheme; 3],
}

/// Usage statistics for one category
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryStat {
    pub category: Category,
    pub total_set_count: usize,
    pub last_used: NaiveDate,
}

// ============================================================================
// Plans
// ============================================================================

/// One exercise of a generated plan
///
/// Callers may hand-edit the sets before saving; the engine never touches a
/// planned exercise after creating it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub name: String,
    pub category: Category,
    pub exercise_id: Option<i64>,
    pub custom_exercise_name: Option<String>,
    pub sets: [SetScheme; 3],
    pub last_used: Option<NaiveDate>,
}

impl PlannedExercise {
    pub fn identity(&self) -> Option<ExerciseIdentity> {
        match (&self.exercise_id, &self.custom_exercise_name) {
            (Some(id), _) => Some(ExerciseIdentity::Catalog(*id)),
            (None, Some(name)) => Some(ExerciseIdentity::Custom(name.clone())),
            (None, None) => None,
        }
    }
}

/// A complete workout proposal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub exercises: Vec<PlannedExercise>,
    pub primary_category: Category,
    pub secondary_category: Option<Category>,
    pub used_identities: HashSet<ExerciseIdentity>,
}

/// Categories and exercise identities a plan generation must steer clear of
///
/// The sets only ever grow within a session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Exclusions {
    pub categories: HashSet<Category>,
    pub exercises: HashSet<ExerciseIdentity>,
}

impl Exclusions {
    /// Fold a plan's primary category and used exercises into the sets
    pub fn absorb(&mut self, plan: &Plan) {
        self.categories.insert(plan.primary_category);
        self.exercises.extend(plan.used_identities.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.exercises.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(exercise_id: Option<i64>, custom: Option<&str>) -> LogEntry {
        LogEntry {
            workout_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            category: Category::Chest,
            exercise_id,
            custom_exercise_name: custom.map(String::from),
            exercise_name: "Bench Press".into(),
            set_number: 1,
            weight_kg: Some(60.0),
            reps: Some(8),
        }
    }

    #[test]
    fn test_identity_prefers_catalog_id() {
        let e = entry(Some(7), Some("My Bench"));
        assert_eq!(e.identity(), Some(ExerciseIdentity::Catalog(7)));
    }

    #[test]
    fn test_identity_falls_back_to_custom_name() {
        let e = entry(None, Some("Landmine Press"));
        assert_eq!(
            e.identity(),
            Some(ExerciseIdentity::Custom("Landmine Press".into()))
        );
    }

    #[test]
    fn test_identity_missing_or_blank() {
        assert_eq!(entry(None, None).identity(), None);
        assert_eq!(entry(None, Some("   ")).identity(), None);
    }

    #[test]
    fn test_set_scheme_requires_weight_and_reps() {
        let mut e = entry(Some(1), None);
        assert_eq!(e.set_scheme(), Some(SetScheme::new(60.0, 8)));

        e.reps = None;
        assert_eq!(e.set_scheme(), None);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Chest".parse::<Category>().unwrap(), Category::Chest);
        assert_eq!(" legs ".parse::<Category>().unwrap(), Category::Legs);
        assert!("forearms".parse::<Category>().is_err());
    }

    #[test]
    fn test_log_entry_json_shape() {
        let json = r#"{
            "workout_date": "2024-03-01",
            "category": "back",
            "custom_exercise_name": "Seal Row",
            "exercise_name": "Seal Row",
            "set_number": 2,
            "weight_kg": 40.0,
            "reps": 10
        }"#;
        let e: LogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(e.category, Category::Back);
        assert_eq!(e.exercise_id, None);
        assert_eq!(e.identity(), Some(ExerciseIdentity::Custom("Seal Row".into())));
    }
}
