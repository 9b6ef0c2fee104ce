#![forbid(unsafe_code)]

//! Core domain model and plan recommendation engine for Lift.
//!
//! This crate provides:
//! - Domain types (categories, logged sets, plans)
//! - History aggregation and set prescription
//! - Category selection and exercise ranking
//! - Plan assembly with tiered fallbacks
//! - Plan sessions that keep successive plans distinct
//! - The JSONL log store and CSV import

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod wal;
pub mod history;
pub mod aggregate;
pub mod progression;
pub mod selector;
pub mod ranker;
pub mod engine;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use wal::{plan_to_log_entries, JsonlSink, LogSink};
pub use history::load_logs;
pub use aggregate::{aggregate, HistoryStats};
pub use selector::{select_categories, CategorySelection};
pub use ranker::rank_exercises;
pub use progression::prescribe_sets;
pub use engine::{assemble_plan, EngineContext, EngineSettings};
pub use session::{Advance, PlanSession, SessionState, SharedPlanSession};
