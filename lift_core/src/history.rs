//! Log history loading.
//!
//! This module loads logged sets from the JSONL store and, optionally, a
//! CSV import file, and hands them to the plan engine newest first.

use crate::{Category, Error, LogEntry, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

/// CSV row format for imported logs
#[derive(Debug, Deserialize)]
struct CsvRow {
    workout_date: String,
    category: String,
    exercise_id: Option<i64>,
    custom_exercise_name: Option<String>,
    exercise_name: String,
    set_number: u32,
    weight_kg: Option<f64>,
    reps: Option<u32>,
}

impl TryFrom<CsvRow> for LogEntry {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let workout_date = NaiveDate::parse_from_str(row.workout_date.trim(), "%Y-%m-%d")
            .map_err(|e| Error::InvalidLog(format!("Invalid date '{}': {}", row.workout_date, e)))?;
        let category: Category = row.category.parse()?;

        Ok(LogEntry {
            workout_date,
            category,
            exercise_id: row.exercise_id,
            custom_exercise_name: row.custom_exercise_name.filter(|n| !n.trim().is_empty()),
            exercise_name: row.exercise_name,
            set_number: row.set_number,
            weight_kg: row.weight_kg,
            reps: row.reps,
        })
    }
}

/// Load the full log history, newest workout first
///
/// Rows from the JSONL store come before imported CSV rows of the same
/// date; the sort is stable so the engine sees a reproducible order.
pub fn load_logs(store_path: &Path, csv_import: Option<&Path>) -> Result<Vec<LogEntry>> {
    let mut entries = crate::wal::read_entries(store_path)?;
    tracing::debug!("Loaded {} rows from store", entries.len());

    if let Some(csv_path) = csv_import {
        let imported = read_csv_entries(csv_path)?;
        tracing::debug!("Loaded {} rows from CSV", imported.len());
        entries.extend(imported);
    }

    sort_newest_first(&mut entries);

    tracing::info!("Loaded {} logged sets", entries.len());
    Ok(entries)
}

/// Read logged sets from a CSV file with a header row
///
/// Rows that fail to parse are skipped with a warning.
pub fn read_csv_entries(path: &Path) -> Result<Vec<LogEntry>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut entries = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match LogEntry::try_from(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(entries)
}

/// Stable sort by workout date, newest first
pub fn sort_newest_first(entries: &mut [LogEntry]) {
    entries.sort_by(|a, b| b.workout_date.cmp(&a.workout_date));
}
