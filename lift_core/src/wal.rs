//! Append-only log store for logged sets.
//!
//! Sets are appended to a JSONL (JSON Lines) file with file locking to
//! ensure safe concurrent access. Saving a plan appends its exercises as
//! new rows.

use crate::{LogEntry, Plan, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Sink trait for persisting logged sets
pub trait LogSink {
    fn append_all(&mut self, entries: &[LogEntry]) -> Result<()>;

    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        self.append_all(std::slice::from_ref(entry))
    }
}

/// JSONL-based log sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl LogSink for JsonlSink {
    fn append_all(&mut self, entries: &[LogEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // One lock for the whole batch keeps a saved plan contiguous
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        for entry in entries {
            let line = serde_json::to_string(entry)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended {} log rows to {:?}", entries.len(), self.path);
        Ok(())
    }
}

/// Read all logged sets from a JSONL file
///
/// Lines that fail to parse are skipped with a warning.
pub fn read_entries(path: &Path) -> Result<Vec<LogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse log row at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} log rows from {:?}", entries.len(), path);
    Ok(entries)
}

/// Convert a finalized plan into log rows dated `date`
///
/// Each planned exercise becomes three rows, set numbers 1 to 3.
pub fn plan_to_log_entries(plan: &Plan, date: NaiveDate) -> Vec<LogEntry> {
    plan.exercises
        .iter()
        .flat_map(|exercise| {
            exercise.sets.iter().enumerate().map(move |(i, set)| LogEntry {
                workout_date: date,
                category: exercise.category,
                exercise_id: exercise.exercise_id,
                custom_exercise_name: exercise.custom_exercise_name.clone(),
                exercise_name: exercise.name.clone(),
                set_number: i as u32 + 1,
                weight_kg: Some(set.weight_kg),
                reps: Some(set.reps),
            })
        })
        .collect()
}
