use std::path::Path;

use crate::domain::command::{Command, CommandValidator, RawCommandRow};
use crate::error::{AppError, AppResult};

/// Reads raw command rows from a CSV input file and validates them into
/// [`Command`] records. Rows failing validation are logged and dropped;
/// they never reach the batch scheduler.
pub struct InputReader {
    validator: CommandValidator,
}

impl InputReader {
    pub fn new(validator: CommandValidator) -> Self {
        Self { validator }
    }

    /// Load and validate commands from `path`. `skip_header` extra lines
    /// are discarded before the CSV header row.
    pub fn read_commands(&self, path: &Path, skip_header: usize) -> AppResult<Vec<Command>> {
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            return Err(AppError::Config(format!(
                "unsupported input file format: {} (expected .csv)",
                path.display()
            )));
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        let body: String = raw
            .lines()
            .skip(skip_header)
            .collect::<Vec<_>>()
            .join("\n");

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut commands = Vec::new();
        let mut dropped = 0usize;
        for (index, record) in reader.deserialize::<RawCommandRow>().enumerate() {
            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(row = index + 1, error = %e, "skipping unreadable row");
                    dropped += 1;
                    continue;
                }
            };

            match self.validator.validate(&row) {
                Ok(command) => commands.push(command),
                Err(e) => {
                    tracing::warn!(row = index + 1, error = %e, "skipping invalid row");
                    dropped += 1;
                }
            }
        }

        tracing::info!(
            file = %path.display(),
            valid = commands.len(),
            dropped,
            "input file processed"
        );
        Ok(commands)
    }
}
