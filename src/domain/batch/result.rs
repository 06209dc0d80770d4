use serde::Serialize;

use super::error::CommandFailure;
use crate::domain::command::Command;
use crate::infrastructure::storage::StoredLocation;

/// Where in the per-command pipeline an error was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStage {
    Command,
    Variation,
    Artifact,
}

/// An error recorded below the command boundary, before it is attributed
/// to its owning command.
#[derive(Debug, Clone)]
pub struct UnitError {
    pub stage: ErrorStage,
    pub reason: String,
}

impl UnitError {
    pub fn variation(reason: impl Into<String>) -> Self {
        Self {
            stage: ErrorStage::Variation,
            reason: reason.into(),
        }
    }

    pub fn artifact(reason: impl Into<String>) -> Self {
        Self {
            stage: ErrorStage::Artifact,
            reason: reason.into(),
        }
    }
}

/// One entry in the batch error list, referencing the owning command.
#[derive(Debug, Clone, Serialize)]
pub struct BatchErrorEntry {
    pub intent: String,
    pub phrase: String,
    pub stage: ErrorStage,
    pub reason: String,
}

/// Terminal outcome of processing one command. Every submitted command
/// produces exactly one of these.
#[derive(Debug)]
pub enum CommandOutcome {
    /// At least one artifact was stored; the command may still carry
    /// unit-level errors for variations or artifacts that failed.
    Stored {
        variations: usize,
        locations: Vec<StoredLocation>,
        unit_errors: Vec<UnitError>,
    },
    Failed {
        variations: usize,
        reason: CommandFailure,
        unit_errors: Vec<UnitError>,
    },
}

/// Aggregate outcome of a batch run. Owned exclusively by the pipeline
/// during the run and handed to the caller as an immutable snapshot.
#[derive(Debug, Default, Serialize)]
pub struct BatchResult {
    pub total_commands: usize,
    pub total_variations: usize,
    pub total_artifacts: usize,
    pub failed_commands: usize,
    pub errors: Vec<BatchErrorEntry>,
}

impl BatchResult {
    pub fn new(total_commands: usize) -> Self {
        Self {
            total_commands,
            ..Self::default()
        }
    }

    /// Merge one command's terminal outcome into the aggregate.
    pub fn absorb(&mut self, command: &Command, outcome: CommandOutcome) {
        let (variations, artifacts, failure, unit_errors) = match outcome {
            CommandOutcome::Stored {
                variations,
                locations,
                unit_errors,
            } => (variations, locations.len(), None, unit_errors),
            CommandOutcome::Failed {
                variations,
                reason,
                unit_errors,
            } => (variations, 0, Some(reason), unit_errors),
        };

        self.total_variations += variations;
        self.total_artifacts += artifacts;

        for unit in unit_errors {
            self.errors.push(BatchErrorEntry {
                intent: command.intent().to_string(),
                phrase: command.phrase().to_string(),
                stage: unit.stage,
                reason: unit.reason,
            });
        }

        if let Some(reason) = failure {
            self.failed_commands += 1;
            self.errors.push(BatchErrorEntry {
                intent: command.intent().to_string(),
                phrase: command.phrase().to_string(),
                stage: ErrorStage::Command,
                reason: reason.to_string(),
            });
        }
    }

    /// Record a worker failure that could not be attributed to a command.
    pub fn record_unattributed(&mut self, reason: impl Into<String>) {
        self.failed_commands += 1;
        self.errors.push(BatchErrorEntry {
            intent: "<unknown>".to_string(),
            phrase: String::new(),
            stage: ErrorStage::Command,
            reason: reason.into(),
        });
    }

    /// Command-level error entries (one per failed command).
    pub fn command_errors(&self) -> impl Iterator<Item = &BatchErrorEntry> {
        self.errors
            .iter()
            .filter(|entry| entry.stage == ErrorStage::Command)
    }

    /// Plain-text report for the CLI.
    pub fn render_report(&self) -> String {
        let mut report = String::new();
        report.push_str("Batch Processing Report\n");
        report.push_str("=======================\n");
        report.push_str(&format!("Total commands processed: {}\n", self.total_commands));
        report.push_str(&format!("Variations generated: {}\n", self.total_variations));
        report.push_str(&format!("Audio artifacts stored: {}\n", self.total_artifacts));
        report.push_str(&format!("Failed commands: {}\n", self.failed_commands));
        report.push_str(&format!("Errors encountered: {}\n", self.errors.len()));

        if !self.errors.is_empty() {
            report.push_str("\nError Details:\n");
            for entry in &self.errors {
                report.push_str(&format!(
                    "- {} \"{}\" [{:?}]: {}\n",
                    entry.intent,
                    entry.phrase,
                    entry.stage,
                    entry.reason
                ));
            }
        }

        report
    }
}
