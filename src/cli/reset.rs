//! Reset command for Orchard.
//!
//! Deletes every unlock, in memory and on disk.

use serde::Serialize;

use crate::error::FailOpen;
use crate::storage::{LedgerStore, ProgressStore};

/// Options for the reset command.
#[derive(Debug, Clone, Default)]
pub struct ResetOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Confirm deletion.
    pub yes: bool,
}

/// Output format for the reset command.
#[derive(Debug, Clone, Serialize)]
pub struct ResetOutput {
    pub success: bool,
    /// Whether a saved ledger existed before the reset.
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResetOutput {
    pub fn success(removed: bool) -> Self {
        Self {
            success: true,
            removed,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            removed: false,
            error: Some(error.into()),
        }
    }
}

/// The reset command implementation.
pub struct ResetCommand<S: LedgerStore> {
    progress: ProgressStore<S>,
}

impl<S: LedgerStore> ResetCommand<S> {
    /// Create a new reset command.
    pub fn new(store: S) -> Self {
        Self {
            progress: ProgressStore::new(store),
        }
    }

    pub fn run(&self, options: &ResetOptions) -> ResetOutput {
        if !options.yes {
            return ResetOutput::failure("refusing to delete progress without --yes");
        }

        let existed = self
            .progress
            .backend()
            .exists()
            .fail_open_with("checking saved progress", false);

        match self.progress.delete_all() {
            Ok(()) => ResetOutput::success(existed),
            Err(e) => ResetOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ResetOutput, options: &ResetOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        match (output.success, output.removed) {
            (true, true) => "All progress deleted.\n".to_string(),
            (true, false) => "No saved progress to delete.\n".to_string(),
            (false, _) => format!(
                "Reset failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
