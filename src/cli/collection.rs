//! Collection command for Orchard.
//!
//! Shows which variants of each plant have been unlocked.

use serde::Serialize;

use crate::config::Config;
use crate::presentation::{Collection, CollectionEntry};
use crate::storage::{LedgerStore, ProgressStore};

/// Options for the collection command.
#[derive(Debug, Clone, Default)]
pub struct CollectionOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the collection command.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionOutput {
    /// Whether the collection was read.
    pub success: bool,
    pub entries: Vec<CollectionEntry>,
    /// Catalog plants with the perfect variant unlocked.
    pub perfect_count: usize,
    /// Catalog size.
    pub total: usize,
    /// Error message if the collection could not be shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectionOutput {
    /// Create a successful output.
    pub fn success(entries: Vec<CollectionEntry>, perfect_count: usize, total: usize) -> Self {
        Self {
            success: true,
            entries,
            perfect_count,
            total,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            entries: Vec::new(),
            perfect_count: 0,
            total: 0,
            error: Some(error.into()),
        }
    }
}

/// The collection command implementation.
pub struct CollectionCommand<S: LedgerStore> {
    progress: ProgressStore<S>,
    config: Config,
}

impl<S: LedgerStore> CollectionCommand<S> {
    /// Create a new collection command.
    pub fn new(store: S, config: Config) -> Self {
        Self {
            progress: ProgressStore::new(store),
            config,
        }
    }

    /// Show every plant, or only `plant_id`.
    pub fn run(&self, plant_id: Option<&str>, _options: &CollectionOptions) -> CollectionOutput {
        if let Some(id) = plant_id {
            if let Err(e) = self.config.plant(id) {
                return CollectionOutput::failure(e.to_string());
            }
        }

        let collection = Collection::load(&self.config, &self.progress);
        let entries = collection
            .entries
            .into_iter()
            .filter(|entry| plant_id.map_or(true, |id| entry.plant_id == id))
            .collect();

        CollectionOutput::success(entries, collection.perfect_count, collection.total)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CollectionOutput, options: &CollectionOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &CollectionOutput) -> String {
        if !output.success {
            return format!(
                "Collection failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        for entry in &output.entries {
            lines.push(format!("{} ({})", entry.name, entry.plant_id));
            for slot in &entry.slots {
                let label = slot.variant.label();
                let mark = if slot.unlocked { "unlocked" } else { "locked" };
                lines.push(format!("  {:<8} {}", label, mark));
            }
        }
        lines.push(format!(
            "Perfect plants: {}/{}",
            output.perfect_count, output.total
        ));

        lines.join("\n") + "\n"
    }
}
