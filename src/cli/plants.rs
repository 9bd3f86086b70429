//! Plants command for Orchard.
//!
//! Lists the plant catalog. Ideal combos stay hidden.

use serde::Serialize;

use crate::config::Config;

/// Options for the plants command.
#[derive(Debug, Clone, Default)]
pub struct PlantsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlantInfo {
    pub id: String,
    pub name: String,
}

/// Output format for the plants command.
#[derive(Debug, Clone, Serialize)]
pub struct PlantsOutput {
    pub success: bool,
    pub count: usize,
    pub plants: Vec<PlantInfo>,
}

/// The plants command implementation.
pub struct PlantsCommand {
    config: Config,
}

impl PlantsCommand {
    /// Create a new plants command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self, _options: &PlantsOptions) -> PlantsOutput {
        let plants: Vec<PlantInfo> = self
            .config
            .plants
            .iter()
            .map(|p| PlantInfo {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect();

        PlantsOutput {
            success: true,
            count: plants.len(),
            plants,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &PlantsOutput, options: &PlantsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        let width = output.plants.iter().map(|p| p.id.len()).max().unwrap_or(0);
        let mut text = String::new();
        for plant in &output.plants {
            text.push_str(&format!("{:<width$}  {}\n", plant.id, plant.name));
        }
        text
    }
}
