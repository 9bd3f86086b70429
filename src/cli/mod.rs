//! CLI commands for Orchard.
//!
//! - **Game**: play
//! - **Progress**: collection, reset
//! - **Catalog**: plants

pub mod collection;
pub mod play;
pub mod plants;
pub mod reset;

pub use collection::{CollectionCommand, CollectionOptions, CollectionOutput};
pub use play::{PlayCommand, PlayOptions, PlayOutput, StepLine};
pub use plants::{PlantInfo, PlantsCommand, PlantsOptions, PlantsOutput};
pub use reset::{ResetCommand, ResetOptions, ResetOutput};
