//! Orchard - growth scoring and unlock progress for a gardening game
//!
//! A player performs four gardening actions on a plant. Each action is judged
//! against the plant's hidden ideal combo; the finished session is scored and
//! the resulting variant is unlocked in a persistent ledger. Rendering and
//! audio playback are left to a frontend behind narrow capability traits.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod presentation;
pub mod storage;

pub use config::{Config, PlantConfig, PlantVisuals};
pub use core::{
    ActionGate, ActionOutcome, ActionType, GateDecision, GrowthComplete, GrowthEngine,
    GrowthResult, GrowthSession, GrowthStatus, IdealCombo, ScoringPolicy, Submission,
};
pub use error::{OrchardError, Result};
pub use presentation::{ActionAnimation, AudioSink, CollectionEntry, SilentAudio, TracingAudio};
pub use storage::{FileLedgerStore, LedgerStore, MemoryLedgerStore, ProgressStore, UnlockChange};

// CLI commands
pub use cli::{CollectionCommand, PlantsCommand, PlayCommand, ResetCommand};
