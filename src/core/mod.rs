//! Core types and logic for Orchard.
//!
//! This module contains the gardening actions, the growth state machine and
//! its scoring, and the gate that serializes action submissions.

pub mod action;
pub mod engine;
pub mod gate;
pub mod scoring;
pub mod session;

pub use action::{ActionOutcome, ActionType, IdealCombo, REQUIRED_ACTIONS};
pub use engine::{GrowthComplete, GrowthEngine, StepReport, Submission};
pub use gate::{ActionGate, ControlState, GateDecision, Rejection};
pub use scoring::{tier_for_quality, GrowthResult, ScoringPolicy, Tally};
pub use session::{GrowthSession, GrowthStatus};
