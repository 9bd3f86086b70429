//! Quality scoring for completed growth sessions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::action::{ActionOutcome, REQUIRED_ACTIONS};
use crate::error::{OrchardError, Result};

/// Points awarded per `Correct` outcome.
pub const CORRECT_POINTS: u32 = 25;

/// Points awarded per `WrongOrder` outcome under the partial-credit policy.
pub const WRONG_ORDER_POINTS: u32 = 10;

/// Highest possible quality.
pub const MAX_QUALITY: u8 = 100;

/// Every unlockable quality tier, ascending.
pub const TIERS: [u8; 5] = [0, 25, 50, 75, 100];

/// How quality is derived from the outcome list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// `correct * 25`.
    #[default]
    CorrectOnly,
    /// `correct * 25 + wrong_order * 10`, capped at 100.
    PartialCredit,
}

impl ScoringPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoringPolicy::CorrectOnly => "correct_only",
            ScoringPolicy::PartialCredit => "partial_credit",
        }
    }
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringPolicy {
    type Err = OrchardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "correct_only" => Ok(ScoringPolicy::CorrectOnly),
            "partial_credit" => Ok(ScoringPolicy::PartialCredit),
            other => Err(OrchardError::config(format!(
                "unknown scoring policy '{}' (expected correct_only or partial_credit)",
                other
            ))),
        }
    }
}

/// Outcome counts for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub wrong_order: u32,
    pub not_in_combo: u32,
}

impl Tally {
    pub fn from_outcomes(outcomes: &[ActionOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut tally, outcome| {
            match outcome {
                ActionOutcome::Correct => tally.correct += 1,
                ActionOutcome::WrongOrder => tally.wrong_order += 1,
                ActionOutcome::NotInCombo => tally.not_in_combo += 1,
            }
            tally
        })
    }
}

/// Final scores of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthResult {
    /// 0-100.
    pub quality: u8,
    /// Number of actions that were not `Correct` (0-4).
    pub mutation_tier: u8,
    /// All four actions matched the ideal combo in order.
    pub is_perfect: bool,
    pub correct_count: u8,
    pub wrong_order_count: u8,
}

impl GrowthResult {
    /// Score a full outcome list under `policy`.
    pub fn compute(outcomes: &[ActionOutcome], policy: ScoringPolicy) -> Self {
        let tally = Tally::from_outcomes(outcomes);
        let correct = tally.correct.min(REQUIRED_ACTIONS as u32);

        Self {
            quality: quality(tally, policy),
            mutation_tier: (REQUIRED_ACTIONS as u32 - correct) as u8,
            is_perfect: correct == REQUIRED_ACTIONS as u32,
            correct_count: correct as u8,
            wrong_order_count: tally.wrong_order as u8,
        }
    }

    /// The unlock tier this quality falls into.
    pub fn tier(&self) -> u8 {
        tier_for_quality(self.quality)
    }
}

/// Quality for a tally under `policy`, clamped to 0-100.
pub fn quality(tally: Tally, policy: ScoringPolicy) -> u8 {
    let raw = match policy {
        ScoringPolicy::CorrectOnly => tally.correct * CORRECT_POINTS,
        ScoringPolicy::PartialCredit => {
            tally.correct * CORRECT_POINTS + tally.wrong_order * WRONG_ORDER_POINTS
        }
    };
    raw.min(MAX_QUALITY as u32) as u8
}

/// Bucket a quality value into its unlock tier.
pub fn tier_for_quality(quality: u8) -> u8 {
    match quality {
        q if q >= 100 => 100,
        q if q >= 75 => 75,
        q if q >= 50 => 50,
        q if q >= 25 => 25,
        _ => 0,
    }
}

/// Whether `tier` is one of the five unlockable tiers.
pub fn is_valid_tier(tier: u8) -> bool {
    TIERS.contains(&tier)
}
