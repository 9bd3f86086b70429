//! Action vocabulary for Orchard.
//!
//! These types are the alphabet of the game: what the player can do to a
//! plant, how each action is judged, and the ideal combination a plant
//! expects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OrchardError, Result};

/// Number of actions in one growth session.
pub const REQUIRED_ACTIONS: usize = 4;

/// A gardening action the player can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Water,
    Fertilizer,
    Sun,
    SpecialLight,
    Prune,
    Wait,
}

impl ActionType {
    /// Every action, in control-panel order.
    pub const ALL: [ActionType; 6] = [
        ActionType::Water,
        ActionType::Fertilizer,
        ActionType::Sun,
        ActionType::SpecialLight,
        ActionType::Prune,
        ActionType::Wait,
    ];

    /// Index into the action sound bank.
    pub fn sound_index(self) -> usize {
        match self {
            ActionType::Water => 0,
            ActionType::Wait => 1,
            ActionType::Sun => 2,
            ActionType::SpecialLight => 3,
            ActionType::Prune => 4,
            ActionType::Fertilizer => 5,
        }
    }

    /// Stable lowercase name used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Water => "water",
            ActionType::Fertilizer => "fertilizer",
            ActionType::Sun => "sun",
            ActionType::SpecialLight => "special_light",
            ActionType::Prune => "prune",
            ActionType::Wait => "wait",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = OrchardError;

    fn from_str(s: &str) -> Result<Self> {
        const EXPECTED: &str = "water, fertilizer, sun, special_light, prune, wait";

        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "water" | "watering" => Ok(ActionType::Water),
            "fertilizer" | "fertilize" | "fertilizing" => Ok(ActionType::Fertilizer),
            "sun" | "sunlight" => Ok(ActionType::Sun),
            "special_light" | "speciallight" | "uv" | "uv_lamp" => Ok(ActionType::SpecialLight),
            "prune" | "pruning" => Ok(ActionType::Prune),
            "wait" | "waiting" => Ok(ActionType::Wait),
            _ => Err(OrchardError::config(format!(
                "unknown action '{s}' (expected one of: {EXPECTED})"
            ))),
        }
    }
}

/// How a single submitted action was judged against the ideal combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The action is the one expected at this step.
    Correct,
    /// The action is in the combo, but not at this step.
    WrongOrder,
    /// The action does not appear in the combo at all.
    NotInCombo,
}

/// The fixed ordered sequence of four actions a plant expects.
///
/// Duplicates are allowed. Construction from any other length fails, so a
/// mis-configured plant is rejected when the catalog loads rather than
/// producing nonsense scores mid-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ActionType>", into = "Vec<ActionType>")]
pub struct IdealCombo([ActionType; REQUIRED_ACTIONS]);

impl IdealCombo {
    /// Create a combo from exactly four actions.
    pub fn new(actions: [ActionType; REQUIRED_ACTIONS]) -> Self {
        Self(actions)
    }

    /// The expected action at a 0-indexed step.
    pub fn expected(&self, step: usize) -> Option<ActionType> {
        self.0.get(step).copied()
    }

    /// Whether the action appears anywhere in the combo.
    pub fn contains(&self, action: ActionType) -> bool {
        self.0.contains(&action)
    }

    /// Judge `action` submitted at 0-indexed `step`.
    ///
    /// Membership and position are separate checks over the whole combo: an
    /// action that appears earlier in the combo is still `Correct` when it
    /// also matches the slot for this step.
    pub fn classify(&self, action: ActionType, step: usize) -> ActionOutcome {
        if !self.contains(action) {
            ActionOutcome::NotInCombo
        } else if self.expected(step) == Some(action) {
            ActionOutcome::Correct
        } else {
            ActionOutcome::WrongOrder
        }
    }

    /// The four actions in order.
    pub fn actions(&self) -> &[ActionType; REQUIRED_ACTIONS] {
        &self.0
    }
}

impl TryFrom<Vec<ActionType>> for IdealCombo {
    type Error = OrchardError;

    fn try_from(actions: Vec<ActionType>) -> Result<Self> {
        let len = actions.len();
        let array: [ActionType; REQUIRED_ACTIONS] = actions.try_into().map_err(|_| {
            OrchardError::config(format!(
                "ideal combo must have exactly {} actions, got {}",
                REQUIRED_ACTIONS, len
            ))
        })?;
        Ok(Self(array))
    }
}

impl From<IdealCombo> for Vec<ActionType> {
    fn from(combo: IdealCombo) -> Self {
        combo.0.to_vec()
    }
}
