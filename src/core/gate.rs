//! Action gate for Orchard.
//!
//! The gate owns the six action controls. It lets one submission resolve at a
//! time, locks every control while an action animates, and marks a control
//! consumed once the engine accepts its action.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::AnimationConfig;
use crate::core::action::ActionType;
use crate::core::engine::{GrowthEngine, Submission};
use crate::presentation::animation::ActionAnimation;
use crate::storage::LedgerStore;

/// State of one action control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlState {
    /// Whether the control can be pressed right now.
    pub enabled: bool,
    /// Set once the control's action was accepted; cleared by `reset`.
    pub consumed: bool,
    /// The last choice made through `set_enabled`. Locking and consuming
    /// never change it.
    pub externally_enabled: bool,
}

impl ControlState {
    fn refresh(&mut self, locked: bool) {
        self.enabled = !locked && self.externally_enabled && !self.consumed;
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            enabled: true,
            consumed: false,
            externally_enabled: true,
        }
    }
}

/// Why a submission did not reach the engine, or was refused by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Another action is still in flight.
    Busy,
    /// The control was already used this session.
    Consumed,
    /// The control was disabled from outside.
    Disabled,
    /// The engine already has four actions.
    SessionComplete,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Busy => "busy",
            Rejection::Consumed => "consumed",
            Rejection::Disabled => "disabled",
            Rejection::SessionComplete => "session complete",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of `ActionGate::submit`.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// The engine accepted the action. The gate stays locked until `release`.
    Submitted {
        submission: Submission,
        animation: ActionAnimation,
    },
    /// Nothing changed.
    Rejected(Rejection),
}

impl GateDecision {
    pub fn is_submitted(&self) -> bool {
        matches!(self, GateDecision::Submitted { .. })
    }

    pub fn submission(&self) -> Option<&Submission> {
        match self {
            GateDecision::Submitted { submission, .. } => Some(submission),
            GateDecision::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            GateDecision::Submitted { .. } => None,
            GateDecision::Rejected(reason) => Some(*reason),
        }
    }
}

/// Lockout coordinator for the action controls.
#[derive(Debug, Clone)]
pub struct ActionGate {
    controls: BTreeMap<ActionType, ControlState>,
    locked: bool,
    in_flight: Option<ActionType>,
    animation: AnimationConfig,
}

impl ActionGate {
    /// All six controls start enabled and unused.
    pub fn new(animation: AnimationConfig) -> Self {
        Self {
            controls: ActionType::ALL
                .iter()
                .map(|&action| (action, ControlState::default()))
                .collect(),
            locked: false,
            in_flight: None,
            animation,
        }
    }

    pub fn control(&self, action: ActionType) -> ControlState {
        self.controls.get(&action).copied().unwrap_or_default()
    }

    pub fn controls(&self) -> impl Iterator<Item = (ActionType, ControlState)> + '_ {
        self.controls.iter().map(|(&action, &state)| (action, state))
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The action whose animation is currently playing.
    pub fn in_flight(&self) -> Option<ActionType> {
        self.in_flight
    }

    /// Whether pressing the control would reach the engine.
    pub fn is_interactable(&self, action: ActionType) -> bool {
        let state = self.control(action);
        !self.is_locked() && state.enabled && !state.consumed
    }

    /// Disable every control.
    ///
    /// Each control keeps its external enabled choice, so `unlock` can
    /// restore it.
    pub fn lock(&mut self) {
        self.locked = true;
        self.refresh();
    }

    /// Re-enable the controls that are enabled from outside and not
    /// consumed.
    pub fn unlock(&mut self) {
        self.locked = false;
        self.refresh();
    }

    /// Enable or disable a control from outside.
    ///
    /// The choice survives locking, consumption and `reset`. While locked it
    /// takes effect on `unlock`.
    pub fn set_enabled(&mut self, action: ActionType, enabled: bool) {
        let state = self.controls.entry(action).or_default();
        state.externally_enabled = enabled;
        state.refresh(self.locked);
    }

    /// Submit an action through the gate.
    ///
    /// On acceptance the gate stays locked with the action in flight and the
    /// control consumed; the caller plays the returned animation and calls
    /// `release` when its lockout ends.
    pub fn submit<S: LedgerStore>(
        &mut self,
        action: ActionType,
        engine: &mut GrowthEngine<'_, S>,
    ) -> GateDecision {
        if let Some(reason) = self.refusal(action) {
            debug!(%action, %reason, "submission rejected");
            return GateDecision::Rejected(reason);
        }

        self.lock();
        self.in_flight = Some(action);

        let submission = engine.submit_action(action);
        if !submission.is_accepted() {
            self.release();
            return GateDecision::Rejected(Rejection::SessionComplete);
        }

        if let Some(state) = self.controls.get_mut(&action) {
            state.consumed = true;
            state.refresh(self.locked);
        }

        GateDecision::Submitted {
            submission,
            animation: ActionAnimation::for_action(action, &self.animation),
        }
    }

    /// End the in-flight window and unlock the controls.
    pub fn release(&mut self) {
        if let Some(action) = self.in_flight.take() {
            debug!(%action, "action released");
        }
        self.unlock();
    }

    /// Make every consumed control usable again, for a new session.
    ///
    /// Controls disabled from outside stay disabled.
    pub fn reset(&mut self) {
        self.release();
        for state in self.controls.values_mut() {
            state.consumed = false;
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        let locked = self.locked;
        for state in self.controls.values_mut() {
            state.refresh(locked);
        }
    }

    fn refusal(&self, action: ActionType) -> Option<Rejection> {
        if self.in_flight.is_some() || self.is_locked() {
            return Some(Rejection::Busy);
        }
        let state = self.control(action);
        if state.consumed {
            Some(Rejection::Consumed)
        } else if !state.externally_enabled {
            Some(Rejection::Disabled)
        } else {
            None
        }
    }
}

impl Default for ActionGate {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}
