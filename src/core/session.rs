//! Growth session state.
//!
//! A `GrowthSession` is one play-through of one plant. It only records what
//! happened; classification and scoring are driven by the engine.

use serde::{Deserialize, Serialize};

use crate::core::action::{ActionOutcome, ActionType, REQUIRED_ACTIONS};
use crate::core::scoring::GrowthResult;

/// Lifecycle status of a growth session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStatus {
    /// No action taken yet.
    #[default]
    Idle,
    /// Between one and three actions taken.
    InProgress,
    /// All four actions taken; results computed.
    Complete,
}

impl GrowthStatus {
    /// Check if the session accepts no further actions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GrowthStatus::Complete)
    }
}

/// One play-through of one plant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthSession {
    taken_actions: Vec<ActionType>,
    outcomes: Vec<ActionOutcome>,
    result: Option<GrowthResult>,
}

impl GrowthSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actions taken so far (0-4).
    pub fn stage(&self) -> usize {
        self.taken_actions.len()
    }

    pub fn status(&self) -> GrowthStatus {
        match self.stage() {
            0 => GrowthStatus::Idle,
            n if n < REQUIRED_ACTIONS => GrowthStatus::InProgress,
            _ => GrowthStatus::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn taken_actions(&self) -> &[ActionType] {
        &self.taken_actions
    }

    pub fn outcomes(&self) -> &[ActionOutcome] {
        &self.outcomes
    }

    /// Final scores, present only once the session is complete.
    pub fn result(&self) -> Option<&GrowthResult> {
        self.result.as_ref()
    }

    pub fn quality(&self) -> Option<u8> {
        self.result.map(|r| r.quality)
    }

    pub fn mutation_tier(&self) -> Option<u8> {
        self.result.map(|r| r.mutation_tier)
    }

    pub fn is_perfect(&self) -> bool {
        self.result.is_some_and(|r| r.is_perfect)
    }

    /// Counter text shown next to the controls, e.g. `2/4`.
    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.stage(), REQUIRED_ACTIONS)
    }

    /// Clear everything back to `Idle`.
    pub fn reset(&mut self) {
        self.taken_actions.clear();
        self.outcomes.clear();
        self.result = None;
    }

    /// Append one judged action. Callers check `is_complete` first.
    pub(crate) fn record(&mut self, action: ActionType, outcome: ActionOutcome) {
        debug_assert!(self.stage() < REQUIRED_ACTIONS);
        self.taken_actions.push(action);
        self.outcomes.push(outcome);
    }

    pub(crate) fn finish(&mut self, result: GrowthResult) {
        debug_assert!(self.is_complete());
        self.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::ScoringPolicy;

    #[test]
    fn test_new_session_is_idle() {
        let session = GrowthSession::new();
        assert_eq!(session.status(), GrowthStatus::Idle);
        assert_eq!(session.stage(), 0);
        assert!(session.quality().is_none());
        assert!(session.mutation_tier().is_none());
        assert!(!session.is_perfect());
        assert_eq!(session.progress_label(), "0/4");
    }

    #[test]
    fn test_status_follows_stage() {
        let mut session = GrowthSession::new();
        session.record(ActionType::Water, ActionOutcome::Correct);
        assert_eq!(session.status(), GrowthStatus::InProgress);

        session.record(ActionType::Sun, ActionOutcome::Correct);
        session.record(ActionType::Prune, ActionOutcome::Correct);
        assert_eq!(session.status(), GrowthStatus::InProgress);
        assert!(session.quality().is_none());

        session.record(ActionType::Wait, ActionOutcome::Correct);
        assert_eq!(session.status(), GrowthStatus::Complete);
        assert_eq!(session.progress_label(), "4/4");
    }

    #[test]
    fn test_reset_clears_result() {
        let mut session = GrowthSession::new();
        for action in [
            ActionType::Water,
            ActionType::Sun,
            ActionType::Prune,
            ActionType::Wait,
        ] {
            session.record(action, ActionOutcome::Correct);
        }
        let result = GrowthResult::compute(session.outcomes(), ScoringPolicy::CorrectOnly);
        session.finish(result);
        assert_eq!(session.quality(), Some(100));

        session.reset();
        assert_eq!(session, GrowthSession::default());
        assert!(session.taken_actions().is_empty());
        assert!(session.outcomes().is_empty());
    }

    #[test]
    fn test_terminal_status() {
        assert!(GrowthStatus::Complete.is_terminal());
        assert!(!GrowthStatus::InProgress.is_terminal());
        assert!(!GrowthStatus::Idle.is_terminal());
    }
}
