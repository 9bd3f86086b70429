//! Growth engine for Orchard.
//!
//! The engine judges each submitted action against the plant's ideal combo
//! and, on the fourth action, scores the session and records the result in
//! the progress ledger. All session mutations go through this struct.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PlantConfig;
use crate::core::action::{ActionOutcome, ActionType};
use crate::core::scoring::{GrowthResult, ScoringPolicy};
use crate::core::session::{GrowthSession, GrowthStatus};
use crate::presentation::audio::AudioSink;
use crate::storage::{LedgerStore, ProgressStore, UnlockChange};

/// Result of a finished growth session, produced exactly once per session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthComplete {
    pub plant_id: String,
    pub actions: Vec<ActionType>,
    pub outcomes: Vec<ActionOutcome>,
    #[serde(flatten)]
    pub result: GrowthResult,
    /// Final sprite: the perfect sprite or the one for the mutation count.
    pub sprite: Option<String>,
    /// What the result unlocked; `None` when the ledger could not be saved.
    pub unlocks: Option<UnlockChange>,
    /// Whether the ledger write succeeded.
    pub persisted: bool,
    pub completed_at: DateTime<Utc>,
}

/// One accepted action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// 1-based number of the action just taken.
    pub step: usize,
    pub action: ActionType,
    pub outcome: ActionOutcome,
    /// Growth-stage sprite to show now.
    pub sprite: Option<String>,
    /// Present on the fourth action.
    pub completion: Option<GrowthComplete>,
}

/// What happened to a submitted action.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Accepted(StepReport),
    /// The session was already complete; nothing changed.
    Ignored,
}

impl Submission {
    /// The 1-based step number, or `None` if the action was ignored.
    pub fn step(&self) -> Option<usize> {
        match self {
            Submission::Accepted(report) => Some(report.step),
            Submission::Ignored => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }

    pub fn report(&self) -> Option<&StepReport> {
        match self {
            Submission::Accepted(report) => Some(report),
            Submission::Ignored => None,
        }
    }

    pub fn completion(&self) -> Option<&GrowthComplete> {
        self.report().and_then(|r| r.completion.as_ref())
    }
}

/// Growth state machine for one plant.
///
/// Borrows its collaborators: the plant definition, the progress ledger it
/// reports results to, and the audio sink it cues.
pub struct GrowthEngine<'a, S: LedgerStore> {
    plant: &'a PlantConfig,
    policy: ScoringPolicy,
    progress: &'a ProgressStore<S>,
    audio: &'a dyn AudioSink,
    session: GrowthSession,
}

impl<'a, S: LedgerStore> GrowthEngine<'a, S> {
    /// Create an engine with a fresh session.
    pub fn new(
        plant: &'a PlantConfig,
        policy: ScoringPolicy,
        progress: &'a ProgressStore<S>,
        audio: &'a dyn AudioSink,
    ) -> Self {
        Self {
            plant,
            policy,
            progress,
            audio,
            session: GrowthSession::new(),
        }
    }

    pub fn plant(&self) -> &PlantConfig {
        self.plant
    }

    pub fn session(&self) -> &GrowthSession {
        &self.session
    }

    pub fn status(&self) -> GrowthStatus {
        self.session.status()
    }

    /// Submit the next action.
    ///
    /// Once four actions have been taken further submissions are ignored
    /// until `reset`.
    pub fn submit_action(&mut self, action: ActionType) -> Submission {
        if self.session.is_complete() {
            warn!(plant = %self.plant.id, %action, "all actions already taken, ignoring");
            return Submission::Ignored;
        }

        let step = self.session.stage();
        let outcome = self.plant.ideal_combo.classify(action, step);
        self.session.record(action, outcome);
        debug!(plant = %self.plant.id, step = step + 1, %action, ?outcome, "action judged");

        self.audio.play_action(action);

        let stage = self.session.stage();
        let sprite = self.plant.visuals.growth_sprite(stage).map(str::to_owned);
        if sprite.is_none() {
            warn!(plant = %self.plant.id, stage, "growth sprite not configured");
        }

        let completion = self.session.is_complete().then(|| self.complete());

        Submission::Accepted(StepReport {
            step: stage,
            action,
            outcome,
            sprite,
            completion,
        })
    }

    /// Return to `Idle`, discarding the current session. The ledger is not
    /// touched.
    pub fn reset(&mut self) {
        debug!(plant = %self.plant.id, "session reset");
        self.session.reset();
    }

    /// Score the finished session and record it. Runs once per session.
    fn complete(&mut self) -> GrowthComplete {
        let result = GrowthResult::compute(self.session.outcomes(), self.policy);
        self.session.finish(result);

        info!(
            plant = %self.plant.id,
            correct = result.correct_count,
            quality = result.quality,
            mutations = result.mutation_tier,
            perfect = result.is_perfect,
            "plant grown"
        );

        let unlocks = match self
            .progress
            .record_result(&self.plant.id, result.quality, result.is_perfect)
        {
            Ok(change) => Some(change),
            Err(err) => {
                warn!(plant = %self.plant.id, "could not save progress: {}", err);
                None
            }
        };

        let sprite = self
            .plant
            .visuals
            .result_sprite(result.mutation_tier)
            .map(str::to_owned);
        if sprite.is_none() {
            warn!(
                plant = %self.plant.id,
                mutations = result.mutation_tier,
                "result sprite not configured"
            );
        }

        GrowthComplete {
            plant_id: self.plant.id.clone(),
            actions: self.session.taken_actions().to_vec(),
            outcomes: self.session.outcomes().to_vec(),
            result,
            sprite,
            persisted: unlocks.is_some(),
            unlocks,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::action::ActionType::*;
    use crate::core::action::IdealCombo;
    use crate::presentation::audio::testing::{Cue, RecordingAudio};
    use crate::presentation::audio::SilentAudio;
    use crate::storage::MemoryLedgerStore;
    use std::sync::Arc;

    type Backend = Arc<MemoryLedgerStore>;

    fn plant() -> PlantConfig {
        Config::default().plant("dragonfruit").unwrap().clone()
    }

    fn progress() -> (ProgressStore<Backend>, Backend) {
        let backend = Arc::new(MemoryLedgerStore::new());
        (ProgressStore::new(Arc::clone(&backend)), backend)
    }

    fn engine<'a>(
        plant: &'a PlantConfig,
        progress: &'a ProgressStore<Backend>,
    ) -> GrowthEngine<'a, Backend> {
        GrowthEngine::new(plant, ScoringPolicy::CorrectOnly, progress, &SilentAudio)
    }

    fn play<S: LedgerStore>(
        engine: &mut GrowthEngine<'_, S>,
        actions: [ActionType; 4],
    ) -> GrowthComplete {
        let mut last = Submission::Ignored;
        for action in actions {
            last = engine.submit_action(action);
        }
        last.completion().cloned().unwrap()
    }

    #[test]
    fn test_stage_tracks_submissions_and_fifth_is_ignored() {
        let plant = plant();
        let (progress, _) = progress();
        let mut engine = engine(&plant, &progress);

        for (i, action) in [Fertilizer, Sun, Sun, Water].into_iter().enumerate() {
            let submission = engine.submit_action(action);
            assert_eq!(submission.step(), Some(i + 1));
            assert_eq!(engine.session().stage(), i + 1);
        }

        let before = engine.session().clone();
        assert_eq!(engine.submit_action(Wait), Submission::Ignored);
        assert_eq!(engine.session(), &before);
        assert_eq!(engine.status(), GrowthStatus::Complete);
    }

    #[test]
    fn test_perfect_sequence() {
        let plant = plant();
        let (progress, backend) = progress();
        let mut engine = engine(&plant, &progress);

        let done = play(&mut engine, [Water, Sun, Prune, Wait]);

        assert_eq!(done.outcomes, vec![ActionOutcome::Correct; 4]);
        assert_eq!(done.result.quality, 100);
        assert_eq!(done.result.mutation_tier, 0);
        assert!(done.result.is_perfect);
        assert_eq!(done.sprite.as_deref(), Some("dragonfruit_perfect"));
        assert!(done.persisted);
        assert!(done.unlocks.unwrap().new_perfect);

        assert_eq!(engine.session().quality(), Some(100));
        assert!(engine.session().is_perfect());
        assert!(progress.is_perfect_unlocked("dragonfruit"));
        assert_eq!(backend.save_count(), 1);
    }

    #[test]
    fn test_swapped_first_two_actions() {
        let plant = plant();
        let (progress, _) = progress();
        let mut engine = engine(&plant, &progress);

        let done = play(&mut engine, [Sun, Water, Prune, Wait]);

        assert_eq!(
            done.outcomes,
            vec![
                ActionOutcome::WrongOrder,
                ActionOutcome::WrongOrder,
                ActionOutcome::Correct,
                ActionOutcome::Correct
            ]
        );
        assert_eq!(done.result.quality, 50);
        assert_eq!(done.result.mutation_tier, 2);
        assert!(!done.result.is_perfect);
        assert_eq!(done.sprite.as_deref(), Some("dragonfruit_mutation_2"));
        assert!(progress.is_tier_unlocked("dragonfruit", 50));
        assert!(!progress.is_perfect_unlocked("dragonfruit"));
    }

    #[test]
    fn test_action_not_in_combo() {
        let plant = plant();
        let (progress, _) = progress();
        let mut engine = engine(&plant, &progress);

        let first = engine.submit_action(Fertilizer);
        assert_eq!(first.report().unwrap().outcome, ActionOutcome::NotInCombo);

        engine.submit_action(Sun);
        engine.submit_action(Prune);
        let done = engine.submit_action(Wait).completion().cloned().unwrap();

        assert_eq!(done.result.quality, 75);
        assert_eq!(done.result.mutation_tier, 1);
    }

    #[test]
    fn test_partial_credit_policy() {
        let plant = plant();
        let (progress, _) = progress();
        let policy = ScoringPolicy::PartialCredit;
        let mut engine = GrowthEngine::new(&plant, policy, &progress, &SilentAudio);

        let done = play(&mut engine, [Sun, Water, Prune, Wait]);

        assert_eq!(done.result.quality, 70);
        assert!(progress.is_tier_unlocked("dragonfruit", 50));
    }

    #[test]
    fn test_completion_only_on_fourth_action() {
        let plant = plant();
        let (progress, backend) = progress();
        let mut engine = engine(&plant, &progress);

        for action in [Water, Sun, Prune] {
            let submission = engine.submit_action(action);
            assert!(submission.completion().is_none());
            assert!(engine.session().quality().is_none());
        }
        assert_eq!(backend.save_count(), 0);

        assert!(engine.submit_action(Wait).completion().is_some());
        assert!(engine.submit_action(Wait).completion().is_none());
        assert_eq!(backend.save_count(), 1);
    }

    #[test]
    fn test_reset_returns_to_idle_without_touching_ledger() {
        let plant = plant();
        let (progress, backend) = progress();
        let mut engine = engine(&plant, &progress);

        play(&mut engine, [Water, Sun, Prune, Wait]);
        let saved = backend.saved();

        engine.reset();

        assert_eq!(engine.status(), GrowthStatus::Idle);
        assert_eq!(engine.session().stage(), 0);
        assert!(engine.session().taken_actions().is_empty());
        assert!(engine.session().outcomes().is_empty());
        assert_eq!(backend.saved(), saved);
        assert_eq!(backend.save_count(), 1);

        // A new session can be played after reset.
        assert_eq!(engine.submit_action(Water).step(), Some(1));
    }

    #[test]
    fn test_persist_failure_keeps_result() {
        let plant = plant();
        let (progress, backend) = progress();
        backend.set_fail_writes(true);
        let mut engine = engine(&plant, &progress);

        let done = play(&mut engine, [Water, Sun, Prune, Wait]);

        assert!(!done.persisted);
        assert!(done.unlocks.is_none());
        assert_eq!(done.result.quality, 100);
        assert_eq!(engine.session().quality(), Some(100));
    }

    #[test]
    fn test_audio_cued_per_accepted_action() {
        let plant = plant();
        let (progress, _) = progress();
        let audio = RecordingAudio::default();
        let mut engine = GrowthEngine::new(&plant, ScoringPolicy::CorrectOnly, &progress, &audio);

        play(&mut engine, [Water, Sun, Prune, Wait]);
        engine.submit_action(Water);

        assert_eq!(
            audio.cues(),
            vec![
                Cue::Action(Water),
                Cue::Action(Sun),
                Cue::Action(Prune),
                Cue::Action(Wait)
            ]
        );
    }

    #[test]
    fn test_growth_sprites_per_stage() {
        let plant = plant();
        let (progress, _) = progress();
        let mut engine = engine(&plant, &progress);

        let first = engine.submit_action(Water);
        let sprite = first.report().unwrap().sprite.as_deref();
        assert_eq!(sprite, Some("dragonfruit_stage_1"));
    }

    #[test]
    fn test_missing_visuals_degrade_gracefully() {
        let plant = PlantConfig::new("bare", "Bare", IdealCombo::new([Water, Sun, Prune, Wait]));
        let (progress, _) = progress();
        let mut engine = engine(&plant, &progress);

        let first = engine.submit_action(Water);
        assert!(first.report().unwrap().sprite.is_none());

        engine.submit_action(Sun);
        engine.submit_action(Prune);
        let done = engine.submit_action(Wait).completion().cloned().unwrap();
        assert!(done.sprite.is_none());
        assert!(done.persisted);
    }

    #[test]
    fn test_completion_serializes_flat() {
        let plant = plant();
        let (progress, _) = progress();
        let mut engine = engine(&plant, &progress);

        let done = play(&mut engine, [Water, Sun, Prune, Wait]);
        let json = serde_json::to_value(&done).unwrap();

        assert_eq!(json["plant_id"], "dragonfruit");
        assert_eq!(json["quality"], 100);
        assert_eq!(json["is_perfect"], true);
        assert_eq!(json["outcomes"][0], "correct");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_action() -> impl Strategy<Value = ActionType> {
            proptest::sample::select(ActionType::ALL.to_vec())
        }

        proptest! {
            // Property: stage equals submissions (capped at 4) and the parallel
            // lists stay aligned.
            #[test]
            fn prop_stage_matches_submissions(
                actions in proptest::collection::vec(arb_action(), 0..8),
            ) {
                let plant = plant();
                let (progress, _) = progress();
                let mut engine = engine(&plant, &progress);

                for (i, action) in actions.iter().enumerate() {
                    let submission = engine.submit_action(*action);
                    if i < 4 {
                        prop_assert_eq!(submission.step(), Some(i + 1));
                    } else {
                        prop_assert_eq!(submission, Submission::Ignored);
                    }
                    let session = engine.session();
                    prop_assert_eq!(session.taken_actions().len(), session.outcomes().len());
                    prop_assert_eq!(session.stage(), (i + 1).min(4));
                    prop_assert_eq!(session.quality().is_some(), session.stage() == 4);
                }
            }

            // Property: the outcome at each step follows membership and slot checks.
            #[test]
            fn prop_outcomes_follow_combo(
                actions in proptest::collection::vec(arb_action(), 4),
            ) {
                let plant = plant();
                let (progress, _) = progress();
                let mut engine = engine(&plant, &progress);
                let combo = plant.ideal_combo;

                for (step, action) in actions.iter().enumerate() {
                    let outcome = engine.submit_action(*action).report().unwrap().outcome;
                    let expected = if !combo.contains(*action) {
                        ActionOutcome::NotInCombo
                    } else if combo.expected(step) == Some(*action) {
                        ActionOutcome::Correct
                    } else {
                        ActionOutcome::WrongOrder
                    };
                    prop_assert_eq!(outcome, expected);
                }
            }
        }
    }
}
