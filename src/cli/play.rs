//! Play command for Orchard.
//!
//! Grows one plant: every action goes through the action gate into the
//! growth engine, and the finished session is recorded in the ledger.

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::core::{
    ActionGate, ActionOutcome, ActionType, GateDecision, GrowthComplete, GrowthEngine,
    ScoringPolicy, REQUIRED_ACTIONS,
};
use crate::presentation::{AnimationPlayer, AudioSink, Effect, MusicTrack, TracingAudio, UiSound};
use crate::storage::{LedgerStore, ProgressStore};

/// Options for the play command.
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Override the configured scoring policy.
    pub policy: Option<ScoringPolicy>,
}

/// What happened to one requested action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepLine {
    pub action: ActionType,
    /// "accepted", "rejected" or "ignored".
    pub status: &'static str,
    /// 1-based step number, when accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ActionOutcome>,
    /// Action counter after this action, e.g. "2/4".
    pub counter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Output format for the play command.
#[derive(Debug, Clone, Serialize)]
pub struct PlayOutput {
    /// Whether the session ran.
    pub success: bool,
    pub plant_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub plant_name: String,
    pub policy: String,
    pub steps: Vec<StepLine>,
    /// Whether all four actions were taken.
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GrowthComplete>,
    /// Error message if the session could not start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlayOutput {
    /// Create a failed output.
    pub fn failure(plant_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            plant_id: plant_id.into(),
            plant_name: String::new(),
            policy: String::new(),
            steps: Vec::new(),
            complete: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// The play command implementation.
pub struct PlayCommand<S: LedgerStore> {
    progress: ProgressStore<S>,
    config: Config,
}

impl<S: LedgerStore> PlayCommand<S> {
    /// Create a new play command.
    pub fn new(store: S, config: Config) -> Self {
        Self {
            progress: ProgressStore::new(store),
            config,
        }
    }

    /// Grow `plant_id` with the given actions, in order.
    ///
    /// Actions after the fourth are reported as ignored. Audio cues are
    /// logged.
    pub fn run(&self, plant_id: &str, actions: &[ActionType], options: &PlayOptions) -> PlayOutput {
        let audio = TracingAudio::new(self.config.audio.clone());
        self.run_with_audio(plant_id, actions, options, &audio)
    }

    /// Like `run`, cueing `audio`: garden music for the session and a click
    /// for every press the gate sees.
    pub fn run_with_audio(
        &self,
        plant_id: &str,
        actions: &[ActionType],
        options: &PlayOptions,
        audio: &dyn AudioSink,
    ) -> PlayOutput {
        let plant = match self.config.plant(plant_id) {
            Ok(plant) => plant,
            Err(e) => return PlayOutput::failure(plant_id, e.to_string()),
        };
        let policy = options.policy.unwrap_or(self.config.scoring.policy);

        audio.play_music(MusicTrack::Garden);

        let mut engine = GrowthEngine::new(plant, policy, &self.progress, audio);
        let mut gate = ActionGate::new(self.config.animation.clone());
        let mut steps = Vec::with_capacity(actions.len());
        let mut result = None;

        for &action in actions {
            if engine.status().is_terminal() {
                steps.push(StepLine {
                    action,
                    status: "ignored",
                    step: None,
                    outcome: None,
                    counter: engine.session().progress_label(),
                    sprite: None,
                    reason: Some("all actions already taken".to_string()),
                });
                continue;
            }

            audio.play_ui(UiSound::Click);
            match gate.submit(action, &mut engine) {
                GateDecision::Submitted {
                    submission,
                    animation,
                } => {
                    // No frame clock here: play the whole timeline at once.
                    let duration = animation.duration();
                    let mut player = AnimationPlayer::new(animation);
                    for effect in player.advance(duration) {
                        debug!(?effect, "animation effect");
                        if effect == Effect::Unlock {
                            gate.release();
                        }
                    }

                    if let Some(report) = submission.report() {
                        steps.push(StepLine {
                            action,
                            status: "accepted",
                            step: Some(report.step),
                            outcome: Some(report.outcome),
                            counter: engine.session().progress_label(),
                            sprite: report.sprite.clone(),
                            reason: None,
                        });
                    }
                    if let Some(complete) = submission.completion() {
                        result = Some(complete.clone());
                    }
                }
                GateDecision::Rejected(reason) => steps.push(StepLine {
                    action,
                    status: "rejected",
                    step: None,
                    outcome: None,
                    counter: engine.session().progress_label(),
                    sprite: None,
                    reason: Some(reason.to_string()),
                }),
            }
        }

        audio.stop_music();

        PlayOutput {
            success: true,
            plant_id: plant.id.clone(),
            plant_name: plant.name.clone(),
            policy: policy.to_string(),
            steps,
            complete: engine.session().is_complete(),
            result,
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &PlayOutput, options: &PlayOptions) -> String {
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
    fn format_human_readable(&self, output: &PlayOutput) -> String {
        if !output.success {
            return format!(
                "Play failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = vec![format!("{} ({})", output.plant_name, output.plant_id)];
        for step in &output.steps {
            let verdict = match (step.outcome, &step.reason) {
                (Some(outcome), _) => outcome_label(outcome).to_string(),
                (None, Some(reason)) => format!("{} ({})", step.status, reason),
                (None, None) => step.status.to_string(),
            };
            lines.push(format!(
                "  {:>3}  {:<14} {}",
                step.counter, step.action, verdict
            ));
        }

        match &output.result {
            Some(result) => {
                lines.push(String::new());
                let mutations = result.result.mutation_tier;
                if result.result.is_perfect {
                    lines.push("Perfect harvest! Quality 100%.".to_string());
                } else {
                    let plural = if mutations == 1 { "" } else { "s" };
                    lines.push(format!(
                        "Quality {}%, {} mutation{}.",
                        result.result.quality, mutations, plural
                    ));
                }
                match result.unlocks {
                    Some(change) => {
                        if change.new_perfect {
                            lines.push("Unlocked: perfect variant".to_string());
                        }
                        if change.new_tier {
                            lines.push(format!("Unlocked: {}% variant", change.tier));
                        }
                    }
                    None => lines.push("Warning: progress could not be saved.".to_string()),
                }
            }
            None if !output.complete => {
                let taken = output.steps.iter().filter(|s| s.step.is_some()).count();
                lines.push(String::new());
                lines.push(format!(
                    "Session incomplete: {} of {} actions taken.",
                    taken, REQUIRED_ACTIONS
                ));
            }
            None => {}
        }

        lines.join("\n") + "\n"
    }
}

fn outcome_label(outcome: ActionOutcome) -> &'static str {
    match outcome {
        ActionOutcome::Correct => "correct",
        ActionOutcome::WrongOrder => "wrong order",
        ActionOutcome::NotInCombo => "not in combo",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::ActionType::*;
    use crate::presentation::audio::testing::{Cue, RecordingAudio};
    use crate::storage::MemoryLedgerStore;
    use std::sync::Arc;

    const PERFECT: [ActionType; 4] = [Water, Sun, Prune, Wait];

    fn setup() -> (Arc<MemoryLedgerStore>, PlayCommand<Arc<MemoryLedgerStore>>) {
        let store = Arc::new(MemoryLedgerStore::new());
        let cmd = PlayCommand::new(Arc::clone(&store), Config::default());
        (store, cmd)
    }

    #[test]
    fn test_play_output_failure() {
        let output = PlayOutput::failure("kiwi", "unknown plant");

        assert!(!output.success);
        assert_eq!(output.plant_id, "kiwi");
        assert!(output.steps.is_empty());
        assert_eq!(output.error, Some("unknown plant".to_string()));
    }

    #[test]
    fn test_play_perfect_session() {
        let (store, cmd) = setup();

        let output = cmd.run("dragonfruit", &PERFECT, &PlayOptions::default());

        assert!(output.success);
        assert!(output.complete);
        assert_eq!(output.steps.len(), 4);
        assert!(output.steps.iter().all(|s| s.outcome == Some(ActionOutcome::Correct)));
        let steps: Vec<Option<usize>> = output.steps.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(output.steps[3].counter, "4/4");

        let result = output.result.unwrap();
        assert!(result.result.is_perfect);
        assert!(result.persisted);

        let saved = store.saved().unwrap();
        let record = saved.get("dragonfruit").unwrap();
        assert!(record.perfect_unlocked);
        assert!(record.unlocked_tiers.contains(&100));
    }

    #[test]
    fn test_play_unknown_plant() {
        let (store, cmd) = setup();

        let output = cmd.run("kiwi", &[Water], &PlayOptions::default());

        assert!(!output.success);
        assert!(output.error.unwrap().contains("kiwi"));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_play_extra_actions_are_ignored() {
        let (_store, cmd) = setup();

        let output = cmd.run(
            "dragonfruit",
            &[Water, Sun, Prune, Wait, Fertilizer, SpecialLight],
            &PlayOptions::default(),
        );

        assert_eq!(output.steps.len(), 6);
        assert_eq!(output.steps[4].status, "ignored");
        assert_eq!(output.steps[5].status, "ignored");
        assert_eq!(output.steps[5].counter, "4/4");
    }

    #[test]
    fn test_play_repeated_action_is_rejected() {
        let (store, cmd) = setup();

        let output = cmd.run("dragonfruit", &[Water, Water, Sun], &PlayOptions::default());

        assert!(output.success);
        assert!(!output.complete);
        assert!(output.result.is_none());
        assert_eq!(output.steps[1].status, "rejected");
        assert_eq!(output.steps[1].reason.as_deref(), Some("consumed"));
        assert_eq!(output.steps[2].step, Some(2));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_play_cues_click_per_press() {
        let (_store, cmd) = setup();
        let audio = RecordingAudio::default();
        let options = PlayOptions::default();

        cmd.run_with_audio("dragonfruit", &[Water, Water, Sun], &options, &audio);

        assert_eq!(
            audio.cues(),
            vec![
                Cue::Music(MusicTrack::Garden),
                Cue::Ui(UiSound::Click),
                Cue::Action(Water),
                Cue::Ui(UiSound::Click),
                Cue::Ui(UiSound::Click),
                Cue::Action(Sun),
                Cue::StopMusic,
            ]
        );
    }

    #[test]
    fn test_play_unknown_plant_stays_silent() {
        let (_store, cmd) = setup();
        let audio = RecordingAudio::default();

        cmd.run_with_audio("kiwi", &[Water], &PlayOptions::default(), &audio);

        assert!(audio.cues().is_empty());
    }

    #[test]
    fn test_play_policy_override() {
        let (_store, cmd) = setup();
        let options = PlayOptions {
            policy: Some(ScoringPolicy::PartialCredit),
            ..Default::default()
        };

        // Water correct, Prune and Sun swapped, Wait correct.
        let output = cmd.run("dragonfruit", &[Water, Prune, Sun, Wait], &options);

        let result = output.result.unwrap();
        assert_eq!(output.policy, "partial_credit");
        assert_eq!(result.result.quality, 70);
        assert_eq!(result.result.mutation_tier, 2);
    }

    #[test]
    fn test_format_human_readable() {
        let (_store, cmd) = setup();
        let options = PlayOptions::default();

        let output = cmd.run("dragonfruit", &[Water, Sun, Fertilizer, Wait], &options);
        let text = cmd.format_output(&output, &options);

        assert!(text.contains("Dragon Fruit (dragonfruit)"));
        assert!(text.contains("not in combo"));
        assert!(text.contains("Quality 75%, 1 mutation."));
        assert!(text.contains("Unlocked: 75% variant"));
    }

    #[test]
    fn test_format_incomplete_session() {
        let (_store, cmd) = setup();
        let options = PlayOptions::default();

        let output = cmd.run("akebia", &[Fertilizer], &options);
        let text = cmd.format_output(&output, &options);

        assert!(text.contains("Session incomplete: 1 of 4 actions taken."));
    }

    #[test]
    fn test_format_json_and_quiet() {
        let (_store, cmd) = setup();
        let output = cmd.run("dragonfruit", &PERFECT, &PlayOptions::default());

        let json = cmd.format_output(
            &output,
            &PlayOptions {
                json: true,
                ..Default::default()
            },
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"]["quality"], 100);
        assert_eq!(value["steps"][0]["outcome"], "correct");

        let quiet = cmd.format_output(
            &output,
            &PlayOptions {
                quiet: true,
                ..Default::default()
            },
        );
        assert!(quiet.is_empty());
    }
}
