//! Declarative action animations.
//!
//! An action animation is a list of timed effects. The core builds the list;
//! an external driver advances time and applies the effects it gets back.

use std::time::Duration;

use serde::Serialize;

use crate::config::AnimationConfig;
use crate::core::action::ActionType;

/// Something the presentation layer should do at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "effect", content = "action")]
pub enum Effect {
    /// Show the action's effect object and start its animator.
    Show(ActionType),
    /// Play the action's sound.
    PlaySound(ActionType),
    /// Stop the animator and hide the effect object.
    Hide(ActionType),
    /// The lockout is over; controls may be released.
    Unlock,
}

/// An effect scheduled at an offset from the start of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnimationStep {
    pub at: Duration,
    pub effect: Effect,
}

/// Timeline for one submitted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionAnimation {
    pub action: ActionType,
    /// Sorted by `at`.
    pub steps: Vec<AnimationStep>,
}

impl ActionAnimation {
    pub fn for_action(action: ActionType, config: &AnimationConfig) -> Self {
        let visible = seconds(config.action_seconds);
        let lockout = seconds(config.lockout_seconds);

        let mut steps = vec![
            AnimationStep {
                at: Duration::ZERO,
                effect: Effect::Show(action),
            },
            AnimationStep {
                at: Duration::ZERO,
                effect: Effect::PlaySound(action),
            },
            AnimationStep {
                at: visible,
                effect: Effect::Hide(action),
            },
            AnimationStep {
                at: lockout,
                effect: Effect::Unlock,
            },
        ];
        // Stable: Hide stays ahead of Unlock when both land together.
        steps.sort_by_key(|step| step.at);

        Self { action, steps }
    }

    /// Offset of the last step.
    pub fn duration(&self) -> Duration {
        self.steps.last().map_or(Duration::ZERO, |step| step.at)
    }

    /// When the controls unlock.
    pub fn lockout(&self) -> Duration {
        self.steps
            .iter()
            .find(|step| step.effect == Effect::Unlock)
            .map_or(Duration::ZERO, |step| step.at)
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

/// Plays an `ActionAnimation` against externally supplied time.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    animation: ActionAnimation,
    elapsed: Duration,
    cursor: usize,
}

impl AnimationPlayer {
    pub fn new(animation: ActionAnimation) -> Self {
        Self {
            animation,
            elapsed: Duration::ZERO,
            cursor: 0,
        }
    }

    /// Advance by `delta` and return every effect that came due.
    pub fn advance(&mut self, delta: Duration) -> Vec<Effect> {
        self.elapsed += delta;
        let due: Vec<Effect> = self.animation.steps[self.cursor..]
            .iter()
            .take_while(|step| step.at <= self.elapsed)
            .map(|step| step.effect)
            .collect();
        self.cursor += due.len();
        due
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.animation.steps.len()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
