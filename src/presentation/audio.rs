//! Audio capability handed to the game core.
//!
//! The core only says *what* should be heard. Mixing, clip loading and
//! playback belong to the implementation behind `AudioSink`.

use serde::Serialize;

use crate::config::AudioConfig;
use crate::core::action::ActionType;

/// Interface sounds.
///
/// The `play` command clicks once per press; hover is for frontends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiSound {
    Click,
    Hover,
}

/// Background music tracks.
///
/// The CLI only plays `Garden`. `Menu` is for frontends with a title screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicTrack {
    Menu,
    Garden,
}

/// Something that can play the game's sounds.
pub trait AudioSink {
    /// Play the sound effect for a gardening action.
    fn play_action(&self, action: ActionType);

    /// Play an interface sound.
    fn play_ui(&self, sound: UiSound);

    /// Start a music track, unless it is already playing.
    fn play_music(&self, track: MusicTrack);

    fn stop_music(&self);
}

/// Discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play_action(&self, _action: ActionType) {}

    fn play_ui(&self, _sound: UiSound) {}

    fn play_music(&self, _track: MusicTrack) {}

    fn stop_music(&self) {}
}

/// Logs every cue with the volume it would be played at.
#[derive(Debug, Clone)]
pub struct TracingAudio {
    config: AudioConfig,
}

impl TracingAudio {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    /// Volume a music track plays at. The menu track is scaled by
    /// `menu_music_factor`.
    pub fn music_volume(&self, track: MusicTrack) -> f32 {
        match track {
            MusicTrack::Menu => self.config.music_volume * self.config.menu_music_factor,
            MusicTrack::Garden => self.config.music_volume,
        }
    }
}

impl AudioSink for TracingAudio {
    fn play_action(&self, action: ActionType) {
        tracing::debug!(
            %action,
            clip = action.sound_index(),
            volume = self.config.sfx_volume,
            "action sound"
        );
    }

    fn play_ui(&self, sound: UiSound) {
        tracing::debug!(?sound, volume = self.config.ui_volume, "ui sound");
    }

    fn play_music(&self, track: MusicTrack) {
        tracing::debug!(?track, volume = self.music_volume(track), "music");
    }

    fn stop_music(&self) {
        tracing::debug!("music stopped");
    }
}
