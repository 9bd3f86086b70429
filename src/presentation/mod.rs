//! Capability interfaces and view models for the presentation layer.
//!
//! Nothing here renders or plays anything. The core describes what should be
//! seen and heard; a frontend decides how.

pub mod animation;
pub mod audio;
pub mod collection;

pub use animation::{ActionAnimation, AnimationPlayer, AnimationStep, Effect};
pub use audio::{AudioSink, MusicTrack, SilentAudio, TracingAudio, UiSound};
pub use collection::{Collection, CollectionEntry, Variant, VariantSlot, MUTATION_SLOT_TIERS};
