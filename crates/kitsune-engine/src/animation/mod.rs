//! Keyframe animation.
//!
//! `AnimationClip`s are timelines bound to scene nodes; an `AnimationMixer` plays
//! them as actions and blends the result into node transforms; an
//! `AnimationHolder` switches between named clips with crossfades.

mod action;
mod clip;
mod holder;
mod mixer;

pub use action::{ActionId, AnimationAction, LoopMode};
pub use clip::{AnimationClip, Channel, KeyframeTrack, Sample, TrackValues};
pub use holder::{AnimationHolder, CROSSFADE_SECONDS};
pub use mixer::AnimationMixer;
