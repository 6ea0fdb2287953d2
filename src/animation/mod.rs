//! Animation Module
//!
//! Keyframe clips and the mixer that plays them:
//! - [`KeyframeTrack`]: times and values with linear, step or cubic sampling
//! - [`AnimationClip`]: named, immutable set of tracks shared by `Arc`
//! - [`Binder`]: resolves track names to scene nodes
//! - [`ClipAction`]: per-clip playback state and loop policy
//! - [`AnimationMixer`]: action cache, time integration and pose blending

mod values;

pub mod accumulate;
pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod mixer;
pub mod tracks;

pub use accumulate::PoseAccumulator;
pub use action::{ActionState, ActionStep, ClipAction, LoopMode, PlaybackDirection};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath, ValueKind};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta, TrackValue};
pub use mixer::{ActionHandle, AnimationMixer, MixerEvent};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
