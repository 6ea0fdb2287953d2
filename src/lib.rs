#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # clipmix
//!
//! Keyframe animation playback and blending over a retained-mode scene
//! graph, in the manner of three.js `AnimationMixer` / `AnimationAction`.
//!
//! ```rust,ignore
//! use clipmix::{AnimationMixer, Scene};
//!
//! let mut scene = Scene::new();
//! let root = scene.instantiate(&prefab);
//! let mut mixer = AnimationMixer::with_root(root);
//!
//! let walk = mixer.clip_action(&scene, &prefab.animations[0]);
//! mixer.action_mut(walk)?.play();
//!
//! mixer.advance(1.0 / 60.0, &mut scene)?;
//! ```

pub mod animation;
pub mod app;
pub mod assets;
pub mod errors;
pub mod panel;
pub mod scene;
pub mod utils;

pub use animation::{
    ActionHandle, ActionState, AnimationClip, AnimationMixer, Binder, ClipAction, LoopMode,
    MixerEvent,
};
pub use app::{HeadlessBackend, RenderBackend, Session, SessionSettings};
pub use assets::{MemoryLoader, ModelLoader, Prefab, PrefabNode};
pub use errors::{MixerError, Result};
pub use panel::{ControlPanel, FieldKind, FieldValue};
pub use scene::{Camera, Node, NodeHandle, Scene};
