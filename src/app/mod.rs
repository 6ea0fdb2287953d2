//! Application Module
//!
//! [`Session`] owns the scene, camera, render back end, mixer, control
//! panel and frame clock, and runs them in a fixed per-frame order. Nothing
//! here is global; a program may run several sessions side by side.

pub mod backend;
pub mod session;
pub mod settings;

pub use backend::{HeadlessBackend, RenderBackend};
pub use session::{LoadedModel, Session};
pub use settings::SessionSettings;
