//! Control Panel Module
//!
//! A strongly-typed parameter panel: [`Folder`]s of [`Field`] descriptors,
//! each with a getter, an optional setter and change hooks, generic over
//! the context the fields are bound to.
//!
//! [`controls`] provides the folders for an
//! [`AnimationMixer`](crate::animation::AnimationMixer) and its actions.
//!
//! ```rust,ignore
//! let mut panel = ControlPanel::new();
//! panel.add_folder(controls::mixer_folder((0.0, 5.0)));
//! panel.set(&mut mixer, controls::MIXER_FOLDER, controls::TIME_SCALE, FieldValue::Number(2.0))?;
//! ```

pub mod controls;
pub mod field;
#[allow(clippy::module_inception)]
pub mod panel;
pub mod queue;

pub use field::{Field, FieldKind, FieldValue};
pub use panel::{ControlPanel, Folder};
pub use queue::{ControlQueue, ControlSender, ControlWrite};
