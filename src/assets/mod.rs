//! Asset Module
//!
//! Loader-facing data: [`Prefab`] hierarchies with their animation clips, and
//! the [`ModelLoader`] contract that produces them.

pub mod loader;
pub mod prefab;

pub use loader::{LoadReply, MemoryLoader, ModelLoader, PendingModel};
pub use prefab::{Prefab, PrefabNode};
