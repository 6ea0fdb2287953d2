//! Scene Graph Module
//!
//! The target hierarchy animation writes into:
//! - [`Node`]: hierarchy links, transform and morph weights
//! - [`Transform`]: position, rotation, scale with dirty checking
//! - [`Scene`]: node storage, names, prefab instantiation
//! - [`Camera`]: projection parameters handed to the render back end
//! - [`transform_system`]: world matrix propagation, decoupled from `Scene`

pub mod camera;
pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;
pub mod wrapper;

pub use camera::{Camera, ProjectionType};
pub use node::Node;
pub use scene::Scene;
pub use transform::Transform;
pub use wrapper::SceneNode;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
