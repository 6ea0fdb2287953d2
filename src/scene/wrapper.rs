//! Chainable node operation wrapper.
//!
//! [`SceneNode`] borrows a [`Scene`] mutably and provides a fluent API
//! for transforming nodes without needing `get_node_mut().unwrap()`.
//!
//! All methods silently no-op when the handle is stale, so users never
//! encounter panics from dangling handles.
//!
//! # Example
//!
//! ```rust,ignore
//! scene.node(root)
//!     .rotate_z(-0.2 * PI)
//!     .translate(Vec3::new(-20.0, -20.0, 0.0))
//!     .set_visible(true);
//! ```
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
use glam::{Quat, Vec3};

use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::scene::scene::Scene;

/// Temporary mutable borrow of a scene node for chainable operations.
pub struct SceneNode<'a> {
    scene: &'a mut Scene,
    handle: NodeHandle,
}

impl<'a> SceneNode<'a> {
    #[inline]
    pub fn new(scene: &'a mut Scene, handle: NodeHandle) -> Self {
        Self { scene, handle }
    }

    /// Returns the underlying handle.
    #[inline]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    #[inline]
    fn with(self, f: impl FnOnce(&mut Node)) -> Self {
        if let Some(node) = self.scene.get_node_mut(self.handle) {
            f(node);
        }
        self
    }

    /// Sets the node's local position.
    #[inline]
    pub fn set_position(self, pos: Vec3) -> Self {
        self.with(|n| n.transform.position = pos)
    }

    /// Moves the node along its parent-space axes.
    #[inline]
    pub fn translate(self, offset: Vec3) -> Self {
        self.with(|n| n.transform.position += offset)
    }

    /// Sets uniform scale.
    #[inline]
    pub fn set_scale(self, s: f32) -> Self {
        self.with(|n| n.transform.scale = Vec3::splat(s))
    }

    /// Sets rotation from a quaternion.
    #[inline]
    pub fn set_rotation(self, quat: Quat) -> Self {
        self.with(|n| n.transform.rotation = quat)
    }

    /// Rotates around the Z axis by `angle` radians (cumulative).
    #[inline]
    pub fn rotate_z(self, angle: f32) -> Self {
        self.with(|n| n.transform.rotation *= Quat::from_rotation_z(angle))
    }

    /// Rotates around the Y axis by `angle` radians (cumulative).
    #[inline]
    pub fn rotate_y(self, angle: f32) -> Self {
        self.with(|n| n.transform.rotation *= Quat::from_rotation_y(angle))
    }

    /// Sets node visibility.
    #[inline]
    pub fn set_visible(self, visible: bool) -> Self {
        self.with(|n| n.visible = visible)
    }
}
