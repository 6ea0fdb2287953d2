use glam::Affine3A;
use smallvec::SmallVec;

use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// Inline capacity for morph target weights; larger sets spill to the heap.
pub const INLINE_MORPH_TARGETS: usize = 8;

/// A scene node holding the data animation writes every frame.
///
/// # Hierarchy
///
/// Nodes form a tree structure through parent-child relationships:
/// - `parent`: Optional handle to parent node (None for root nodes)
/// - `children`: List of child node handles
///
/// Names live in the owning [`Scene`](crate::scene::Scene), not on the node.
#[derive(Debug, Clone)]
pub struct Node {
    // === Core Hierarchy ===
    /// Parent node handle (None for root nodes)
    pub(crate) parent: Option<NodeHandle>,
    /// Child node handles
    pub(crate) children: Vec<NodeHandle>,

    // === Core Spatial Data ===
    /// Transform component (hot data accessed every frame)
    pub transform: Transform,

    /// Morph target influences, indexed by target.
    pub morph_weights: SmallVec<[f32; INLINE_MORPH_TARGETS]>,

    // === Core State ===
    /// Visibility flag for culling
    pub visible: bool,
}

impl Node {
    /// Creates a new node with default transform and visibility.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            morph_weights: SmallVec::new(),
            visible: true,
        }
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Writes one morph target weight, growing the weight list with zeros
    /// when `index` is past its end.
    pub fn set_morph_weight(&mut self, index: usize, weight: f32) {
        if index >= self.morph_weights.len() {
            self.morph_weights.resize(index + 1, 0.0);
        }
        self.morph_weights[index] = weight;
    }

    /// Returns the morph target weight at `index`, or 0 when unset.
    #[inline]
    #[must_use]
    pub fn morph_weight(&self, index: usize) -> f32 {
        self.morph_weights.get(index).copied().unwrap_or(0.0)
    }

    /// Returns a reference to the world transformation matrix.
    ///
    /// Refreshed by [`Scene::update_matrix_world`](crate::scene::Scene::update_matrix_world).
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
