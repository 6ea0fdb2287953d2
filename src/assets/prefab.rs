use std::sync::Arc;

use crate::animation::clip::AnimationClip;
use crate::scene::transform::Transform;

/// Prefab node: plain data, children referenced by index.
#[derive(Debug, Clone)]
pub struct PrefabNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// Indices of child nodes in `Prefab::nodes`
    pub children_indices: Vec<usize>,
    /// Initial morph target weights, empty when the node has none
    pub morph_weights: Vec<f32>,
}

impl PrefabNode {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            transform: Transform::new(),
            children_indices: Vec::new(),
            morph_weights: Vec::new(),
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_morph_weights(mut self, weights: Vec<f32>) -> Self {
        self.morph_weights = weights;
        self
    }
}

impl Default for PrefabNode {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefab: the loader's output, a node hierarchy plus the clips that animate it.
///
/// Holds no `NodeHandle`s or scene references, so it can be built on any
/// thread. [`Scene::instantiate`](crate::scene::Scene::instantiate) turns it
/// into scene nodes.
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    pub name: String,
    /// Flat node storage
    pub nodes: Vec<PrefabNode>,
    /// Indices of the top-level nodes in `nodes`
    pub root_indices: Vec<usize>,
    pub animations: Vec<Arc<AnimationClip>>,
}

impl Prefab {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a node, under `parent` or as a top-level node, and returns
    /// its index.
    ///
    /// An out-of-range `parent` makes the node top-level.
    pub fn add_node(&mut self, node: PrefabNode, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent_node) if parent != Some(index) => {
                parent_node.children_indices.push(index);
            }
            _ => self.root_indices.push(index),
        }
        index
    }

    pub fn add_animation(&mut self, clip: AnimationClip) -> Arc<AnimationClip> {
        let clip = Arc::new(clip);
        self.animations.push(Arc::clone(&clip));
        clip
    }
}
