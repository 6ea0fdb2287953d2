use std::sync::atomic::{AtomicU32, Ordering};

use slotmap::{SecondaryMap, SlotMap};

use crate::assets::prefab::Prefab;
use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::scene::transform_system;
use crate::scene::wrapper::SceneNode;

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Scene graph container.
///
/// Owns the node storage that animation mixers write poses into and that the
/// render back end reads from. Node names are stored beside the nodes so the
/// per-frame node data stays small.
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    names: SecondaryMap<NodeHandle, String>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            names: SecondaryMap::new(),
        }
    }

    // ========================================================================
    // Node Creation & Removal
    // ========================================================================

    /// Creates an empty root node.
    pub fn create_node(&mut self) -> NodeHandle {
        self.add_node(Node::new())
    }

    /// Creates an empty, named root node.
    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.create_node();
        self.set_name(handle, name);
        handle
    }

    /// Adds a node to the scene as a root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Adds a node directly under `parent`.
    ///
    /// Falls back to a root node if `parent` is not in the scene.
    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        if !self.nodes.contains_key(parent) {
            log::warn!("add_to_parent: parent not found, adding as root");
            return self.add_node(child);
        }

        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        self.nodes[parent].children.push(handle);
        handle
    }

    /// Removes a node and its whole subtree.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };
        let children = node.children.clone();
        let parent = node.parent;

        for child in children {
            self.remove_node(child);
        }

        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(parent)
                && let Some(pos) = p.children.iter().position(|&x| x == handle)
            {
                p.children.remove(pos);
            }
        } else if let Some(pos) = self.root_nodes.iter().position(|&x| x == handle) {
            self.root_nodes.remove(pos);
        }

        self.names.remove(handle);
        self.nodes.remove(handle);
    }

    /// Re-parents `child` under `parent`, detaching it from its old parent.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::error!("attach: node not found");
            return;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("attach: refusing to create a cycle");
            return;
        }

        self.detach_from_parent(child);

        self.nodes[parent].children.push(child);
        let c = &mut self.nodes[child];
        c.parent = Some(parent);
        c.transform.mark_dirty();
    }

    /// Moves `child` back to the root list.
    pub fn detach(&mut self, child: NodeHandle) {
        if self.nodes.get(child).and_then(Node::parent).is_none() {
            return;
        }
        self.detach_from_parent(child);
        self.root_nodes.push(child);
        let c = &mut self.nodes[child];
        c.parent = None;
        c.transform.mark_dirty();
    }

    fn detach_from_parent(&mut self, child: NodeHandle) {
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Borrows a node for chainable edits.
    pub fn node(&mut self, handle: NodeHandle) -> SceneNode<'_> {
        SceneNode::new(self, handle)
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.names.get(handle).map(String::as_str)
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if self.nodes.contains_key(handle) {
            self.names.insert(handle, name.to_string());
        }
    }

    /// Depth-first search for a node named `name` in the subtree of `root`
    /// (including `root` itself).
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if self.get_name(handle) == Some(name) {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Collects `root` and all its descendants in depth-first order.
    #[must_use]
    pub fn collect_subtree(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if let Some(node) = self.nodes.get(handle) {
                out.push(handle);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    // ========================================================================
    // Prefab Instantiation
    // ========================================================================

    /// Instantiates a prefab under a new root node named after the prefab.
    ///
    /// Returns the new root, which is what an animation mixer for the
    /// prefab's clips should be bound to.
    pub fn instantiate(&mut self, prefab: &Prefab) -> NodeHandle {
        let root = self.create_node_with_name(&prefab.name);

        let mut handles: Vec<Option<NodeHandle>> = vec![None; prefab.nodes.len()];
        let mut stack: Vec<(usize, NodeHandle)> =
            prefab.root_indices.iter().rev().map(|&i| (i, root)).collect();

        while let Some((index, parent)) = stack.pop() {
            let Some(desc) = prefab.nodes.get(index) else {
                log::warn!("Prefab '{}' references missing node {index}", prefab.name);
                continue;
            };
            if handles[index].is_some() {
                log::warn!("Prefab '{}' node {index} has several parents", prefab.name);
                continue;
            }

            let mut node = Node::new();
            node.transform = desc.transform.clone();
            node.transform.mark_dirty();
            node.morph_weights = desc.morph_weights.iter().copied().collect();

            let handle = self.add_to_parent(node, parent);
            if let Some(name) = &desc.name {
                self.set_name(handle, name);
            }
            handles[index] = Some(handle);

            stack.extend(desc.children_indices.iter().rev().map(|&c| (c, handle)));
        }

        log::debug!(
            "Instantiated prefab '{}' ({} nodes)",
            prefab.name,
            handles.iter().flatten().count()
        );
        root
    }

    // ========================================================================
    // Matrix Update
    // ========================================================================

    /// Updates world matrices for the whole scene. Call once per frame after
    /// animation and before rendering.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &self.root_nodes);
    }

    /// Updates world matrices for one subtree.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, root);
    }
}
