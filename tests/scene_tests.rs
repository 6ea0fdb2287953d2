//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: create/remove nodes, attach/detach hierarchy
//! - Node query: names, subtree collection
//! - Prefab instantiation
//! - World matrix propagation after animation writes
//! - SceneNode wrapper convenience API

use std::f32::consts::PI;

use glam::{Quat, Vec3};

use clipmix::assets::{Prefab, PrefabNode};
use clipmix::scene::{Node, Scene, Transform};

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

// ============================================================================
// Node Creation & Removal
// ============================================================================

#[test]
fn scene_create_node_with_name() {
    let mut scene = Scene::new();
    let handle = scene.create_node_with_name("TestNode");
    assert_eq!(scene.get_name(handle), Some("TestNode"));
    assert!(scene.root_nodes.contains(&handle));
}

#[test]
fn scene_set_name_on_missing_node_is_ignored() {
    let mut scene = Scene::new();
    let handle = scene.create_node();
    scene.remove_node(handle);
    scene.set_name(handle, "ghost");
    assert_eq!(scene.get_name(handle), None);
}

#[test]
fn scene_remove_node_removes_subtree() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new());
    let child = scene.create_node();
    let grandchild = scene.create_node();

    scene.attach(child, parent);
    scene.attach(grandchild, child);
    scene.set_name(grandchild, "leaf");

    scene.remove_node(parent);

    assert!(scene.get_node(parent).is_none());
    assert!(scene.get_node(child).is_none());
    assert!(scene.get_node(grandchild).is_none());
    assert!(scene.root_nodes.is_empty());
}

// ============================================================================
// Hierarchy: Attach / Detach
// ============================================================================

#[test]
fn scene_attach_moves_between_parents() {
    let mut scene = Scene::new();
    let parent1 = scene.create_node();
    let parent2 = scene.create_node();
    let child = scene.create_node();

    scene.attach(child, parent1);
    assert!(!scene.root_nodes.contains(&child));
    assert!(scene.get_node(parent1).unwrap().children().contains(&child));

    scene.attach(child, parent2);
    assert!(!scene.get_node(parent1).unwrap().children().contains(&child));
    assert!(scene.get_node(parent2).unwrap().children().contains(&child));
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent2));
}

#[test]
fn scene_attach_refuses_cycles() {
    let mut scene = Scene::new();
    let a = scene.create_node();
    let b = scene.create_node();
    scene.attach(b, a);

    scene.attach(a, b);
    scene.attach(a, a);

    assert_eq!(scene.get_node(a).unwrap().parent(), None);
    assert_eq!(scene.get_node(b).unwrap().parent(), Some(a));
}

#[test]
fn scene_detach_returns_to_roots() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.add_to_parent(Node::new(), parent);

    scene.detach(child);
    assert_eq!(scene.get_node(child).unwrap().parent(), None);
    assert!(scene.root_nodes.contains(&child));
    assert!(scene.get_node(parent).unwrap().children().is_empty());
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn find_node_by_name_stays_inside_subtree() {
    let mut scene = Scene::new();
    let a = scene.create_node_with_name("a");
    let b = scene.create_node_with_name("b");
    let inner = scene.add_to_parent(Node::new(), a);
    scene.set_name(inner, "Hand");
    let outer = scene.add_to_parent(Node::new(), b);
    scene.set_name(outer, "Hand");

    assert_eq!(scene.find_node_by_name(a, "Hand"), Some(inner));
    assert_eq!(scene.find_node_by_name(b, "Hand"), Some(outer));
    assert_eq!(scene.find_node_by_name(a, "a"), Some(a));
    assert_eq!(scene.find_node_by_name(a, "Foot"), None);
}

#[test]
fn collect_subtree_is_depth_first() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let left = scene.add_to_parent(Node::new(), root);
    let left_leaf = scene.add_to_parent(Node::new(), left);
    let right = scene.add_to_parent(Node::new(), root);

    assert_eq!(scene.collect_subtree(root), vec![root, left, left_leaf, right]);
}

// ============================================================================
// Prefab Instantiation
// ============================================================================

fn arm_prefab() -> Prefab {
    let mut prefab = Prefab::new("arm");
    let shoulder = prefab.add_node(
        PrefabNode::named("Shoulder")
            .with_transform(Transform::from_trs(Vec3::new(0.0, 2.0, 0.0), Quat::IDENTITY, Vec3::ONE)),
        None,
    );
    let elbow = prefab.add_node(
        PrefabNode::named("Elbow")
            .with_transform(Transform::from_trs(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE)),
        Some(shoulder),
    );
    prefab.add_node(
        PrefabNode::named("Hand").with_morph_weights(vec![0.5, 0.25]),
        Some(elbow),
    );
    prefab
}

#[test]
fn instantiate_builds_named_hierarchy() {
    let mut scene = Scene::new();
    let root = scene.instantiate(&arm_prefab());

    assert_eq!(scene.get_name(root), Some("arm"));
    assert_eq!(scene.collect_subtree(root).len(), 4);

    let elbow = scene.find_node_by_name(root, "Elbow").unwrap();
    let shoulder = scene.find_node_by_name(root, "Shoulder").unwrap();
    assert_eq!(scene.get_node(elbow).unwrap().parent(), Some(shoulder));

    let hand = scene.find_node_by_name(root, "Hand").unwrap();
    assert!((scene.get_node(hand).unwrap().morph_weight(1) - 0.25).abs() < EPSILON);
    assert!(scene.get_node(hand).unwrap().morph_weight(7).abs() < EPSILON);
}

#[test]
fn instantiating_twice_gives_independent_copies() {
    let mut scene = Scene::new();
    let prefab = arm_prefab();
    let first = scene.instantiate(&prefab);
    let second = scene.instantiate(&prefab);

    let hand_a = scene.find_node_by_name(first, "Hand").unwrap();
    let hand_b = scene.find_node_by_name(second, "Hand").unwrap();
    assert_ne!(hand_a, hand_b);
}

// ============================================================================
// World Matrices
// ============================================================================

#[test]
fn update_matrix_world_composes_parents() {
    let mut scene = Scene::new();
    let root = scene.instantiate(&arm_prefab());
    scene.node(root).rotate_z(PI / 2.0);
    scene.update_matrix_world();

    let hand = scene.find_node_by_name(root, "Hand").unwrap();
    let world = scene.get_node(hand).unwrap().world_matrix().translation;
    // (1, 2, 0) rotated a quarter turn about z
    assert!(vec3_approx(Vec3::from(world), Vec3::new(-2.0, 1.0, 0.0)), "got {world}");
}

#[test]
fn world_matrix_follows_later_writes() {
    let mut scene = Scene::new();
    let root = scene.instantiate(&arm_prefab());
    scene.update_matrix_world();

    let shoulder = scene.find_node_by_name(root, "Shoulder").unwrap();
    let hand = scene.find_node_by_name(root, "Hand").unwrap();
    scene.get_node_mut(shoulder).unwrap().transform.position = Vec3::new(0.0, 5.0, 0.0);
    scene.update_matrix_world();

    let world = scene.get_node(hand).unwrap().world_matrix().translation;
    assert!(vec3_approx(Vec3::from(world), Vec3::new(1.0, 5.0, 0.0)));
}

// ============================================================================
// SceneNode Wrapper
// ============================================================================

#[test]
fn scene_node_chain_edits_transform() {
    let mut scene = Scene::new();
    let handle = scene.create_node();
    scene
        .node(handle)
        .set_position(Vec3::new(1.0, 2.0, 3.0))
        .translate(Vec3::X)
        .set_scale(2.0)
        .set_visible(false);

    let node = scene.get_node(handle).unwrap();
    assert!(vec3_approx(node.transform.position, Vec3::new(2.0, 2.0, 3.0)));
    assert!(vec3_approx(node.transform.scale, Vec3::splat(2.0)));
    assert!(!node.visible);
}

#[test]
fn scene_node_on_stale_handle_is_noop() {
    let mut scene = Scene::new();
    let handle = scene.create_node();
    scene.remove_node(handle);
    let _ = scene.node(handle).set_position(Vec3::ONE);
    assert!(scene.get_node(handle).is_none());
}
