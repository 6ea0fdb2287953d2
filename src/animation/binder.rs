use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Resolves each track of `clip` to a node under `root_node` by name.
    ///
    /// Tracks whose node is missing, or whose value kind does not fit the
    /// target property, are left unbound and never sampled.
    #[must_use]
    pub fn bind(scene: &Scene, root_node: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            let meta = &track.meta;

            if track.data.kind() != meta.target.value_kind() {
                log::warn!(
                    "Clip '{}': track {track_index} ({}.{}) carries {:?} values, skipping",
                    clip.name,
                    meta.node_name,
                    meta.target,
                    track.data.kind()
                );
                continue;
            }

            match scene.find_node_by_name(root_node, &meta.node_name) {
                Some(node_handle) => bindings.push(PropertyBinding {
                    track_index,
                    node_handle,
                    target: meta.target,
                }),
                None => log::debug!(
                    "Clip '{}': no node named '{}' under the root",
                    clip.name,
                    meta.node_name
                ),
            }
        }

        bindings
    }
}
