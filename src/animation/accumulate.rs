//! Pose Accumulation
//!
//! Every action adds its sampled values with its weight; the blended value
//! of a property is the weight-normalized sum. Properties nobody
//! contributed to with a positive weight are left untouched in the scene.

use glam::{Quat, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::animation::binding::TargetPath;
use crate::animation::clip::TrackValue;
use crate::scene::{NodeHandle, Scene};

const MIN_QUAT_LENGTH_SQUARED: f32 = 1e-12;

#[derive(Debug, Clone, Copy)]
enum Accum {
    Scalar { sum: f32, weight: f32 },
    Vector3 { sum: Vec3, weight: f32 },
    /// Quaternions are summed as 4-vectors, each flipped into the
    /// hemisphere of the running sum, and normalized at the end.
    Quaternion { sum: Vec4, weight: f32 },
}

impl Accum {
    fn start(value: TrackValue, weight: f32) -> Self {
        match value {
            TrackValue::Scalar(v) => Self::Scalar {
                sum: v * weight,
                weight,
            },
            TrackValue::Vector3(v) => Self::Vector3 {
                sum: v * weight,
                weight,
            },
            TrackValue::Quaternion(q) => Self::Quaternion {
                sum: Vec4::from(q) * weight,
                weight,
            },
        }
    }

    /// Returns false when `value` has a different kind than the entry.
    fn add(&mut self, value: TrackValue, w: f32) -> bool {
        match (self, value) {
            (Self::Scalar { sum, weight }, TrackValue::Scalar(v)) => {
                *sum += v * w;
                *weight += w;
            }
            (Self::Vector3 { sum, weight }, TrackValue::Vector3(v)) => {
                *sum += v * w;
                *weight += w;
            }
            (Self::Quaternion { sum, weight }, TrackValue::Quaternion(q)) => {
                let mut v = Vec4::from(q);
                if sum.dot(v) < 0.0 {
                    v = -v;
                }
                *sum += v * w;
                *weight += w;
            }
            _ => return false,
        }
        true
    }

    fn resolve(&self) -> Option<TrackValue> {
        match *self {
            Self::Scalar { sum, weight } => (weight > 0.0).then(|| TrackValue::Scalar(sum / weight)),
            Self::Vector3 { sum, weight } => (weight > 0.0).then(|| TrackValue::Vector3(sum / weight)),
            Self::Quaternion { sum, weight } => {
                if weight <= 0.0 || sum.length_squared() < MIN_QUAT_LENGTH_SQUARED {
                    return None;
                }
                Some(TrackValue::Quaternion(Quat::from_vec4(sum.normalize())))
            }
        }
    }
}

/// Per-frame blend buffer keyed by `(node, property)`.
#[derive(Debug, Default)]
pub struct PoseAccumulator {
    entries: FxHashMap<(NodeHandle, TargetPath), Accum>,
}

impl PoseAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all contributions, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Adds one weighted contribution. Non-positive weights are ignored.
    pub fn add(&mut self, node: NodeHandle, target: TargetPath, value: TrackValue, weight: f32) {
        if weight <= 0.0 || weight.is_nan() {
            return;
        }
        match self.entries.get_mut(&(node, target)) {
            Some(entry) => {
                if !entry.add(value, weight) {
                    log::debug!("Ignoring {value:?} for {target}: kind differs from earlier contributions");
                }
            }
            None => {
                self.entries.insert((node, target), Accum::start(value, weight));
            }
        }
    }

    /// The blended value for a property, if anything contributed to it.
    #[must_use]
    pub fn blended(&self, node: NodeHandle, target: TargetPath) -> Option<TrackValue> {
        self.entries.get(&(node, target)).and_then(Accum::resolve)
    }

    /// Writes every blended value into the scene. Returns the number of
    /// properties written.
    pub fn apply(&self, scene: &mut Scene) -> usize {
        let mut written = 0;

        for (&(handle, target), accum) in &self.entries {
            let Some(value) = accum.resolve() else {
                continue;
            };
            let Some(node) = scene.get_node_mut(handle) else {
                continue;
            };

            match (target, value) {
                (TargetPath::Translation, TrackValue::Vector3(v)) => node.transform.position = v,
                (TargetPath::Scale, TrackValue::Vector3(v)) => node.transform.scale = v,
                (TargetPath::Rotation, TrackValue::Quaternion(q)) => node.transform.rotation = q,
                (TargetPath::MorphWeight(index), TrackValue::Scalar(w)) => {
                    node.set_morph_weight(index, w);
                }
                _ => continue,
            }
            written += 1;
        }

        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_hemisphere_quaternions_blend_without_cancelling() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        let q = Quat::from_rotation_y(0.5);

        let mut pose = PoseAccumulator::new();
        pose.add(node, TargetPath::Rotation, TrackValue::Quaternion(q), 0.5);
        pose.add(node, TargetPath::Rotation, TrackValue::Quaternion(-q), 0.5);

        let Some(TrackValue::Quaternion(out)) = pose.blended(node, TargetPath::Rotation) else {
            panic!("expected a quaternion");
        };
        assert!(out.dot(q).abs() > 0.9999);
    }

    #[test]
    fn zero_weight_leaves_property_untouched() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        scene.get_node_mut(node).unwrap().transform.position = Vec3::splat(7.0);

        let mut pose = PoseAccumulator::new();
        pose.add(node, TargetPath::Translation, TrackValue::Vector3(Vec3::ZERO), 0.0);
        assert_eq!(pose.apply(&mut scene), 0);
        assert_eq!(scene.get_node(node).unwrap().transform.position, Vec3::splat(7.0));
    }
}
