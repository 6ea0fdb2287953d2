use std::str::FromStr;

use glam::{Quat, Vec3};
use uuid::Uuid;

use crate::animation::binding::{TargetPath, ValueKind};
use crate::animation::tracks::{KeyframeCursor, KeyframeTrack};
use crate::errors::MixerError;

/// Which node a track drives and which of its properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

impl TrackMeta {
    #[must_use]
    pub fn new(node_name: impl Into<String>, target: TargetPath) -> Self {
        Self {
            node_name: node_name.into(),
            target,
        }
    }
}

/// Parses `"<node>.<property>"`. The node part may itself contain dots
/// (`"Bone.001.position"`); the property is everything after the last one.
impl FromStr for TrackMeta {
    type Err = MixerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (node, property) = s
            .rsplit_once('.')
            .ok_or_else(|| MixerError::invalid(format!("track name '{s}' has no property")))?;

        if node.is_empty() {
            return Err(MixerError::invalid(format!("track name '{s}' has no node")));
        }

        Ok(Self::new(node, property.parse()?))
    }
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
    Scalar(KeyframeTrack<f32>),
}

impl TrackData {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Vector3(_) => ValueKind::Vector3,
            Self::Quaternion(_) => ValueKind::Quaternion,
            Self::Scalar(_) => ValueKind::Scalar,
        }
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            Self::Vector3(t) => t.end_time(),
            Self::Quaternion(t) => t.end_time(),
            Self::Scalar(t) => t.end_time(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Vector3(t) => t.is_empty(),
            Self::Quaternion(t) => t.is_empty(),
            Self::Scalar(t) => t.is_empty(),
        }
    }

    /// Samples the track at `time`. `None` only for an empty track.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<TrackValue> {
        match self {
            Self::Vector3(t) => t.sample_with_cursor(time, cursor).map(TrackValue::Vector3),
            Self::Quaternion(t) => t.sample_with_cursor(time, cursor).map(TrackValue::Quaternion),
            Self::Scalar(t) => t.sample_with_cursor(time, cursor).map(TrackValue::Scalar),
        }
    }
}

/// A single sampled track value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
    Scalar(f32),
}

/// Full track definition: metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    #[must_use]
    pub fn new(meta: TrackMeta, data: TrackData) -> Self {
        Self { meta, data }
    }
}

/// An immutable, named set of keyframe tracks.
///
/// Clips are shared as `Arc<AnimationClip>`; `uuid` is the identity a mixer
/// keys its cached actions by.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub uuid: Uuid,
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Creates a clip whose duration is the last keyframe time over all tracks.
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self::with_duration(name, duration, tracks)
    }

    /// Creates a clip with an explicit duration. Negative or non-finite
    /// durations are treated as 0.
    #[must_use]
    pub fn with_duration(name: impl Into<String>, duration: f32, tracks: Vec<Track>) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// A clip with no duration or no keyframes never changes a pose.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.duration <= 0.0 || self.tracks.iter().all(|t| t.data.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_node_names() {
        let meta: TrackMeta = "Armature.Bone.001.quaternion".parse().unwrap();
        assert_eq!(meta.node_name, "Armature.Bone.001");
        assert_eq!(meta.target, TargetPath::Rotation);
    }

    #[test]
    fn parses_morph_targets() {
        let meta: TrackMeta = "Face.morphTargetInfluences[2]".parse().unwrap();
        assert_eq!(meta.target, TargetPath::MorphWeight(2));

        let meta: TrackMeta = "Face.weights[0]".parse().unwrap();
        assert_eq!(meta.target, TargetPath::MorphWeight(0));
    }

    #[test]
    fn rejects_unknown_properties() {
        assert!("Bone.color".parse::<TrackMeta>().is_err());
        assert!("position".parse::<TrackMeta>().is_err());
        assert!(".position".parse::<TrackMeta>().is_err());
        assert!("Face.weights[x]".parse::<TrackMeta>().is_err());
    }

    #[test]
    fn explicit_duration_is_sanitized() {
        let clip = AnimationClip::with_duration("bad", -3.0, vec![]);
        assert!(clip.duration.abs() < f32::EPSILON);
        assert!(clip.is_static());
    }
}
