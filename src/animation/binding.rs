use std::fmt;
use std::str::FromStr;

use crate::errors::MixerError;
use crate::scene::NodeHandle;

/// Defines the target property for animation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,        // Maps to transform.position
    Rotation,           // Maps to transform.rotation
    Scale,              // Maps to transform.scale
    MorphWeight(usize), // Maps to one entry of node.morph_weights
}

impl TargetPath {
    /// The value kind a track must carry to drive this property.
    #[must_use]
    pub fn value_kind(self) -> ValueKind {
        match self {
            Self::Translation | Self::Scale => ValueKind::Vector3,
            Self::Rotation => ValueKind::Quaternion,
            Self::MorphWeight(_) => ValueKind::Scalar,
        }
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation => f.write_str("position"),
            Self::Rotation => f.write_str("quaternion"),
            Self::Scale => f.write_str("scale"),
            Self::MorphWeight(i) => write!(f, "morphTargetInfluences[{i}]"),
        }
    }
}

/// Accepts both three.js (`position`, `quaternion`, `morphTargetInfluences[i]`)
/// and glTF (`translation`, `rotation`, `weights[i]`) property names.
impl FromStr for TargetPath {
    type Err = MixerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "position" | "translation" => return Ok(Self::Translation),
            "quaternion" | "rotation" => return Ok(Self::Rotation),
            "scale" => return Ok(Self::Scale),
            _ => {}
        }

        let indexed = s
            .strip_prefix("morphTargetInfluences[")
            .or_else(|| s.strip_prefix("weights["))
            .and_then(|rest| rest.strip_suffix(']'));

        if let Some(index) = indexed {
            return index
                .parse::<usize>()
                .map(Self::MorphWeight)
                .map_err(|_| MixerError::invalid(format!("bad morph target index in '{s}'")));
        }

        Err(MixerError::invalid(format!("unknown animated property '{s}'")))
    }
}

/// The kinds of values a track can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Vector3,
    Quaternion,
}

/// Binding relationship: maps track `track_index` from a Clip to the target property
/// of `node_handle` in the scene.
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_handle: NodeHandle,
    pub target: TargetPath,
}
