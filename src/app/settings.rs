//! Session Settings
//!
//! Plain configuration for a [`Session`](crate::app::Session). Every field
//! has a default, so a JSON document only needs the fields it changes:
//!
//! ```rust,ignore
//! use clipmix::app::SessionSettings;
//!
//! let settings: SessionSettings = serde_json::from_str(r#"{ "time_scale": 0.5 }"#)?;
//! assert!(settings.autoplay);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::LoopMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Initial mixer time scale.
    pub time_scale: f32,
    /// Range of the `timeScale` panel slider.
    pub time_scale_range: (f32, f32),
    /// Play the first clip of a loaded model right away.
    pub autoplay: bool,
    /// Loop mode given to every action the session creates.
    pub default_loop: LoopMode,
    /// Finish policy given to every action the session creates.
    pub clamp_when_finished: bool,
    /// Upper bound for one frame's delta, in seconds.
    pub max_frame_delta: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            time_scale_range: (0.0, 5.0),
            autoplay: true,
            default_loop: LoopMode::Repeat,
            clamp_when_finished: false,
            max_frame_delta: 0.1,
        }
    }
}

impl SessionSettings {
    /// `max_frame_delta` as a duration; unusable values fall back to the default.
    #[must_use]
    pub fn max_frame_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.max_frame_delta)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_millis(100))
    }
}
