use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::accumulate::PoseAccumulator;
use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::animation::tracks::KeyframeCursor;
use crate::scene::NodeHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Play to the end (or the start, when reversed) and finish.
    Once,
    /// Wrap around modulo the clip duration.
    #[default]
    Repeat,
    /// Reverse direction at each end of the clip.
    PingPong,
}

/// Playback state derived from an action's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackDirection {
    Forward,
    Backward,
}

impl PlaybackDirection {
    #[inline]
    fn of(delta: f32) -> Self {
        if delta < 0.0 {
            Self::Backward
        } else {
            Self::Forward
        }
    }
}

/// What a single [`ClipAction::update`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionStep {
    /// Not running, static clip, or zero effective delta.
    Idle,
    /// Time moved without reaching a clip boundary.
    Advanced,
    /// One or more clip boundaries were crossed. Negative when playing backwards.
    Looped { loop_delta: i32 },
    /// The action reached its last boundary and finished.
    Finished { direction: PlaybackDirection },
}

/// A stateful playback binding of a clip to a target hierarchy.
///
/// Created stopped by [`AnimationMixer::clip_action`](crate::animation::AnimationMixer::clip_action);
/// `play()` schedules it into the mixer's active set.
#[derive(Debug, Clone)]
pub struct ClipAction {
    clip: Arc<AnimationClip>,
    root: Option<NodeHandle>,

    time: f32,
    time_scale: f32,
    weight: f32,

    pub loop_mode: LoopMode,
    /// Maximum number of boundary crossings for `Repeat`/`PingPong`; `None` loops forever.
    pub repetitions: Option<u32>,
    /// On finish: hold the final pose (paused) instead of stopping.
    pub clamp_when_finished: bool,
    pub enabled: bool,
    pub paused: bool,

    scheduled: bool,
    /// Ping-pong is travelling from the end back to the start.
    reversed: bool,
    loop_count: u32,

    pub(crate) bindings: Vec<PropertyBinding>,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl ClipAction {
    /// Creates a stopped action with no bindings.
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self::bound(clip, None, Vec::new())
    }

    pub(crate) fn bound(
        clip: Arc<AnimationClip>,
        root: Option<NodeHandle>,
        bindings: Vec<PropertyBinding>,
    ) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            root,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Repeat,
            repetitions: None,
            clamp_when_finished: false,
            enabled: true,
            paused: false,
            scheduled: false,
            reversed: false,
            loop_count: 0,
            bindings,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Root node the clip's tracks were resolved under.
    #[must_use]
    pub fn root(&self) -> Option<NodeHandle> {
        self.root
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    /// Local playback time in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Boundary crossings since the last `play()` from stopped or `reset()`.
    #[must_use]
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// A scheduled action that is paused or disabled reports `Paused`.
    #[must_use]
    pub fn state(&self) -> ActionState {
        if !self.scheduled {
            ActionState::Stopped
        } else if self.paused || !self.enabled {
            ActionState::Paused
        } else {
            ActionState::Playing
        }
    }

    /// Whether the action is in its mixer's active set.
    #[inline]
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Whether the next update will integrate time.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduled && self.enabled && !self.paused
    }

    // ========================================================================
    // Playback Control
    // ========================================================================

    /// Enables, unpauses and schedules the action. Restarts from 0 when the
    /// action was stopped; otherwise keeps its time.
    pub fn play(&mut self) -> &mut Self {
        if !self.scheduled {
            self.rewind();
            self.scheduled = true;
            log::debug!("Action '{}' started", self.clip.name);
        }
        self.enabled = true;
        self.paused = false;
        self
    }

    /// Freezes time while keeping the current pose applied.
    pub fn pause(&mut self) -> &mut Self {
        if self.scheduled {
            self.paused = true;
        }
        self
    }

    /// Removes the action from the active set and disables it. Calling it
    /// on a stopped action does nothing.
    pub fn stop(&mut self) -> &mut Self {
        if self.scheduled {
            self.scheduled = false;
            self.enabled = false;
            log::debug!("Action '{}' stopped at {:.3}s", self.clip.name, self.time);
        }
        self
    }

    /// Back to time 0, enabled and unpaused. Scheduling is unchanged.
    pub fn reset(&mut self) -> &mut Self {
        self.rewind();
        self.enabled = true;
        self.paused = false;
        self
    }

    pub(crate) fn rewind(&mut self) {
        self.time = 0.0;
        self.loop_count = 0;
        self.reversed = false;
    }

    /// Moves this action alone to `time`, clamped to the clip. Non-finite
    /// values are ignored. A repeating action stores the clip end as 0.
    pub fn set_time(&mut self, time: f32) -> &mut Self {
        if time.is_finite() {
            let duration = self.clip.duration;
            self.time = time.clamp(0.0, duration);
            if self.loop_mode == LoopMode::Repeat && self.time >= duration {
                self.time = 0.0;
            }
            self.reversed = false;
        } else {
            log::warn!("Ignoring non-finite time for action '{}'", self.clip.name);
        }
        self
    }

    pub fn set_loop(&mut self, mode: LoopMode, repetitions: Option<u32>) -> &mut Self {
        self.loop_mode = mode;
        self.repetitions = repetitions;
        self
    }

    // ========================================================================
    // Weight & Time Scale
    // ========================================================================

    /// Sets the blend weight, clamped to `[0, 1]`. NaN counts as 0.
    pub fn set_effective_weight(&mut self, weight: f32) -> &mut Self {
        self.weight = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        self
    }

    /// The weight this action blends with.
    #[inline]
    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        self.weight
    }

    /// Sets the playback speed. Negative plays backwards, 0 freezes.
    /// Non-finite values count as 0.
    pub fn set_effective_time_scale(&mut self, time_scale: f32) -> &mut Self {
        self.time_scale = if time_scale.is_finite() {
            time_scale
        } else {
            log::warn!("Non-finite time scale for action '{}', freezing it", self.clip.name);
            0.0
        };
        self
    }

    #[inline]
    #[must_use]
    pub fn effective_time_scale(&self) -> f32 {
        self.time_scale
    }

    // ========================================================================
    // Time Integration
    // ========================================================================

    /// Advances local time by `dt` (already scaled by the mixer) times this
    /// action's time scale, then applies the loop policy.
    pub fn update(&mut self, dt: f32) -> ActionStep {
        if !self.is_running() {
            return ActionStep::Idle;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            self.time = 0.0;
            return ActionStep::Idle;
        }

        let delta = saturate(dt * self.time_scale);
        if delta == 0.0 || delta.is_nan() {
            return ActionStep::Idle;
        }

        match self.loop_mode {
            LoopMode::Once => self.step_once(delta, duration),
            LoopMode::Repeat => self.step_repeat(delta, duration),
            LoopMode::PingPong => self.step_ping_pong(delta, duration),
        }
    }

    fn step_once(&mut self, delta: f32, duration: f32) -> ActionStep {
        let t = self.time + delta;
        if t >= duration {
            self.time = duration;
            self.finish(PlaybackDirection::Forward)
        } else if t < 0.0 {
            self.time = 0.0;
            self.finish(PlaybackDirection::Backward)
        } else {
            self.time = t;
            ActionStep::Advanced
        }
    }

    fn step_repeat(&mut self, delta: f32, duration: f32) -> ActionStep {
        let t = saturate(self.time + delta);
        if (0.0..duration).contains(&t) {
            self.time = t;
            return ActionStep::Advanced;
        }

        let loops = (t / duration).floor();
        let crossings = loops.abs() as u32;

        if let Some(limit) = self.repetitions {
            let remaining = limit.saturating_sub(self.loop_count);
            if crossings >= remaining {
                let direction = PlaybackDirection::of(delta);
                self.loop_count = limit;
                self.time = match direction {
                    PlaybackDirection::Forward => duration,
                    PlaybackDirection::Backward => 0.0,
                };
                return self.finish(direction);
            }
        }

        self.loop_count = self.loop_count.saturating_add(crossings);
        self.time = t.rem_euclid(duration);
        // rem_euclid can round up to `duration` for tiny negative inputs
        if self.time >= duration {
            self.time = 0.0;
        }
        ActionStep::Looped {
            loop_delta: loops as i32,
        }
    }

    /// Ping-pong runs on an unfolded axis of period `2 * duration`: the first
    /// half plays forwards, the second half maps back onto the clip
    /// backwards. Boundaries sit at every multiple of `duration`.
    fn step_ping_pong(&mut self, delta: f32, duration: f32) -> ActionStep {
        let period = 2.0 * duration;

        let mut u = if self.reversed {
            period - self.time
        } else {
            self.time
        };
        if u >= period {
            u -= period;
        }
        let u_new = saturate(u + delta);

        let first_segment = (u / duration).floor();
        let loops = (u_new / duration).floor() - first_segment;

        if loops != 0.0
            && let Some(limit) = self.repetitions
        {
            let remaining = limit.saturating_sub(self.loop_count);
            if loops.abs() as u32 >= remaining {
                let direction = PlaybackDirection::of(delta);
                let steps = remaining.max(1) as f32;
                let boundary = match direction {
                    PlaybackDirection::Forward => first_segment + steps,
                    PlaybackDirection::Backward => first_segment + 1.0 - steps,
                };
                self.loop_count = limit;
                // Even multiples of `duration` are the clip start, odd ones its end.
                self.time = if boundary.rem_euclid(2.0) == 0.0 {
                    0.0
                } else {
                    duration
                };
                self.reversed = false;
                return self.finish(direction);
            }
        }

        let mut folded = u_new.rem_euclid(period);
        if folded >= period {
            folded = 0.0;
        }
        if folded <= duration {
            self.time = folded;
            self.reversed = false;
        } else {
            self.time = period - folded;
            self.reversed = true;
        }

        if loops == 0.0 {
            ActionStep::Advanced
        } else {
            self.loop_count = self.loop_count.saturating_add(loops.abs() as u32);
            ActionStep::Looped {
                loop_delta: loops as i32,
            }
        }
    }

    fn finish(&mut self, direction: PlaybackDirection) -> ActionStep {
        if self.clamp_when_finished {
            self.paused = true;
        } else {
            self.stop();
        }
        log::debug!(
            "Action '{}' finished ({direction:?}) at {:.3}s",
            self.clip.name,
            self.time
        );
        ActionStep::Finished { direction }
    }

    // ========================================================================
    // Pose Sampling
    // ========================================================================

    /// Samples every bound track at the current time and adds the weighted
    /// values to `pose`.
    pub(crate) fn sample_into(&mut self, pose: &mut PoseAccumulator) {
        let weight = self.weight;
        let time = self.time;

        for binding in &self.bindings {
            let Some(track) = self.clip.tracks.get(binding.track_index) else {
                continue;
            };
            let Some(cursor) = self.track_cursors.get_mut(binding.track_index) else {
                continue;
            };
            if let Some(value) = track.data.sample_with_cursor(time, cursor) {
                pose.add(binding.node_handle, binding.target, value, weight);
            }
        }
    }
}

/// Keeps time arithmetic finite; NaN passes through.
#[inline]
fn saturate(t: f32) -> f32 {
    t.clamp(-f32::MAX, f32::MAX)
}
