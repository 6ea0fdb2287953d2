use crate::animation::values::Interpolatable;
use crate::errors::{MixerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    /// Values are stored as `[in_tangent, value, out_tangent]` triplets.
    CubicSpline,
}

/// How many intervals a cursor scans linearly before falling back to a
/// binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in.
///
/// Playback moves time by small steps, so the next sample almost always
/// lands in the same or an adjacent interval.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// A sequence of `(time, value)` keyframes for a single animated property.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    /// For `CubicSpline`, length is `times.len() * 3`.
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track without validating it. Prefer [`try_new`](Self::try_new)
    /// for data that does not come from a trusted loader.
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Builds a track, checking that times are finite and non-decreasing and
    /// that the value count matches the interpolation layout.
    pub fn try_new(
        times: Vec<f32>,
        values: Vec<T>,
        interpolation: InterpolationMode,
    ) -> Result<Self> {
        if times.iter().any(|t| !t.is_finite()) {
            return Err(MixerError::invalid("keyframe times must be finite"));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(MixerError::invalid("keyframe times must be non-decreasing"));
        }

        let expected = match interpolation {
            InterpolationMode::CubicSpline => times.len() * 3,
            _ => times.len(),
        };
        if values.len() != expected {
            return Err(MixerError::invalid(format!(
                "expected {expected} keyframe values, got {}",
                values.len()
            )));
        }

        Ok(Self::new(times, values, interpolation))
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe, or 0 for an empty track.
    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sampling. Returns `None` for an empty track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.times.is_empty() {
            return None;
        }

        // partition_point gives the first keyframe strictly after `time`
        let next_idx = self.times.partition_point(|&t| t <= time);
        let idx = next_idx.saturating_sub(1);

        Some(self.sample_at_frame(idx, time))
    }

    /// Sampling accelerated by a cursor, which is updated in place.
    ///
    /// Times outside the keyframe range clamp to the first or last value.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.times.len();
        match len {
            0 => return None,
            1 => return Some(self.value_at(0).clone()),
            _ => {}
        }

        // A cursor carried over from a different track may be out of range.
        let i = cursor.last_index.min(len - 1);

        let found = if time >= self.times[i] {
            self.scan_forward(i, time)
        } else {
            self.scan_backward(i, time)
        };

        let index = found.unwrap_or_else(|| {
            // Large jump (scrubbing, loop wrap): binary search.
            self.times.partition_point(|&t| t <= time).saturating_sub(1)
        });
        cursor.last_index = index;

        Some(self.sample_at_frame(index, time))
    }

    /// Looks for the interval `[times[idx], times[idx + 1])` containing
    /// `time`, starting at `start` and moving right. Caller guarantees
    /// `time >= times[start]`.
    fn scan_forward(&self, start: usize, time: f32) -> Option<usize> {
        let len = self.times.len();
        for idx in start..=start + MAX_SCAN_OFFSET {
            if idx >= len - 1 {
                // Past the last keyframe: clamp to it.
                return (time >= self.times[len - 1]).then_some(len - 1);
            }
            if time < self.times[idx + 1] {
                return Some(idx);
            }
        }
        None
    }

    /// Moves left from `start` looking for the first keyframe at or before
    /// `time`.
    fn scan_backward(&self, start: usize, time: f32) -> Option<usize> {
        (0..=MAX_SCAN_OFFSET)
            .take_while(|&offset| offset <= start)
            .map(|offset| start - offset)
            .find(|&idx| time >= self.times[idx])
    }

    /// Keyframe value at `index`, skipping tangents for cubic splines.
    #[inline]
    fn value_at(&self, index: usize) -> &T {
        match self.interpolation {
            InterpolationMode::CubicSpline => &self.values[index * 3 + 1],
            _ => &self.values[index],
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();

        if index >= len - 1 {
            return self.value_at(len - 1).clone();
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        // Before the first keyframe `t` goes negative; clamp to the first value.
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index).clone(),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(index), self.value_at(next_idx), t)
            }
            InterpolationMode::CubicSpline => {
                let i_prev = index * 3;
                let i_next = next_idx * 3;

                let v0 = &self.values[i_prev + 1];
                let out_tangent0 = &self.values[i_prev + 2];
                let in_tangent1 = &self.values[i_next];
                let v1 = &self.values[i_next + 1];

                T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, dt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_unsorted_times() {
        let result = KeyframeTrack::try_new(
            vec![0.0, 2.0, 1.0],
            vec![0.0_f32, 1.0, 2.0],
            InterpolationMode::Linear,
        );
        assert!(matches!(result, Err(MixerError::InvalidArgument(_))));
    }

    #[test]
    fn try_new_checks_cubic_layout() {
        let result = KeyframeTrack::try_new(
            vec![0.0, 1.0],
            vec![0.0_f32, 1.0],
            InterpolationMode::CubicSpline,
        );
        assert!(result.is_err());

        let ok = KeyframeTrack::try_new(
            vec![0.0, 1.0],
            vec![0.0_f32; 6],
            InterpolationMode::CubicSpline,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn stale_cursor_is_clamped() {
        let track = KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![0.0_f32, 10.0],
            InterpolationMode::Linear,
        );
        let mut cursor = KeyframeCursor { last_index: 42 };
        let val = track.sample_with_cursor(0.5, &mut cursor);
        assert_eq!(val, Some(5.0));
        assert_eq!(cursor.last_index, 0);
    }
}
