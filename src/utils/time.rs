use std::time::{Duration, Instant};

/// Frame clock feeding the mixer.
///
/// Measures wall-clock time between ticks and caps each step at
/// `max_delta`, so a stalled frame (window drag, breakpoint) does not make
/// animation jump.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start_time: Instant,
    last_update: Instant,
    max_delta: Duration,
    /// Time since last tick, after capping
    pub delta: Duration,
    /// Sum of all capped deltas
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl FrameClock {
    /// Creates a clock starting from now.
    #[must_use]
    pub fn new(max_delta: Duration) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            max_delta,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Samples the wall clock and returns the capped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now - self.last_update;
        self.last_update = now;
        self.step(raw)
    }

    /// Advances by a caller-supplied duration instead of the wall clock.
    pub fn step(&mut self, raw: Duration) -> f32 {
        self.delta = raw.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.delta.as_secs_f32()
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Wall-clock time since the clock was created.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    #[must_use]
    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }
}
