//! Utility Module
//!
//! - [`FrameClock`]: capped frame deltas for the playback loop
//! - [`FpsCounter`]: frame rate measurement utility

pub mod fps_counter;
pub mod time;

pub use fps_counter::FpsCounter;
pub use time::FrameClock;
