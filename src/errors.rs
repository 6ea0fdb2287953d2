//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`MixerError`] covers:
//! - Rejected per-frame input (negative or non-finite delta time)
//! - Stale action handles used against the wrong mixer
//! - Model loading failures reported by a [`ModelLoader`](crate::assets::ModelLoader)
//! - Control panel writes that do not match the field schema
//!
//! Weight and time-scale values are never errors: they are clamped where
//! they are set.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, MixerError>`.
//!
//! ```rust,ignore
//! use clipmix::errors::{MixerError, Result};
//!
//! fn frame(mixer: &mut AnimationMixer, scene: &mut Scene, dt: f32) -> Result<()> {
//!     mixer.advance(dt, scene)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for animation playback and its collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MixerError {
    // ========================================================================
    // Input Validation
    // ========================================================================
    /// An argument was outside the domain the operation accepts.
    ///
    /// Raised at the call boundary; the operation leaves all state untouched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ========================================================================
    // Lifetime Errors
    // ========================================================================
    /// The action handle does not belong to this mixer, or its action was
    /// uncached. Signals a lifetime bug in the caller.
    #[error("Action {0} is not bound to this mixer")]
    UnboundAction(String),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The model loader reported a failure.
    #[error("Failed to load asset '{uri}': {reason}")]
    AssetLoadFailure {
        /// Identifier passed to the loader
        uri: String,
        /// Loader-provided description
        reason: String,
    },

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// The render back end failed to produce a frame.
    #[error("Render back end error: {0}")]
    Render(String),
}

impl MixerError {
    /// Shorthand for [`MixerError::InvalidArgument`].
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Alias for `Result<T, MixerError>`.
pub type Result<T> = std::result::Result<T, MixerError>;
