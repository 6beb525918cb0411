//! Error types for track sequencing
//!
//! Stale references and exhausted resolutions are not errors: they are
//! recovered by pruning or reported as [`crate::Availability`] values.
//! The variants below cover collaborator faults and invalid requests.

use thiserror::Error;

/// Sequencing errors
#[derive(Debug, Error)]
pub enum SequencerError {
    /// Playback backend rejected a track or a command
    #[error("Playback backend error: {0}")]
    Backend(String),

    /// Index out of bounds
    #[error("Index out of bounds: {index} (len {len})")]
    InvalidIndex { index: usize, len: usize },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SequencerError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Result type for sequencing operations
pub type Result<T> = std::result::Result<T, SequencerError>;
