//! Playback backend abstraction
//!
//! Decoding and audio output live outside this crate. The coordinator only
//! needs to hand over a resolved path and learn whether it was accepted.

use crate::error::Result;
use crate::types::{TrackMetadata, TrackRef};
use async_trait::async_trait;

/// Opaque playback service
///
/// Implementors load a file for playback and report its metadata. An `Err`
/// from `load_track` means the backend rejected a path that was confirmed to
/// exist, which callers report separately from "nothing to play".
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    /// Load and start playing a track
    async fn load_track(&self, track: &TrackRef) -> Result<TrackMetadata>;

    /// Toggle play/pause on the loaded track
    ///
    /// Returns `true` when playback is now paused.
    async fn toggle_playback(&self) -> Result<bool>;
}
