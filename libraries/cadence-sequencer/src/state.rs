//! Shared player state
//!
//! Playlist, history, mode and the loaded track live in one owned object
//! behind an async mutex. Every component receives a [`SharedState`]
//! handle, so tests can build isolated players.

use crate::history::History;
use crate::playlist::Playlist;
use crate::types::{LoadedTrack, PlaybackMode};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Mutable state of one player instance
#[derive(Debug)]
pub struct PlayerState {
    pub playlist: Playlist,
    pub history: History,
    pub mode: PlaybackMode,

    loaded: Option<LoadedTrack>,
    paused: bool,
}

impl PlayerState {
    pub fn new(mode: PlaybackMode) -> Self {
        Self {
            playlist: Playlist::new(),
            history: History::new(),
            mode,
            loaded: None,
            paused: true,
        }
    }

    /// Currently loaded track
    pub fn loaded(&self) -> Option<&LoadedTrack> {
        self.loaded.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn set_loaded(&mut self, loaded: LoadedTrack) {
        self.loaded = Some(loaded);
        self.paused = false;
    }

    pub(crate) fn unload(&mut self) {
        self.loaded = None;
        self.paused = true;
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(PlaybackMode::default())
    }
}

/// Cloneable handle to a [`PlayerState`]
///
/// Mutations made while the guard is held are atomic with respect to every
/// other holder, including cursor arithmetic inside a resolution walk.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<PlayerState>>,
}

impl SharedState {
    pub fn new(state: PlayerState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.inner.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TrackMetadata, TrackRef};

    #[test]
    fn new_state_is_unloaded_and_paused() {
        let state = PlayerState::new(PlaybackMode::RepeatAll);
        assert_eq!(state.mode, PlaybackMode::RepeatAll);
        assert!(!state.is_loaded());
        assert!(state.is_paused());
    }

    #[test]
    fn load_and_unload() {
        let mut state = PlayerState::new(PlaybackMode::Shuffle);
        state.set_loaded(LoadedTrack {
            track: TrackRef::from("a"),
            metadata: TrackMetadata::default(),
        });
        assert!(state.is_loaded());
        assert!(!state.is_paused());

        state.unload();
        assert!(state.loaded().is_none());
        assert!(state.is_paused());
    }

    #[tokio::test]
    async fn handles_share_one_state() {
        let shared = SharedState::new(PlayerState::new(PlaybackMode::Shuffle));
        let other = shared.clone();

        shared.lock().await.playlist.bulk_add(["a", "b"]);
        assert_eq!(other.lock().await.playlist.len(), 2);
    }
}
