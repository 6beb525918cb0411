//! Sequencer events
//!
//! Fire-and-forget notifications for UI synchronization:
//! - Playlist contents changed (bulk add, removal, pruning)
//! - Currently playing track changed (load or unload)
//! - A stale entry was pruned during resolution
//! - Play/pause status changed

use crate::resolver::PruneReason;
use crate::types::{TrackMetadata, TrackRef};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the sequencing core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequencerEvent {
    /// Playlist entries were added or removed
    PlaylistChanged {
        /// New playlist length
        length: usize,
    },

    /// Loaded track changed; `None` means nothing is loaded
    CurrentlyPlayingChanged {
        track: Option<TrackRef>,
        metadata: Option<TrackMetadata>,
    },

    /// A missing or unprobeable entry was removed
    TrackPruned { track: TrackRef, reason: PruneReason },

    /// Play/pause status changed
    PlaybackStatusChanged { paused: bool },
}

/// Broadcast channel for [`SequencerEvent`]s
///
/// Emitting never blocks and never fails; events sent while nobody is
/// subscribed are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SequencerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SequencerEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SequencerEvent) {
        // No receivers is fine
        let _ = self.tx.send(event);
    }

    pub fn playlist_changed(&self, length: usize) {
        self.emit(SequencerEvent::PlaylistChanged { length });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
