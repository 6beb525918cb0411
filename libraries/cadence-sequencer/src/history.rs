//! Playback history tracking
//!
//! Chronological stack of loaded tracks (most recent = tail) for "previous"
//! navigation and as a fallback source when the playlist has nothing left.

use crate::config::HistoryPolicy;
use crate::oracle::ExistenceOracle;
use crate::playlist::Playlist;
use crate::resolver::{PruneReason, PrunedEntry, Resolution};
use crate::types::{PrimarySource, TrackRef};
use tracing::{debug, warn};

/// Playback history
///
/// Grows by [`History::push`] on every successful load and only shrinks
/// from the tail.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Oldest first
    entries: Vec<TrackRef>,
}

impl History {
    /// Create new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a loaded track
    ///
    /// Loading the track that is already the tail is a no-op. Returns
    /// whether the track was appended.
    pub fn push(&mut self, track: TrackRef) -> bool {
        if self.entries.last() == Some(&track) {
            return false;
        }
        self.entries.push(track);
        true
    }

    /// Remove and return the most recent entry
    pub fn pop_tail(&mut self) -> Option<TrackRef> {
        self.entries.pop()
    }

    /// Most recent entry (without removing)
    pub fn tail(&self) -> Option<&TrackRef> {
        self.entries.last()
    }

    /// Walk back from the tail to the first entry that is still playable
    ///
    /// Entries that no longer exist, fail the probe, or (under
    /// [`HistoryPolicy::RequirePlaylistMembership`]) are missing from the
    /// playlist are popped for good. The surviving entry stays in history.
    /// When it is also in the playlist, the playlist cursor is moved onto it
    /// so that the next advance continues after the recalled track.
    pub async fn find_valid_tail(
        &mut self,
        oracle: &dyn ExistenceOracle,
        playlist: &mut Playlist,
        policy: HistoryPolicy,
    ) -> Resolution {
        let mut resolution = Resolution::default();

        while let Some(candidate) = self.entries.last().cloned() {
            let reason = match oracle.exists(&candidate).await {
                Ok(true) => None,
                Ok(false) => Some(PruneReason::Missing),
                Err(err) => {
                    warn!("Existence probe failed for {}: {}", candidate, err);
                    Some(PruneReason::ProbeFailed)
                }
            };

            let position = playlist.position_of(&candidate);
            let reason = match (reason, policy, position) {
                (Some(reason), _, _) => Some(reason),
                (None, HistoryPolicy::RequirePlaylistMembership, None) => {
                    Some(PruneReason::NotInPlaylist)
                }
                (None, _, _) => None,
            };

            match reason {
                None => {
                    if let Some(index) = position {
                        // Position was just looked up under the same borrow
                        let _ = playlist.select(index);
                    }
                    debug!("History recall: {}", candidate);
                    resolution.track = Some(candidate);
                    return resolution;
                }
                Some(reason) => {
                    warn!("Removing {} from history ({:?})", candidate, reason);
                    self.entries.pop();
                    resolution.pruned.push(PrunedEntry {
                        track: candidate,
                        reason,
                        source: PrimarySource::History,
                    });
                }
            }
        }

        debug!("History exhausted");
        resolution
    }

    /// All entries (oldest first)
    pub fn entries(&self) -> &[TrackRef] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
