//! Sequence resolution
//!
//! Picks the next playable track from the playlist, pruning stale entries
//! as they are discovered:
//!
//! ```text
//! loop while playlist non-empty and attempts < len:
//!     advance cursor per mode
//!     probe candidate
//!       exists      -> done
//!       missing     -> prune, attempts = 0, RepeatOne -> RepeatAll
//!       probe error -> prune, attempts += 1, RepeatOne -> RepeatAll
//! ```
//!
//! A clean prune restarts the bound because the search space changed shape.
//! Probe errors keep counting so a persistently failing filesystem ends the
//! walk instead of spinning.

use crate::config::HistoryPolicy;
use crate::history::History;
use crate::oracle::ExistenceOracle;
use crate::playlist::Playlist;
use crate::types::{Directive, PlaybackMode, PrimarySource, TrackRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Why an entry was removed during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PruneReason {
    /// File no longer exists
    Missing,

    /// Existence probe raised an I/O error
    ProbeFailed,

    /// History entry no longer in the playlist
    NotInPlaylist,
}

/// An entry removed while resolving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedEntry {
    pub track: TrackRef,
    pub reason: PruneReason,
    pub source: PrimarySource,
}

/// Result of a resolution walk
///
/// `track` is existence-confirmed at resolution time; `None` means nothing
/// is available. `pruned` lists what was removed on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub track: Option<TrackRef>,
    pub pruned: Vec<PrunedEntry>,
}

impl Resolution {
    /// Whether the walk removed playlist entries
    pub fn playlist_changed(&self) -> bool {
        self.pruned
            .iter()
            .any(|entry| entry.source == PrimarySource::Playlist)
    }

    fn absorb(&mut self, other: Resolution) {
        self.pruned.extend(other.pruned);
        self.track = other.track;
    }
}

/// Self-healing resolver over playlist and history
#[derive(Clone)]
pub struct SequenceResolver {
    oracle: Arc<dyn ExistenceOracle>,
}

impl SequenceResolver {
    pub fn new(oracle: Arc<dyn ExistenceOracle>) -> Self {
        Self { oracle }
    }

    /// Next playable track from the playlist
    ///
    /// `mode` is read once; a `RepeatOne` whose target vanished falls back
    /// to `RepeatAll` for the rest of this call only.
    pub async fn next_track(
        &self,
        playlist: &mut Playlist,
        mode: PlaybackMode,
        directive: Directive,
    ) -> Resolution {
        let mut resolution = Resolution::default();
        if playlist.is_empty() {
            debug!("Playlist empty, nothing to resolve");
            return resolution;
        }

        let mut mode = mode;
        let mut attempts = 0usize;

        while !playlist.is_empty() && attempts < playlist.len() {
            let Some(index) = playlist.advance(mode, directive) else {
                break;
            };
            let Some(candidate) = playlist.get(index).cloned() else {
                break;
            };

            let reason = match self.oracle.exists(&candidate).await {
                Ok(true) => {
                    debug!("Resolved {} at index {} ({})", candidate, index, mode);
                    resolution.track = Some(candidate);
                    return resolution;
                }
                Ok(false) => {
                    attempts = 0;
                    PruneReason::Missing
                }
                Err(err) => {
                    warn!("Existence probe failed for {}: {}", candidate, err);
                    attempts += 1;
                    PruneReason::ProbeFailed
                }
            };

            warn!("Pruning {} from playlist ({:?})", candidate, reason);
            playlist.prune_at(index);
            resolution.pruned.push(PrunedEntry {
                track: candidate,
                reason,
                source: PrimarySource::Playlist,
            });

            if mode == PlaybackMode::RepeatOne {
                debug!("Repeat-one target gone, advancing as repeat-all");
                mode = PlaybackMode::RepeatAll;
            }
        }

        debug!(
            "No playable track in playlist ({} pruned, {} left)",
            resolution.pruned.len(),
            playlist.len()
        );
        resolution
    }

    /// Most recent playable history entry, left in place
    pub async fn recall(
        &self,
        history: &mut History,
        playlist: &mut Playlist,
        policy: HistoryPolicy,
    ) -> Resolution {
        history
            .find_valid_tail(self.oracle.as_ref(), playlist, policy)
            .await
    }

    /// Track before the one just played
    ///
    /// Pops the just-played tail, then the recalled entry below it. The
    /// recalled entry comes back through [`History::push`] once it loads.
    pub async fn previous_track(
        &self,
        history: &mut History,
        playlist: &mut Playlist,
        policy: HistoryPolicy,
    ) -> Resolution {
        let mut resolution = Resolution::default();

        let Some(just_played) = history.pop_tail() else {
            debug!("History empty, no previous track");
            return resolution;
        };
        debug!("Leaving {}", just_played);

        resolution.absorb(self.recall(history, playlist, policy).await);
        if resolution.track.is_some() {
            history.pop_tail();
        }
        resolution
    }
}

impl std::fmt::Debug for SequenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceResolver").finish_non_exhaustive()
    }
}
