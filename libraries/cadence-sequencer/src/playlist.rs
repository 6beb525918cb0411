//! Playlist with a self-repairing cursor
//!
//! Ordered, duplicate-free list of candidate tracks plus the index of the
//! currently selected entry.
//!
//! ```text
//! entries:  [ a ][ b ][ c ][ d ]
//! cursor:          ^
//!
//! cursor == None  ->  before the first entry; the next forward advance
//!                     lands on index 0
//! ```
//!
//! Invariant: when `entries` is non-empty, a `Some` cursor is always
//! `< entries.len()`. An empty playlist always has cursor `None`.

use crate::error::{Result, SequencerError};
use crate::types::{Directive, PlaybackMode, TrackRef};
use rand::Rng;
use std::collections::HashSet;

/// Ordered playlist of track references
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    entries: Vec<TrackRef>,

    /// Currently selected entry; `None` is the pre-first position
    cursor: Option<usize>,
}

impl Playlist {
    /// Create new empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Append tracks that are not blank and not already present
    ///
    /// Input order is kept and duplicates inside `paths` are collapsed.
    /// Returns the number of appended entries. When nothing new survives the
    /// filter the playlist, cursor included, is untouched. Adding to an
    /// empty playlist parks the cursor before the first entry so the next
    /// advance plays the first added track.
    pub fn bulk_add<I, T>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: Into<TrackRef>,
    {
        let was_empty = self.entries.is_empty();
        let before = self.entries.len();
        let mut seen: HashSet<TrackRef> = self.entries.iter().cloned().collect();

        for path in paths {
            let track = path.into();
            if track.is_blank() || seen.contains(&track) {
                continue;
            }
            seen.insert(track.clone());
            self.entries.push(track);
        }

        let added = self.entries.len() - before;
        if added > 0 && was_empty {
            self.cursor = None;
        }
        added
    }

    /// Remove the entry at `index`
    ///
    /// The cursor keeps its numeric value (clamped to the new length);
    /// it is not shifted relative to the removed index.
    pub fn remove_at(&mut self, index: usize) -> Option<TrackRef> {
        if index >= self.entries.len() {
            return None;
        }

        let track = self.entries.remove(index);
        self.clamp_cursor();
        Some(track)
    }

    /// Remove several entries in one operation
    ///
    /// Indices are deduplicated, out-of-range ones ignored, and removal runs
    /// from the highest index down so earlier removals never invalidate
    /// later ones. A removal before the cursor shifts it left; removing the
    /// cursor entry itself keeps the numeric position so the following
    /// track slides under it.
    ///
    /// Returns the removed tracks in their original order.
    pub fn remove_many<I>(&mut self, indices: I) -> Vec<TrackRef>
    where
        I: IntoIterator<Item = usize>,
    {
        let len = self.entries.len();
        let mut indices: Vec<usize> = indices.into_iter().filter(|&i| i < len).collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();

        let mut removed = Vec::with_capacity(indices.len());
        for index in indices {
            removed.push(self.entries.remove(index));

            if let Some(cursor) = self.cursor {
                if index < cursor {
                    self.cursor = Some(cursor - 1);
                } else if index == cursor {
                    self.cursor = Some(cursor.min(self.entries.len().saturating_sub(1)));
                }
            }
        }

        if self.entries.is_empty() {
            self.cursor = None;
        }

        removed.reverse();
        removed
    }

    /// Move the cursor for the given mode and directive
    ///
    /// - `RepeatOne` + `Advance`: stay (the pre-first position becomes 0)
    /// - `Shuffle`: uniformly random index
    /// - `RepeatAll`, or `RepeatOne` + `ForceAdvance`: next index, wrapping
    ///
    /// Returns the new cursor, or `None` for an empty playlist.
    pub fn advance(&mut self, mode: PlaybackMode, directive: Directive) -> Option<usize> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }

        let next = match (mode, directive) {
            (PlaybackMode::RepeatOne, Directive::Advance) => {
                self.cursor.map_or(0, |cursor| cursor.min(len - 1))
            }
            (PlaybackMode::Shuffle, _) => random_index(len),
            (PlaybackMode::RepeatAll, _) | (PlaybackMode::RepeatOne, Directive::ForceAdvance) => {
                self.cursor.map_or(0, |cursor| (cursor + 1) % len)
            }
        };

        self.cursor = Some(next);
        Some(next)
    }

    /// Remove a stale entry found during resolution
    ///
    /// Parks the cursor just before the vacated slot: the next forward
    /// advance lands on the entry that slid into it, or wraps to the first
    /// entry when the last one was pruned.
    pub(crate) fn prune_at(&mut self, index: usize) -> Option<TrackRef> {
        if index >= self.entries.len() {
            return None;
        }

        let track = self.entries.remove(index);
        self.cursor = if self.entries.is_empty() {
            None
        } else {
            index.checked_sub(1)
        };
        Some(track)
    }

    /// Select the entry at `index`
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(SequencerError::InvalidIndex {
                index,
                len: self.entries.len(),
            });
        }
        self.cursor = Some(index);
        Ok(())
    }

    /// Current cursor; `None` before the first advance or when empty
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&TrackRef> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn get(&self, index: usize) -> Option<&TrackRef> {
        self.entries.get(index)
    }

    pub fn position_of(&self, track: &TrackRef) -> Option<usize> {
        self.entries.iter().position(|entry| entry == track)
    }

    pub fn contains(&self, track: &TrackRef) -> bool {
        self.entries.contains(track)
    }

    /// All entries in playlist order
    pub fn entries(&self) -> &[TrackRef] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    fn clamp_cursor(&mut self) {
        if self.entries.is_empty() {
            self.cursor = None;
        } else if let Some(cursor) = self.cursor {
            self.cursor = Some(cursor.min(self.entries.len() - 1));
        }
    }
}

fn random_index(len: usize) -> usize {
    rand::thread_rng().gen_range(0..len)
}
