//! Core types for track sequencing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Identity of a playable file
///
/// Opaque path string. Two references are the same track only when the
/// strings are equal; no normalisation or content comparison is done.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRef(String);

impl TrackRef {
    /// Create a track reference from a path string
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only paths are never added to a playlist
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Last path component, if any
    pub fn file_name(&self) -> Option<&str> {
        self.0
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackRef {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for TrackRef {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<PathBuf> for TrackRef {
    fn from(path: PathBuf) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

impl AsRef<Path> for TrackRef {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

/// Playback mode
///
/// Governs how the resolver moves the playlist cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackMode {
    /// Pick a uniformly random entry on every advance
    #[default]
    Shuffle,

    /// Walk the playlist in order, wrapping at the end
    RepeatAll,

    /// Stay on the current entry unless a skip is forced
    RepeatOne,
}

impl PlaybackMode {
    /// Next mode in the UI toggle order
    pub fn cycle(self) -> Self {
        match self {
            PlaybackMode::Shuffle => PlaybackMode::RepeatAll,
            PlaybackMode::RepeatAll => PlaybackMode::RepeatOne,
            PlaybackMode::RepeatOne => PlaybackMode::Shuffle,
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackMode::Shuffle => "shuffle",
            PlaybackMode::RepeatAll => "repeat-all",
            PlaybackMode::RepeatOne => "repeat-one",
        };
        f.write_str(name)
    }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shuffle" => Ok(PlaybackMode::Shuffle),
            "all" | "repeat-all" | "repeat_all" => Ok(PlaybackMode::RepeatAll),
            "one" | "repeat-one" | "repeat_one" => Ok(PlaybackMode::RepeatOne),
            other => Err(format!("unknown playback mode: {other}")),
        }
    }
}

/// How the resolver is asked to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Natural progression (end of track, first play)
    Advance,

    /// Explicit skip: leaves the current track even under `RepeatOne`
    ForceAdvance,
}

/// Where the coordinator looks first for something playable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimarySource {
    #[default]
    Playlist,
    History,
}

impl PrimarySource {
    /// The source consulted when this one yields nothing
    pub fn other(self) -> Self {
        match self {
            PrimarySource::Playlist => PrimarySource::History,
            PrimarySource::History => PrimarySource::Playlist,
        }
    }
}

/// Metadata reported by the playback backend for a loaded track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,

    /// Cover art as a data URL
    pub cover: Option<String>,

    pub duration: Duration,
}

impl TrackMetadata {
    /// Title to show, falling back to the file name
    pub fn display_title(&self, track: &TrackRef) -> String {
        self.title
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| track.file_name().map(str::to_string))
            .unwrap_or_else(|| "Unknown Title".to_string())
    }

    /// Artist to show
    pub fn display_artist(&self) -> String {
        self.artist
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Unknown Artist".to_string())
    }
}

/// A track accepted by the playback backend
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrack {
    pub track: TrackRef,
    pub metadata: TrackMetadata,
}
