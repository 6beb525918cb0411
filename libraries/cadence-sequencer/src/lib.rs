//! Cadence - Track Sequencing
//!
//! Decides which file plays next or previous, tolerating a library that
//! references files which no longer exist on disk.
//!
//! This crate provides:
//! - Playlist with duplicate-free bulk add and cursor-repairing removal
//! - Playback history with destructive "last valid entry" scan
//! - Self-healing sequence resolution (Shuffle, Repeat All, Repeat One)
//! - Availability coordination with history fallback and a file chooser
//!   handshake when everything is exhausted
//!
//! # Architecture
//!
//! `cadence-sequencer` owns no I/O of its own beyond existence probing.
//! Collaborators are plugged in at the seams:
//! - [`ExistenceOracle`]: "does this file exist" ([`FsOracle`] for disks)
//! - [`PlaybackBackend`]: loads a resolved track, toggles play/pause
//! - [`FileSelector`] / [`SelectionRequest`]: file chooser presented by the UI
//! - [`EventBus`]: fire-and-forget [`SequencerEvent`]s for observers
//!
//! All mutable state lives in one [`PlayerState`] behind a [`SharedState`]
//! handle; nothing is global.
//!
//! # Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use cadence_sequencer::{
//!     AvailabilityCoordinator, FsOracle, PlaybackBackend, PrimarySource, Result,
//!     SequencerConfig, TrackMetadata, TrackRef,
//! };
//! use std::sync::Arc;
//!
//! struct Silent;
//!
//! #[async_trait]
//! impl PlaybackBackend for Silent {
//!     async fn load_track(&self, _track: &TrackRef) -> Result<TrackMetadata> {
//!         Ok(TrackMetadata::default())
//!     }
//!
//!     async fn toggle_playback(&self) -> Result<bool> {
//!         Ok(true)
//!     }
//! }
//!
//! # async fn example() {
//! let config = SequencerConfig::default();
//! let (coordinator, mut requests) =
//!     AvailabilityCoordinator::with_config(&config, Arc::new(FsOracle), Arc::new(Silent));
//!
//! // The UI answers file chooser requests
//! tokio::spawn(async move {
//!     while let Some(request) = requests.recv().await {
//!         request.choose(vec![TrackRef::from("/music/song.mp3")]);
//!     }
//! });
//!
//! coordinator.add_tracks(["/music/a.mp3", "/music/b.flac"]).await;
//! let availability = coordinator
//!     .ensure_available(PrimarySource::Playlist, true)
//!     .await;
//! println!("playable: {}", availability.is_available());
//! # }
//! ```

mod backend;
mod config;
mod coordinator;
mod error;
mod events;
mod history;
mod oracle;
mod playlist;
mod resolver;
mod selection;
mod state;
pub mod types;

// Public exports
pub use backend::PlaybackBackend;
pub use config::{ChooserSettings, HistoryPolicy, SequencerConfig};
pub use coordinator::{
    Availability, AvailabilityCoordinator, AvailabilityRequest, ExhaustionCause, Intent,
    IntentOutcome, Toggle,
};
pub use error::{Result, SequencerError};
pub use events::{EventBus, SequencerEvent};
pub use history::History;
pub use oracle::{ExistenceOracle, FsOracle};
pub use playlist::Playlist;
pub use resolver::{PruneReason, PrunedEntry, Resolution, SequenceResolver};
pub use selection::{selection_channel, FileSelector, Selection, SelectionRequest};
pub use state::{PlayerState, SharedState};
pub use types::{
    Directive, LoadedTrack, PlaybackMode, PrimarySource, TrackMetadata, TrackRef,
};
