//! Availability coordination
//!
//! Answers "is there something playable right now" and loads it:
//!
//! ```text
//! Idle ── loaded? ──────────────────────────────▶ (already available)
//!   │
//!   ▼
//! ResolvingPrimary ── found ──────────────────────▶ Resolved ─▶ load
//!   │ none
//!   ▼
//! ResolvingFallback ── found ─────────────────────▶ Resolved ─▶ load
//!   │ none (external fallback allowed)
//!   ▼
//! AwaitingExternalSelection ── paths ─▶ playlist ─▶ Resolved | Exhausted
//!   │ cancelled / nothing chosen
//!   ▼
//! Exhausted
//! ```
//!
//! Only one availability request runs at a time per player; later callers
//! queue behind the in-flight guard and then see the track the first one
//! loaded, so a second file chooser is never opened.

use crate::backend::PlaybackBackend;
use crate::config::{ChooserSettings, HistoryPolicy, SequencerConfig};
use crate::events::{EventBus, SequencerEvent};
use crate::oracle::ExistenceOracle;
use crate::resolver::{Resolution, SequenceResolver};
use crate::selection::{selection_channel, FileSelector, Selection, SelectionRequest};
use crate::state::{PlayerState, SharedState};
use crate::types::{Directive, LoadedTrack, PlaybackMode, PrimarySource, TrackRef};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Coordinator phases, traced on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    ResolvingPrimary,
    ResolvingFallback,
    AwaitingExternalSelection,
    Resolved,
    Exhausted,
}

/// Parameters of one availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityRequest {
    /// Source consulted first
    pub primary: PrimarySource,

    /// Consult the other source when the primary yields nothing
    pub fallback: bool,

    /// Ask the user for files when both sources are exhausted
    pub external_fallback: bool,
}

impl AvailabilityRequest {
    pub fn new(primary: PrimarySource, external_fallback: bool) -> Self {
        Self {
            primary,
            fallback: true,
            external_fallback,
        }
    }

    /// Continue from the playlist only, without history or file chooser
    ///
    /// Used when a track ends on its own.
    pub fn playlist_only() -> Self {
        Self {
            primary: PrimarySource::Playlist,
            fallback: false,
            external_fallback: false,
        }
    }
}

/// Why nothing could be made available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionCause {
    /// Playlist and history yielded nothing playable
    NothingPlayable,

    /// User closed the file chooser
    SelectionCancelled,

    /// File chooser returned no paths
    NothingSelected,
}

/// Outcome of an availability check or a skip
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    /// A track was already loaded; nothing was touched
    AlreadyLoaded,

    /// A track was resolved and accepted by the backend
    Loaded(LoadedTrack),

    /// Nothing to play
    Exhausted(ExhaustionCause),

    /// The backend rejected a resolved, existing track
    LoadFailed { track: TrackRef, reason: String },
}

impl Availability {
    /// Whether a track is loaded after the call
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::AlreadyLoaded | Availability::Loaded(_))
    }
}

/// Outcome of a play/pause request
#[derive(Debug, Clone, PartialEq)]
pub enum Toggle {
    /// Nothing was loaded; a track was just loaded and is playing
    Started(LoadedTrack),

    Paused,
    Resumed,

    /// Nothing could be loaded, or the new track was rejected
    Unavailable(Availability),

    /// Backend failed to toggle
    Failed(String),
}

/// User-facing playback intents (keyboard, media keys, UI buttons)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    TogglePlayback,
    Next,
    Previous,
}

/// Result of [`AvailabilityCoordinator::handle`]
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    Toggled(Toggle),
    Skipped(Availability),
}

/// Orchestrates resolution, file selection and loading for one player
pub struct AvailabilityCoordinator {
    state: SharedState,
    resolver: SequenceResolver,
    backend: Arc<dyn PlaybackBackend>,
    selector: FileSelector,
    events: EventBus,
    history_policy: HistoryPolicy,
    chooser: ChooserSettings,
    in_flight: Mutex<()>,
}

impl AvailabilityCoordinator {
    pub fn new(
        state: SharedState,
        oracle: Arc<dyn ExistenceOracle>,
        backend: Arc<dyn PlaybackBackend>,
        selector: FileSelector,
        events: EventBus,
        config: &SequencerConfig,
    ) -> Self {
        Self {
            state,
            resolver: SequenceResolver::new(oracle),
            backend,
            selector,
            events,
            history_policy: config.history_policy,
            chooser: config.chooser.clone(),
            in_flight: Mutex::new(()),
        }
    }

    /// Build a coordinator with fresh state, event bus and selection channel
    ///
    /// The returned receiver must be served by the UI layer; dropping it
    /// turns every file selection into a cancellation.
    pub fn with_config(
        config: &SequencerConfig,
        oracle: Arc<dyn ExistenceOracle>,
        backend: Arc<dyn PlaybackBackend>,
    ) -> (Self, mpsc::Receiver<SelectionRequest>) {
        let state = SharedState::new(PlayerState::new(config.initial_mode));
        let events = EventBus::new(config.event_capacity);
        let (selector, requests) = selection_channel(config.selection_capacity);
        (
            Self::new(state, oracle, backend, selector, events, config),
            requests,
        )
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Make sure a track is loaded, consulting `primary` first
    ///
    /// The other source is always tried as a fallback. With
    /// `allow_external_fallback`, the user is asked for files once both are
    /// exhausted.
    ///
    /// Under [`HistoryPolicy::RequirePlaylistMembership`] history only yields
    /// entries still in the playlist, so once the playlist has been pruned
    /// empty the history fallback finds nothing and discards every entry it
    /// scans. Use [`HistoryPolicy::AnyExisting`] to recall tracks that are
    /// no longer queued.
    pub async fn ensure_available(
        &self,
        primary: PrimarySource,
        allow_external_fallback: bool,
    ) -> Availability {
        self.ensure(AvailabilityRequest::new(primary, allow_external_fallback))
            .await
    }

    /// Make sure a track is loaded
    pub async fn ensure(&self, request: AvailabilityRequest) -> Availability {
        let _guard = self.in_flight.lock().await;
        self.ensure_locked(request).await
    }

    /// Skip to the next track, even under repeat-one
    ///
    /// When nothing is playable the current track stays loaded.
    pub async fn skip_forward(&self) -> Availability {
        let _guard = self.in_flight.lock().await;

        let track = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let resolution = self
                .resolver
                .next_track(&mut state.playlist, state.mode, Directive::ForceAdvance)
                .await;
            let length = state.playlist.len();
            drop(guard);
            self.report(resolution, length)
        };

        match track {
            Some(track) => self.load(track).await,
            None => {
                info!("Skip forward: nothing to play");
                Availability::Exhausted(ExhaustionCause::NothingPlayable)
            }
        }
    }

    /// Go back to the previously played track
    pub async fn skip_backward(&self) -> Availability {
        let _guard = self.in_flight.lock().await;

        let track = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let resolution = self
                .resolver
                .previous_track(&mut state.history, &mut state.playlist, self.history_policy)
                .await;
            let length = state.playlist.len();
            drop(guard);
            self.report(resolution, length)
        };

        let availability = match track {
            Some(track) => self.load(track).await,
            None => {
                info!("Skip backward: no previous track");
                Availability::Exhausted(ExhaustionCause::NothingPlayable)
            }
        };

        // The recall popped the loaded track off history and may have moved
        // the cursor away from it
        if !matches!(availability, Availability::Loaded(_)) {
            let mut state = self.state.lock().await;
            if let Some(track) = state.loaded().map(|loaded| loaded.track.clone()) {
                if let Some(index) = state.playlist.position_of(&track) {
                    let _ = state.playlist.select(index);
                }
                state.history.push(track);
            }
        }
        availability
    }

    /// Play/pause
    ///
    /// If nothing is loaded, this first makes something available; a track
    /// loaded by this call starts playing without a toggle.
    pub async fn toggle_playback(&self) -> Toggle {
        match self.ensure_available(PrimarySource::Playlist, true).await {
            Availability::AlreadyLoaded => {}
            Availability::Loaded(loaded) => {
                debug!("Chose {} just now, not toggling", loaded.track);
                return Toggle::Started(loaded);
            }
            unavailable => {
                info!("Nothing to play, not toggling");
                return Toggle::Unavailable(unavailable);
            }
        }

        match self.backend.toggle_playback().await {
            Ok(paused) => {
                self.state.lock().await.set_paused(paused);
                self.events
                    .emit(SequencerEvent::PlaybackStatusChanged { paused });
                debug!("Playback toggled, paused: {}", paused);
                if paused {
                    Toggle::Paused
                } else {
                    Toggle::Resumed
                }
            }
            Err(err) => {
                warn!("Backend failed to toggle playback: {}", err);
                Toggle::Failed(err.to_string())
            }
        }
    }

    /// The loaded track reached its end
    ///
    /// Unloads it and continues from the playlist without consulting
    /// history or the user.
    pub async fn track_finished(&self) -> Availability {
        let _guard = self.in_flight.lock().await;

        let finished = {
            let mut state = self.state.lock().await;
            let finished = state.loaded().map(|loaded| loaded.track.clone());
            state.unload();
            finished
        };
        if let Some(track) = finished {
            debug!("Finished {}", track);
            self.events.emit(SequencerEvent::CurrentlyPlayingChanged {
                track: None,
                metadata: None,
            });
            self.events
                .emit(SequencerEvent::PlaybackStatusChanged { paused: true });
        }

        self.ensure_locked(AvailabilityRequest::playlist_only())
            .await
    }

    /// Dispatch a user intent
    pub async fn handle(&self, intent: Intent) -> IntentOutcome {
        match intent {
            Intent::TogglePlayback => IntentOutcome::Toggled(self.toggle_playback().await),
            Intent::Next => IntentOutcome::Skipped(self.skip_forward().await),
            Intent::Previous => IntentOutcome::Skipped(self.skip_backward().await),
        }
    }

    /// Append tracks to the playlist
    ///
    /// Returns how many were new.
    pub async fn add_tracks<I, T>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: Into<TrackRef>,
    {
        let (added, length) = {
            let mut state = self.state.lock().await;
            let added = state.playlist.bulk_add(paths);
            (added, state.playlist.len())
        };

        if added > 0 {
            debug!("Added {} tracks to playlist", added);
            self.events.playlist_changed(length);
        }
        added
    }

    /// Remove playlist entries by index
    pub async fn remove_tracks<I>(&self, indices: I) -> Vec<TrackRef>
    where
        I: IntoIterator<Item = usize>,
    {
        let (removed, length) = {
            let mut state = self.state.lock().await;
            let removed = state.playlist.remove_many(indices);
            (removed, state.playlist.len())
        };

        if !removed.is_empty() {
            debug!("Removed {} tracks from playlist", removed.len());
            self.events.playlist_changed(length);
        }
        removed
    }

    pub async fn mode(&self) -> PlaybackMode {
        self.state.lock().await.mode
    }

    pub async fn set_mode(&self, mode: PlaybackMode) {
        self.state.lock().await.mode = mode;
        info!("Playback mode: {}", mode);
    }

    /// Switch to the next mode in toggle order
    pub async fn cycle_mode(&self) -> PlaybackMode {
        let mode = {
            let mut state = self.state.lock().await;
            state.mode = state.mode.cycle();
            state.mode
        };
        info!("Playback mode: {}", mode);
        mode
    }

    async fn ensure_locked(&self, request: AvailabilityRequest) -> Availability {
        trace_phase(Phase::Idle);
        if self.state.lock().await.is_loaded() {
            debug!("Audio already loaded");
            return Availability::AlreadyLoaded;
        }

        trace_phase(Phase::ResolvingPrimary);
        let mut track = self.resolve_from(request.primary).await;

        if track.is_none() && request.fallback {
            debug!("{:?} yielded nothing, trying {:?}", request.primary, request.primary.other());
            trace_phase(Phase::ResolvingFallback);
            track = self.resolve_from(request.primary.other()).await;
        }

        let track = match track {
            Some(track) => track,
            None if request.external_fallback => {
                trace_phase(Phase::AwaitingExternalSelection);
                match self.await_selection().await {
                    Ok(track) => track,
                    Err(cause) => {
                        trace_phase(Phase::Exhausted);
                        info!("Nothing to play ({:?})", cause);
                        return Availability::Exhausted(cause);
                    }
                }
            }
            None => {
                trace_phase(Phase::Exhausted);
                info!("Nothing to play");
                return Availability::Exhausted(ExhaustionCause::NothingPlayable);
            }
        };

        trace_phase(Phase::Resolved);
        self.load(track).await
    }

    async fn resolve_from(&self, source: PrimarySource) -> Option<TrackRef> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let resolution = match source {
            PrimarySource::Playlist => {
                self.resolver
                    .next_track(&mut state.playlist, state.mode, Directive::Advance)
                    .await
            }
            PrimarySource::History => {
                self.resolver
                    .recall(&mut state.history, &mut state.playlist, self.history_policy)
                    .await
            }
        };

        let length = state.playlist.len();
        drop(guard);
        self.report(resolution, length)
    }

    /// Ask the user for files, add them, and resolve once more
    async fn await_selection(&self) -> Result<TrackRef, ExhaustionCause> {
        let selection = self
            .selector
            .choose(self.chooser.multiple, &self.chooser.extensions)
            .await;

        let paths = match selection {
            Selection::Cancelled => return Err(ExhaustionCause::SelectionCancelled),
            Selection::Chosen(paths) if paths.is_empty() => {
                return Err(ExhaustionCause::NothingSelected)
            }
            Selection::Chosen(paths) => paths,
        };

        info!("User selected {} file(s)", paths.len());
        self.add_tracks(paths).await;

        trace_phase(Phase::ResolvingPrimary);
        self.resolve_from(PrimarySource::Playlist)
            .await
            .ok_or(ExhaustionCause::NothingPlayable)
    }

    async fn load(&self, track: TrackRef) -> Availability {
        match self.backend.load_track(&track).await {
            Ok(metadata) => {
                let loaded = LoadedTrack {
                    track: track.clone(),
                    metadata,
                };
                {
                    let mut state = self.state.lock().await;
                    state.set_loaded(loaded.clone());
                    state.history.push(track);
                }

                info!(
                    "Loaded {} - {}",
                    loaded.metadata.display_artist(),
                    loaded.metadata.display_title(&loaded.track)
                );
                self.events.emit(SequencerEvent::CurrentlyPlayingChanged {
                    track: Some(loaded.track.clone()),
                    metadata: Some(loaded.metadata.clone()),
                });
                self.events
                    .emit(SequencerEvent::PlaybackStatusChanged { paused: false });
                Availability::Loaded(loaded)
            }
            Err(err) => {
                warn!("Backend rejected {}: {}", track, err);
                Availability::LoadFailed {
                    track,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Broadcast what a resolution pruned and hand back its track
    fn report(&self, resolution: Resolution, playlist_len: usize) -> Option<TrackRef> {
        let playlist_changed = resolution.playlist_changed();

        for entry in resolution.pruned {
            self.events.emit(SequencerEvent::TrackPruned {
                track: entry.track,
                reason: entry.reason,
            });
        }
        if playlist_changed {
            self.events.playlist_changed(playlist_len);
        }

        resolution.track
    }
}

impl std::fmt::Debug for AvailabilityCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityCoordinator")
            .field("history_policy", &self.history_policy)
            .field("chooser", &self.chooser)
            .finish_non_exhaustive()
    }
}

fn trace_phase(phase: Phase) {
    debug!("Availability phase: {:?}", phase);
}
