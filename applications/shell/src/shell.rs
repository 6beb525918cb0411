//! Interactive command loop
//!
//! Commands run one at a time. While a command waits on the file chooser,
//! the next input line is taken as the chooser's answer.

use crate::command::{parse_selection, Command, HELP};
use crate::config::ShellSettings;
use cadence_sequencer::{
    Availability, AvailabilityCoordinator, EventBus, ExhaustionCause, LoadedTrack, PruneReason,
    Selection, SelectionRequest, SequencerEvent, Toggle,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct Shell {
    coordinator: Arc<AvailabilityCoordinator>,
    settings: ShellSettings,
}

impl Shell {
    pub fn new(coordinator: Arc<AvailabilityCoordinator>, settings: ShellSettings) -> Self {
        Self {
            coordinator,
            settings,
        }
    }

    /// Read commands from `input` until `quit` or end of input
    pub async fn run<R>(
        &self,
        input: R,
        mut requests: mpsc::Receiver<SelectionRequest>,
    ) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            self.prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => command,
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            };
            debug!("Running {:?}", command);

            let task = execute(&self.coordinator, command);
            tokio::pin!(task);

            let output = loop {
                tokio::select! {
                    output = &mut task => break output,
                    Some(request) = requests.recv() => {
                        println!(
                            "Choose file{} ({}), empty line cancels:",
                            if request.multiple { "s" } else { "" },
                            request.extensions.join(", ")
                        );
                        self.prompt()?;
                        let selection = match lines.next_line().await? {
                            Some(line) => {
                                parse_selection(&line, request.multiple, &request.extensions)
                            }
                            None => Selection::Cancelled,
                        };
                        request.respond(selection);
                    }
                }
            };
            println!("{output}");
        }

        info!("Shell closed");
        Ok(())
    }

    fn prompt(&self) -> std::io::Result<()> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", self.settings.prompt)?;
        stdout.flush()
    }
}

/// Run one command and describe the outcome
pub async fn execute(coordinator: &AvailabilityCoordinator, command: Command) -> String {
    match command {
        Command::Toggle => match coordinator.toggle_playback().await {
            Toggle::Started(loaded) => describe_loaded(&loaded),
            Toggle::Paused => "Paused".to_string(),
            Toggle::Resumed => "Playing".to_string(),
            Toggle::Unavailable(availability) => describe_availability(&availability),
            Toggle::Failed(reason) => format!("Playback error: {reason}"),
        },
        Command::Next => describe_availability(&coordinator.skip_forward().await),
        Command::Previous => describe_availability(&coordinator.skip_backward().await),
        Command::Finish => describe_availability(&coordinator.track_finished().await),
        Command::Add(paths) => {
            let requested = paths.len();
            let added = coordinator.add_tracks(paths).await;
            if added == requested {
                format!("Added {added} track(s)")
            } else {
                format!("Added {added} track(s), skipped {} duplicate(s)", requested - added)
            }
        }
        Command::Remove(indices) => {
            let removed = coordinator.remove_tracks(indices).await;
            format!("Removed {} track(s)", removed.len())
        }
        Command::Mode(Some(mode)) => {
            coordinator.set_mode(mode).await;
            format!("Mode: {mode}")
        }
        Command::Mode(None) => format!("Mode: {}", coordinator.cycle_mode().await),
        Command::List => {
            let state = coordinator.state().lock().await;
            if state.playlist.is_empty() {
                return "Playlist is empty".to_string();
            }
            state
                .playlist
                .entries()
                .iter()
                .enumerate()
                .map(|(index, track)| {
                    let marker = if state.playlist.cursor() == Some(index) {
                        '>'
                    } else {
                        ' '
                    };
                    format!("{marker} {index:>3}  {track}")
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Command::History => {
            let state = coordinator.state().lock().await;
            if state.history.is_empty() {
                return "History is empty".to_string();
            }
            state
                .history
                .entries()
                .iter()
                .rev()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        }
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    }
}

pub fn describe_availability(availability: &Availability) -> String {
    match availability {
        Availability::AlreadyLoaded => "Already loaded".to_string(),
        Availability::Loaded(loaded) => describe_loaded(loaded),
        Availability::Exhausted(ExhaustionCause::NothingPlayable) => "Nothing to play".to_string(),
        Availability::Exhausted(ExhaustionCause::SelectionCancelled) => {
            "Selection cancelled".to_string()
        }
        Availability::Exhausted(ExhaustionCause::NothingSelected) => {
            "No files selected".to_string()
        }
        Availability::LoadFailed { track, reason } => format!("Could not load {track}: {reason}"),
    }
}

fn describe_loaded(loaded: &LoadedTrack) -> String {
    let metadata = &loaded.metadata;
    let mut line = format!(
        "Now playing: {} - {}",
        metadata.display_artist(),
        metadata.display_title(&loaded.track)
    );
    if let Some(album) = &metadata.album {
        line.push_str(&format!(" [{album}]"));
    }
    if !metadata.duration.is_zero() {
        line.push_str(&format!(" ({})", format_duration(metadata.duration)));
    }
    line
}

pub fn describe_event(event: &SequencerEvent) -> String {
    match event {
        SequencerEvent::PlaylistChanged { length } => format!("playlist: {length} track(s)"),
        SequencerEvent::CurrentlyPlayingChanged {
            track: Some(track),
            metadata,
        } => {
            let title = metadata
                .as_ref()
                .map(|m| m.display_title(track))
                .unwrap_or_else(|| track.to_string());
            format!("current: {title}")
        }
        SequencerEvent::CurrentlyPlayingChanged { track: None, .. } => "current: none".to_string(),
        SequencerEvent::TrackPruned { track, reason } => {
            let reason = match reason {
                PruneReason::Missing => "missing",
                PruneReason::ProbeFailed => "unreadable",
                PruneReason::NotInPlaylist => "not in playlist",
            };
            format!("dropped {track} ({reason})")
        }
        SequencerEvent::PlaybackStatusChanged { paused: true } => "paused".to_string(),
        SequencerEvent::PlaybackStatusChanged { paused: false } => "playing".to_string(),
    }
}

/// Print every event until the bus closes
pub fn spawn_event_printer(events: &EventBus) -> JoinHandle<()> {
    let mut rx = events.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => println!("[{}]", describe_event(&event)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event printer fell behind, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
