//! Shared test doubles for sequencer integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use cadence_sequencer::{
    AvailabilityCoordinator, ExistenceOracle, PlaybackBackend, Result, SelectionRequest,
    SequencerConfig, SequencerError, TrackMetadata, TrackRef,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::mpsc;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn track(path: &str) -> TrackRef {
    TrackRef::from(path)
}

pub fn tracks(paths: &[&str]) -> Vec<TrackRef> {
    paths.iter().map(|p| TrackRef::from(*p)).collect()
}

/// In-memory filesystem: paths exist until removed, some probes can fail
#[derive(Default)]
pub struct MemoryOracle {
    existing: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
    probes: AtomicUsize,
}

impl MemoryOracle {
    pub fn with(paths: &[&str]) -> Arc<Self> {
        let oracle = Self::default();
        oracle
            .existing
            .lock()
            .unwrap()
            .extend(paths.iter().map(|p| p.to_string()));
        Arc::new(oracle)
    }

    pub fn create(&self, path: &str) {
        self.existing.lock().unwrap().insert(path.to_string());
    }

    pub fn delete(&self, path: &str) {
        self.existing.lock().unwrap().remove(path);
    }

    /// Every probe of `path` fails with an I/O error
    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExistenceOracle for MemoryOracle {
    async fn exists(&self, track: &TrackRef) -> std::io::Result<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(track.as_str()) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "probe failed",
            ));
        }
        Ok(self.existing.lock().unwrap().contains(track.as_str()))
    }
}

/// Backend that records loads and can reject chosen paths
#[derive(Default)]
pub struct RecordingBackend {
    loads: Mutex<Vec<TrackRef>>,
    rejected: Mutex<HashSet<String>>,
    paused: AtomicBool,
    toggles: AtomicUsize,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reject(&self, path: &str) {
        self.rejected.lock().unwrap().insert(path.to_string());
    }

    pub fn loads(&self) -> Vec<TrackRef> {
        self.loads.lock().unwrap().clone()
    }

    pub fn toggle_count(&self) -> usize {
        self.toggles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaybackBackend for RecordingBackend {
    async fn load_track(&self, track: &TrackRef) -> Result<TrackMetadata> {
        if self.rejected.lock().unwrap().contains(track.as_str()) {
            return Err(SequencerError::backend(format!("unsupported codec: {track}")));
        }
        self.loads.lock().unwrap().push(track.clone());
        self.paused.store(false, Ordering::SeqCst);
        Ok(TrackMetadata {
            title: track.file_name().map(str::to_string),
            ..Default::default()
        })
    }

    async fn toggle_playback(&self) -> Result<bool> {
        self.toggles.fetch_add(1, Ordering::SeqCst);
        let paused = !self.paused.load(Ordering::SeqCst);
        self.paused.store(paused, Ordering::SeqCst);
        Ok(paused)
    }
}

pub struct Harness {
    pub coordinator: Arc<AvailabilityCoordinator>,
    pub oracle: Arc<MemoryOracle>,
    pub backend: Arc<RecordingBackend>,
    pub requests: mpsc::Receiver<SelectionRequest>,
}

pub fn harness(config: &SequencerConfig, existing: &[&str]) -> Harness {
    init_tracing();
    let oracle = MemoryOracle::with(existing);
    let backend = RecordingBackend::new();
    let (coordinator, requests) =
        AvailabilityCoordinator::with_config(config, oracle.clone(), backend.clone());

    Harness {
        coordinator: Arc::new(coordinator),
        oracle,
        backend,
        requests,
    }
}
