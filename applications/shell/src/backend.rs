/// Playback backend that reads tags instead of producing audio
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cadence_sequencer::{PlaybackBackend, Result, SequencerError, TrackMetadata, TrackRef};
use lofty::{AudioFile, PictureType, TaggedFileExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Tag-reading backend
///
/// "Loading" a track means reading its tags with lofty; playback state is a
/// paused flag that starts playing on every load.
pub struct TagBackend {
    paused: AtomicBool,
}

impl TagBackend {
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(true),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl Default for TagBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackBackend for TagBackend {
    async fn load_track(&self, track: &TrackRef) -> Result<TrackMetadata> {
        let path = PathBuf::from(track.as_str());

        // lofty does blocking file I/O
        let metadata = tokio::task::spawn_blocking(move || read_tags(&path))
            .await
            .map_err(|e| SequencerError::backend(format!("tag reader task failed: {e}")))??;

        self.paused.store(false, Ordering::SeqCst);
        debug!("Read tags for {}", track);
        Ok(metadata)
    }

    async fn toggle_playback(&self) -> Result<bool> {
        // fetch_xor hands back the previous value
        let paused = !self.paused.fetch_xor(true, Ordering::SeqCst);
        Ok(paused)
    }
}

/// Read title, artist, album, cover and duration
fn read_tags(path: &Path) -> Result<TrackMetadata> {
    let tagged_file =
        lofty::read_from_path(path).map_err(|e| SequencerError::backend(e.to_string()))?;

    let duration = tagged_file.properties().duration();

    // Primary tag or first available tag
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let mut metadata = tag.map(extract_from_tag).unwrap_or_default();
    metadata.duration = duration;
    Ok(metadata)
}

fn extract_from_tag(tag: &lofty::Tag) -> TrackMetadata {
    let mut metadata = TrackMetadata::default();

    for item in tag.items() {
        match item.key() {
            lofty::ItemKey::TrackTitle => {
                metadata.title = item.value().text().map(|s| s.to_string());
            }
            lofty::ItemKey::TrackArtist => {
                metadata.artist = item.value().text().map(|s| s.to_string());
            }
            lofty::ItemKey::AlbumTitle => {
                metadata.album = item.value().text().map(|s| s.to_string());
            }
            _ => {}
        }
    }

    // Prefer front cover, otherwise use first picture
    let pictures = tag.pictures();
    let picture = pictures
        .iter()
        .find(|p| matches!(p.pic_type(), PictureType::CoverFront))
        .or_else(|| pictures.first());

    metadata.cover = picture.map(|picture| {
        let mime_type = picture
            .mime_type()
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());
        cover_data_url(&mime_type, picture.data())
    });

    metadata
}

fn cover_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}
