//! Sequencer configuration

use crate::error::{Result, SequencerError};
use crate::types::PlaybackMode;
use serde::{Deserialize, Serialize};

/// Whether a history entry must still be in the playlist to be recalled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryPolicy {
    /// Any entry that still exists on disk
    AnyExisting,

    /// Entry must exist on disk and be present in the playlist
    #[default]
    RequirePlaylistMembership,
}

/// File chooser parameters passed to the selection collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooserSettings {
    #[serde(default)]
    pub multiple: bool,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Configuration for the sequencing core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Mode at startup (default: shuffle)
    #[serde(default)]
    pub initial_mode: PlaybackMode,

    /// History recall policy (default: require playlist membership)
    #[serde(default)]
    pub history_policy: HistoryPolicy,

    #[serde(default = "default_chooser")]
    pub chooser: ChooserSettings,

    /// Buffered events per subscriber before the slowest one lags
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Pending file-selection requests
    #[serde(default = "default_selection_capacity")]
    pub selection_capacity: usize,
}

impl SequencerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(SequencerError::Config(
                "event_capacity must be greater than zero".to_string(),
            ));
        }

        if self.selection_capacity == 0 {
            return Err(SequencerError::Config(
                "selection_capacity must be greater than zero".to_string(),
            ));
        }

        if let Some(bad) = self
            .chooser
            .extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(SequencerError::Config(format!(
                "chooser extension {bad:?} must be non-empty and without a leading dot"
            )));
        }

        Ok(())
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            initial_mode: PlaybackMode::default(),
            history_policy: HistoryPolicy::default(),
            chooser: default_chooser(),
            event_capacity: default_event_capacity(),
            selection_capacity: default_selection_capacity(),
        }
    }
}

impl Default for ChooserSettings {
    fn default() -> Self {
        default_chooser()
    }
}

fn default_chooser() -> ChooserSettings {
    ChooserSettings {
        multiple: false,
        extensions: default_extensions(),
    }
}

fn default_extensions() -> Vec<String> {
    vec!["mp3".to_string(), "wav".to_string(), "flac".to_string()]
}

fn default_event_capacity() -> usize {
    64
}

fn default_selection_capacity() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SequencerConfig::default();
        assert_eq!(config.initial_mode, PlaybackMode::Shuffle);
        assert_eq!(config.history_policy, HistoryPolicy::RequirePlaylistMembership);
        assert!(!config.chooser.multiple);
        assert_eq!(config.chooser.extensions, vec!["mp3", "wav", "flac"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = SequencerConfig {
            event_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SequencerError::Config(_))));
    }

    #[test]
    fn dotted_extension_rejected() {
        let config = SequencerConfig {
            chooser: ChooserSettings {
                multiple: true,
                extensions: vec![".ogg".to_string()],
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
