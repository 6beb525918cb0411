/// Shell configuration
use cadence_sequencer::{Result, SequencerConfig, SequencerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub sequencer: SequencerConfig,

    #[serde(default = "default_shell")]
    pub shell: ShellSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShellSettings {
    /// Printed before every command line
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Print sequencer events as they happen
    #[serde(default = "default_show_events")]
    pub show_events: bool,
}

impl ShellConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `cadence.toml` is used when
    /// present. Environment variables override both, e.g.
    /// `CADENCE_SEQUENCER__INITIAL_MODE=repeat-one`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Double underscore separates nesting so field names keep theirs
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| SequencerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| SequencerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.sequencer.validate()?;

        if self.shell.prompt.contains('\n') {
            return Err(SequencerError::Config(
                "shell prompt must fit on one line".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            sequencer: SequencerConfig::default(),
            shell: default_shell(),
        }
    }
}

// Default values
fn default_shell() -> ShellSettings {
    ShellSettings {
        prompt: default_prompt(),
        show_events: default_show_events(),
    }
}

fn default_prompt() -> String {
    "cadence> ".to_string()
}

fn default_show_events() -> bool {
    true
}
