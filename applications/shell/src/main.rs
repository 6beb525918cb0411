/// Cadence Shell - interactive track sequencer
use cadence_sequencer::{AvailabilityCoordinator, FsOracle, PlaybackMode};
use cadence_shell::{spawn_event_printer, Shell, ShellConfig, TagBackend};
use clap::Parser;
use std::{path::PathBuf, sync::Arc};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence-shell")]
#[command(about = "Cadence interactive track sequencer", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    /// Initial playback mode (shuffle, all, one)
    #[arg(short, long)]
    mode: Option<PlaybackMode>,

    /// Files to add to the playlist at startup
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout belongs to the shell
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_shell=info,cadence_sequencer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = ShellConfig::load(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        config.sequencer.initial_mode = mode;
    }
    config.validate()?;

    tracing::info!("Starting Cadence shell");
    tracing::info!("Mode: {}", config.sequencer.initial_mode);
    tracing::info!("History policy: {:?}", config.sequencer.history_policy);

    let (coordinator, requests) = AvailabilityCoordinator::with_config(
        &config.sequencer,
        Arc::new(FsOracle::new()),
        Arc::new(TagBackend::new()),
    );
    let coordinator = Arc::new(coordinator);

    let printer = config
        .shell
        .show_events
        .then(|| spawn_event_printer(coordinator.events()));

    if !cli.paths.is_empty() {
        let requested = cli.paths.len();
        let added = coordinator.add_tracks(cli.paths).await;
        tracing::info!("Queued {} of {} paths", added, requested);
    }

    let shell = Shell::new(Arc::clone(&coordinator), config.shell);
    shell
        .run(BufReader::new(tokio::io::stdin()), requests)
        .await?;

    if let Some(printer) = printer {
        printer.abort();
    }

    Ok(())
}
