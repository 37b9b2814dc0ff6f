use anyhow::{Context, Result};
use sightline::clock::SystemClock;
use sightline::config::{apply_env_overrides, load_config, SightlineConfig};
use sightline::detection::LabelTable;
use sightline::dispatch::HttpAnswerService;
use sightline::replay::{ConsoleDisplay, Script};
use sightline::{FrameLoop, LoopExit, LoopIo};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sightline=info".into()),
        )
        .init();

    info!("Sightline starting...");

    let mut config = match std::env::var("SIGHTLINE_CONFIG") {
        Ok(path) => load_config(&path)?,
        Err(_) => SightlineConfig::default(),
    };
    apply_env_overrides(&mut config);
    config.interaction.validate()?;

    let script_path = std::env::var("SIGHTLINE_SCRIPT")
        .context("SIGHTLINE_SCRIPT is required (JSON-lines replay script)")?;

    let labels = match &config.replay.labels_path {
        Some(path) => LabelTable::from_file(path)?,
        None => LabelTable::coco(),
    };
    let script = Script::load(&script_path, &labels)?;

    info!(
        answer_url = %config.answer_service.url,
        script = %script_path,
        frames = script.len(),
        labels = labels.len(),
        "Configuration loaded"
    );

    let service = Arc::new(HttpAnswerService::new(&config.answer_service)?);
    let (frames, detector, keys) =
        script.into_devices(Duration::from_millis(config.replay.frame_interval_ms));

    let io = LoopIo {
        source: Box::new(frames),
        detector: Box::new(detector),
        display: Box::new(ConsoleDisplay::new(std::io::stdout())),
        keys: Box::new(keys),
        clock: Box::new(SystemClock),
    };
    let mut frame_loop = FrameLoop::new(&config, io, service, Handle::current());

    // Capture and display block; keep them off the async workers that serve
    // answer requests.
    let summary = tokio::task::spawn_blocking(move || frame_loop.run())
        .await
        .context("Frame loop task failed")?;

    match &summary.exit {
        LoopExit::CaptureFailed(reason) => {
            warn!(frames = summary.frames, reason = %reason, "Stopped on capture failure")
        }
        exit => info!(frames = summary.frames, exit = ?exit, "Sightline stopped"),
    }

    Ok(())
}
