// SPDX-License-Identifier: MIT OR Apache-2.0
//! `ColorNode` headless driver.
//!
//! Runs the color node graph once per frame the way an interactive editor
//! would: sample the clock, evaluate from the output node, show the color.
//! Here "show" means a log line per frame.
//!
//! Usage: `colornode [config.ron]`

mod config;
mod demo;

use colornode_graph::{ColorEditor, SystemClock};
use config::{ConfigError, DriverConfig};
use demo::SceneError;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Error that stops the driver
#[derive(Debug, thiserror::Error)]
enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build scene: {0}")]
    Scene(#[from] SceneError),
}

fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match &config_path {
        Some(path) => DriverConfig::load(path),
        None => Ok(DriverConfig::default()),
    };

    // Initialize logging before reporting config problems
    let log_filter = config
        .as_ref()
        .map_or_else(|_| DriverConfig::default().log_filter, |c| c.log_filter.clone());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ColorNode driver v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.map_err(DriverError::from).and_then(run) {
        tracing::error!("Driver failed: {e}");
        std::process::exit(1);
    }
}

fn run(config: DriverConfig) -> Result<(), DriverError> {
    tracing::debug!("Effective config:\n{}", config.to_ron()?);

    let mut editor = ColorEditor::new(config.editor.clone());
    let scene = demo::build_pulse_scene(&mut editor)?;
    tracing::info!("Output {} driven by clock {}", scene.output, scene.time);

    let clock = SystemClock::new();
    let interval = config.frame_interval();

    for _ in 0..config.frames {
        let color = editor.tick(&clock);
        tracing::info!(
            "frame {:>4}: #{:02x}{:02x}{:02x} (0x{:08x})",
            editor.frame(),
            color.r,
            color.g,
            color.b,
            color.to_rgba32()
        );
        std::thread::sleep(interval);
    }

    tracing::info!("Finished after {} frames", editor.frame());
    Ok(())
}
