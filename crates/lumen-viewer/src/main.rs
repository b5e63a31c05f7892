mod pattern;
mod viewer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use lumen_engine::coords::FrameSize;
use lumen_engine::device::GpuInit;
use lumen_engine::handoff::frame_slot;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::render::screen::{PresenterConfig, ScalingPolicy};
use lumen_engine::window::{Runtime, RuntimeConfig};

use viewer::Viewer;

/// Environment variable selecting the scaling policy (`stretch`, `letterbox`, `integer`).
const SCALING_VAR: &str = "LUMEN_SCALING";

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let scaling = match std::env::var(SCALING_VAR) {
        Ok(name) => name
            .parse::<ScalingPolicy>()
            .with_context(|| format!("invalid {SCALING_VAR}"))?,
        Err(_) => ScalingPolicy::default(),
    };

    let resolution = FrameSize::DMG;
    let (producer, consumer) = frame_slot(resolution);
    let running = Arc::new(AtomicBool::new(true));
    let emulator = pattern::spawn(producer, Arc::clone(&running))?;

    let title = "lumen".to_string();
    let config = RuntimeConfig {
        title: title.clone(),
        initial_size: LogicalSize::new(
            resolution.width as f64 * 3.0,
            resolution.height as f64 * 3.0,
        ),
        min_size: Some(LogicalSize::new(
            resolution.width as f64,
            resolution.height as f64,
        )),
        ..RuntimeConfig::default()
    };

    let viewer = Viewer::new(
        title,
        resolution,
        PresenterConfig {
            scaling,
            ..PresenterConfig::default()
        },
        consumer,
        Arc::clone(&running),
    );

    let result = Runtime::run(config, GpuInit::default(), viewer);

    running.store(false, Ordering::Release);
    if emulator.join().is_err() {
        log::error!("emulator thread panicked");
    }

    result
}
