//! `kitsune`: desktop viewer for the kitsune experience.
//!
//! Opens a window with a `wgpu` renderer, loads the manifest's resources from disk
//! and runs the engine until the window closes. `--headless-frames` runs the same
//! engine against the in-memory backend instead, which needs no display.

mod gpu;
mod input;
mod loader;
mod panel;
mod render;
mod runtime;
mod startup;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use kitsune_engine::assets::Manifest;
use kitsune_engine::backend::headless::HeadlessSurface;
use kitsune_engine::config::{Config, EngineConfig};
use kitsune_engine::debug::DebugMode;
use kitsune_engine::logging::{init_logging, LoggingConfig};
use kitsune_engine::size::SizeSource;
use kitsune_engine::time::TimeSource;
use kitsune_engine::Engine;

use crate::gpu::GpuInit;
use crate::runtime::RuntimeConfig;
use crate::startup::{AssetSource, Startup};

const HEADLESS_FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Engine settings (`.ron` or `.toml`); defaults reproduce the shipped scene
    #[clap(long)]
    config: Option<PathBuf>,

    /// Resource manifest (`.ron` or `.toml`)
    #[clap(long)]
    manifest: Option<PathBuf>,

    /// Directory the manifest paths are relative to
    #[clap(long, default_value = "assets")]
    assets: PathBuf,

    /// Page location; a `#debug` fragment enables the debug panel
    #[clap(long)]
    location: Option<String>,

    /// Enable the debug panel
    #[clap(long)]
    debug: bool,

    /// Log filter, `env_logger` syntax (overrides RUST_LOG)
    #[clap(long)]
    log: Option<String>,

    /// Run this many frames without a window, then exit
    #[clap(long)]
    headless_frames: Option<u32>,

    /// Write the effective engine settings to this file and exit
    #[clap(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };

    if let Some(path) = &args.write_config {
        config.save_to_file(path)?;
        log::info!("settings written to {}", path.display());
        return Ok(());
    }

    let manifest = match &args.manifest {
        Some(path) => Manifest::load_from_file(path)?,
        None => Manifest::default_scene(),
    };

    let debug = if args.debug {
        DebugMode::enabled()
    } else {
        args.location
            .as_deref()
            .map(DebugMode::from_location)
            .unwrap_or_default()
    };

    let startup = Startup {
        config,
        manifest,
        assets: asset_source(&args.assets),
        debug,
    };
    log::debug!("{} sources, debug panel {}", startup.manifest.len(), debug.is_enabled());

    match args.headless_frames {
        Some(frames) => run_headless(&startup, frames),
        None => runtime::run(RuntimeConfig::default(), GpuInit::default(), startup),
    }
}

/// The asset directory, or the built-in stand-ins when it does not exist.
fn asset_source(dir: &Path) -> AssetSource {
    if dir.is_dir() {
        AssetSource::Directory(dir.to_path_buf())
    } else {
        log::warn!("asset directory {} not found, falling back to built-in assets", dir.display());
        AssetSource::Builtin
    }
}

fn run_headless(startup: &Startup, frames: u32) -> Result<()> {
    let mut surface = HeadlessSurface::new();
    let stats = surface.stats();

    let mut size = SizeSource::new(1280.0, 720.0, 1.0);
    let mut time = TimeSource::new().with_max_delta(startup.config.time.max_delta);

    let panel = startup.panel();
    let mut engine = Engine::new(&mut surface, &mut time, &mut size, startup.options(panel.as_ref()))
        .context("failed to start the experience")?;

    for _ in 0..frames {
        time.tick();
        engine.pump().context("frame failed")?;
        std::thread::sleep(HEADLESS_FRAME);
    }

    {
        let stats = stats.borrow();
        log::info!(
            "headless run: {} frames rendered, {} meshes and {} lights in the last one, world {}",
            stats.renders,
            stats.meshes_last_frame,
            stats.lights_last_frame,
            if engine.world_is_ready() { "ready" } else { "not ready" }
        );
    }

    engine.destroy();
    log::info!("{} scene resources released", stats.borrow().released.len());
    Ok(())
}
