//! Dynamic lighting simulation
//!
//! Drives the lighting engine for a fixed number of ticks without a window:
//! torches orbit around the origin, a beacon beam grows then disappears, and
//! a rotating camera decides which sections the culling scheduler rebuilds.
//! Halfway through, the other scheduler takes over.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p dynlight-sim -- [OPTIONS]
//! ```
//!
//! ## Options
//!
//! - `--ticks <N>`: Number of ticks to simulate (default: 200)
//! - `--lights <N>`: Number of orbiting torches (default: 32)
//! - `--config <PATH>`: Lighting config TOML file
//! - `--scheduler <MODE>`: `immediate` or `culling`, overrides the config
//! - `--mode <MODE>`: `off`, `fastest`, `fast` or `fancy`, overrides the config
//! - `-h, --help`: Print help message
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod camera;
mod scene;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use dynlight_core::{BlockPos, DynamicLightsMode, LightingConfig, SchedulerMode};
use dynlight_engine::DynamicLights;
use glam::DVec3;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::camera::Camera;
use crate::scene::{Beacon, OrbitingTorch, SimRenderer};

/// Yaw the camera turns by every tick, in radians.
const CAMERA_TURN_PER_TICK: f32 = 0.02;
/// Ticks between two growth steps of the beacon beam.
const BEACON_GROWTH_INTERVAL: u64 = 4;

/// Command line options.
#[derive(Debug)]
struct SimArgs {
    ticks: u64,
    lights: usize,
    config: Option<PathBuf>,
    scheduler: Option<SchedulerMode>,
    mode: Option<DynamicLightsMode>,
}

impl Default for SimArgs {
    fn default() -> Self {
        Self {
            ticks: 200,
            lights: 32,
            config: None,
            scheduler: None,
            mode: None,
        }
    }
}

impl SimArgs {
    /// Parse options from command line arguments.
    fn from_args() -> Self {
        let mut params = Self::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1);
            match (args[i].as_str(), value) {
                ("--ticks", Some(v)) => {
                    if let Ok(v) = v.parse() {
                        params.ticks = v;
                    }
                    i += 1;
                }
                ("--lights", Some(v)) => {
                    if let Ok(v) = v.parse() {
                        params.lights = v;
                    }
                    i += 1;
                }
                ("--config", Some(v)) => {
                    params.config = Some(PathBuf::from(v));
                    i += 1;
                }
                ("--scheduler", Some(v)) => {
                    params.scheduler = SchedulerMode::by_id(v);
                    i += 1;
                }
                ("--mode", Some(v)) => {
                    params.mode = DynamicLightsMode::by_id(v);
                    i += 1;
                }
                _ => {}
            }
            i += 1;
        }

        params
    }
}

fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = SimArgs::from_args();
    let mut config = match &args.config {
        Some(path) => LightingConfig::load(path)
            .with_context(|| format!("failed to load lighting config {}", path.display()))?,
        None => LightingConfig::default(),
    };
    if let Some(scheduler) = args.scheduler {
        config = config.with_scheduler(scheduler);
    }
    if let Some(mode) = args.mode {
        config = config.with_mode(mode);
    }

    run(&args, config)
}

fn run(args: &SimArgs, config: LightingConfig) -> anyhow::Result<()> {
    let mut camera = Camera::default();
    let renderer = SimRenderer::new(camera.frustum());
    let mut lights = DynamicLights::new(config, renderer.clone())?;

    let torches: Vec<Arc<OrbitingTorch>> = (0..args.lights)
        .map(|i| {
            let ring = (i % 4) as f64;
            OrbitingTorch::new(
                DVec3::new(0.0, 64.0 + ring * 4.0, 0.0),
                12.0 + ring * 10.0,
                0.01 + 0.005 * (i as f64 / args.lights.max(1) as f64),
                (8 + i % 8) as u8,
            )
        })
        .collect();
    for torch in &torches {
        lights.add_point_light(torch.clone());
    }

    let beacon = Beacon::new(BlockPos::new(24, 60, -24), 96);
    let beacon_id = lights.add_volume_light(beacon.clone());

    info!(
        "Simulating {} ticks with {} torches and a beacon",
        args.ticks,
        torches.len()
    );

    let reader = lights.reader();
    for tick in 0..args.ticks {
        camera.set_yaw(tick as f32 * CAMERA_TURN_PER_TICK);
        renderer.set_frustum(camera.frustum());

        for torch in &torches {
            torch.advance(tick);
        }
        if tick % BEACON_GROWTH_INTERVAL == 0 {
            beacon.grow(8);
        }

        if tick == args.ticks / 2 {
            let scheduler = lights.config().scheduler.next();
            info!("Switching to the {} scheduler", scheduler.name());
            lights.set_scheduler_mode(scheduler);
        }

        lights.on_start_tick();
        lights.on_end_tick();

        if tick % 20 == 0 {
            for line in lights.debug_lines() {
                debug!("{line}");
            }
            debug!(
                tick,
                beacon_tracked = lights.contains_light_source(beacon_id),
                level_near_orbit = reader.dynamic_light_level(BlockPos::new(12, 64, 0)),
                "Tick summary"
            );
        }
    }

    info!(
        "Done: {} section rebuilds, {} frustum tests culled",
        renderer.rebuilds(),
        renderer.culled_tests()
    );
    info!("{}", lights.diagnostics());

    Ok(())
}

fn print_help() {
    eprintln!(
        "Dynamic lighting headless simulation

USAGE:
    cargo run -p dynlight-sim -- [OPTIONS]

OPTIONS:
    --ticks <N>             Number of ticks to simulate (default: 200)
    --lights <N>            Number of orbiting torches (default: 32)
    --config <PATH>         Lighting config TOML file
    --scheduler <MODE>      immediate or culling, overrides the config
    --mode <MODE>           off, fastest, fast or fancy, overrides the config
    -h, --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
