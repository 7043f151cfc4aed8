//! Flipbook main entry point.
//!
//! Headless driver for the frame clock and the animation player, built on:
//! - **bevy_ecs** for entity-component-system architecture
//! - **configparser** for the INI configuration
//! - **env_logger** + **log** for diagnostics
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (defaults when missing) and initialize logging
//! 2. Build the ECS world and its resources
//! 3. Set up the demo scene: frame tables, animations, observers, the hero
//! 4. Start a [`FrameClock`] over the chosen host; each tick:
//!    - writes the host timestamp into `WorldTime`
//!    - runs the update schedule (animation, sprite sizing)
//! 5. Stop after the requested number of ticks
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --ticks 120 --timer
//! ```

mod clock;
mod components;
mod events;
mod game;
mod resources;
mod systems;

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;

use crate::clock::{FrameClock, FrameHost, ManualHost, RealtimeHost, Tick};
use crate::components::animation::FrameSequencePlayer;
use crate::resources::animationstore::AnimationStore;
use crate::resources::framestore::FrameStore;
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::WorldTime;

/// Flipbook frame clock and animation demo
#[derive(Parser)]
#[command(version, about = "Drives a frame-sequence animation from a frame clock.")]
struct Cli {
    /// Path of the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Number of ticks to run before stopping.
    #[arg(long, default_value_t = 120)]
    ticks: u64,

    /// Force the timer fallback even if native frames are available.
    #[arg(long)]
    timer: bool,

    /// Pace ticks against the wall clock instead of virtual time.
    #[arg(long)]
    realtime: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    let loaded = config.load_from_file();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    if let Err(e) = loaded {
        log::warn!("{e}; using defaults");
    }
    log::info!("Hello, world! This is Flipbook!");

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(1.0));
    world.insert_resource(FrameStore::new());
    world.insert_resource(AnimationStore::new());

    let hero = game::setup(&mut world, &config);

    let native = config.native && !cli.timer;
    let fallback_interval = config.fallback_interval_ms;
    let refresh_hz = config.refresh_hz as f64;
    world.insert_resource(config);

    // --------------- Frame clock ---------------
    let ticks = if cli.realtime {
        let host = if native {
            RealtimeHost::new().with_refresh_rate(refresh_hz)
        } else {
            RealtimeHost::new()
        };
        run_demo(host, fallback_interval, &mut world, cli.ticks)
    } else {
        let host = if native {
            ManualHost::new().with_refresh_rate(refresh_hz)
        } else {
            ManualHost::timers_only()
        };
        run_demo(host, fallback_interval, &mut world, cli.ticks)
    };

    let time = world.resource::<WorldTime>();
    log::info!(
        "ran {} ticks, world time {:.1} ms, {} frames",
        ticks,
        time.now,
        time.frame_count
    );
    if let Some(player) = world.get::<FrameSequencePlayer>(hero) {
        log::info!(
            "hero ended on '{}' frame {} ({} frames)",
            player.name(),
            player.frame(),
            player.frame_total()
        );
    }
}

/// Drive the update schedule from a clock over `host` for `max_ticks` ticks.
fn run_demo<H: FrameHost>(host: H, fallback_interval_ms: u32, world: &mut World, max_ticks: u64) -> u64 {
    let mut update = game::update_schedule();
    let mut remaining = max_ticks;

    let mut clock = FrameClock::new(host, None).with_fallback_interval(fallback_interval_ms);
    let started = clock.start(Some(Box::new(move |tick: &mut Tick<'_>| {
        update.run(tick.world());
        tick.world().clear_trackers();
        remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            tick.request_stop();
        }
        Ok(())
    })));
    if let Err(e) = started {
        log::error!("cannot start frame clock: {e}");
        return 0;
    }
    log::info!("clock mode: {:?}", clock.mode());

    let ticks = clock.run(world);
    if clock.failed_ticks() > 0 {
        log::warn!("{} ticks failed", clock.failed_ticks());
    }
    ticks
}
