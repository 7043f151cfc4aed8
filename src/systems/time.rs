//! Time update system.
//!
//! Feeds a host timestamp into the shared
//! [`WorldTime`](crate::resources::worldtime::WorldTime) resource. The
//! [`FrameClock`](crate::clock::FrameClock) calls this once per tick, before
//! the game-loop callback runs.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance `WorldTime` to the host timestamp `now_ms`.
///
/// A timestamp older than the current `now` is clamped so `now` stays
/// monotonic; that tick then has a zero delta. `delta` and `elapsed` are
/// scaled by `time_scale`. The resource is inserted with defaults if missing.
pub fn update_world_time(world: &mut World, now_ms: f64) {
    let mut wt = world.get_resource_or_insert_with(WorldTime::default);
    let now = now_ms.max(wt.now);
    let dt = ((now - wt.now) / 1000.0) as f32;
    let scaled_dt = dt * wt.time_scale;
    wt.now = now;
    wt.delta = scaled_dt;
    wt.elapsed += scaled_dt;
    wt.frame_count += 1;
}
