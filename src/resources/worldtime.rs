use bevy_ecs::prelude::Resource;

/// Shared time authority.
///
/// `now` is the host timestamp of the latest tick in milliseconds. It never
/// goes backwards and is not affected by `time_scale`; animation players
/// compare their due times against it. `elapsed` and `delta` are in seconds
/// and scaled.
#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    pub now: f64,
    pub elapsed: f32,
    pub delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            now: 0.0,
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
