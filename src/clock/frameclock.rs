use bevy_ecs::world::World;
use log::{debug, error, info, trace};

use super::host::{FrameHost, HostCapabilities, HostEvent, ScheduleHandle};
use super::ClockError;
use crate::systems::time::update_world_time;

/// Interval between fallback timer ticks, roughly one 60 Hz refresh.
pub const DEFAULT_FALLBACK_INTERVAL_MS: u32 = 16;

/// How the clock is being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// Host per-refresh callbacks; each tick requests the next one.
    NativeScheduler,
    /// Zero-delay first timer, then a fixed interval.
    TimerFallback,
}

/// Per-tick context handed to the callback.
pub struct Tick<'w> {
    world: &'w mut World,
    timestamp: f64,
    stop_requested: bool,
}

impl<'w> Tick<'w> {
    pub fn world(&mut self) -> &mut World {
        &mut *self.world
    }

    /// Timestamp of this tick in milliseconds, as written to `WorldTime.now`.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Stop the clock once this callback returns. No further tick fires
    /// until [`FrameClock::start`] runs again.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }
}

/// Game-loop callback run once per tick.
pub type TickCallback = Box<dyn FnMut(&mut Tick<'_>) -> anyhow::Result<()>>;

/// Uniform per-tick driver over native refresh callbacks or a timer.
///
/// The host is probed once, at construction. Each tick writes the timestamp
/// into [`WorldTime`](crate::resources::worldtime::WorldTime), runs the
/// callback, and schedules the next wake-up. The callback cannot tell which
/// mode is active.
pub struct FrameClock<H: FrameHost> {
    host: H,
    capabilities: HostCapabilities,
    fallback_interval_ms: u32,
    callback: Option<TickCallback>,
    mode: Option<ClockMode>,
    is_running: bool,
    pending: Option<ScheduleHandle>,
    tick_count: u64,
    failed_ticks: u64,
}

impl<H: FrameHost> FrameClock<H> {
    pub fn new(host: H, callback: Option<TickCallback>) -> Self {
        let capabilities = host.capabilities();
        debug!(
            "frame clock host: native frames {}, timers {}",
            capabilities.native_frames, capabilities.timers
        );
        Self {
            host,
            capabilities,
            fallback_interval_ms: DEFAULT_FALLBACK_INTERVAL_MS,
            callback,
            mode: None,
            is_running: false,
            pending: None,
            tick_count: 0,
            failed_ticks: 0,
        }
    }

    pub fn with_fallback_interval(mut self, interval_ms: u32) -> Self {
        self.fallback_interval_ms = interval_ms.max(1);
        self
    }

    /// Replace the callback without touching scheduling.
    pub fn set_callback(&mut self, callback: TickCallback) {
        self.callback = Some(callback);
    }

    /// Begin ticking, optionally with a new callback.
    ///
    /// Scheduling is rebuilt from scratch; a wake-up left from an earlier
    /// run is cancelled first.
    pub fn start(&mut self, callback: Option<TickCallback>) -> Result<(), ClockError> {
        let mode = if self.capabilities.native_frames {
            ClockMode::NativeScheduler
        } else if self.capabilities.timers {
            ClockMode::TimerFallback
        } else {
            return Err(ClockError::NoScheduler);
        };

        if let Some(callback) = callback {
            self.callback = Some(callback);
        }
        self.cancel_pending();

        self.mode = Some(mode);
        self.is_running = true;
        self.pending = Some(match mode {
            ClockMode::NativeScheduler => self.host.request_frame(),
            ClockMode::TimerFallback => self.host.set_timeout(0),
        });
        info!("frame clock started ({mode:?})");
        Ok(())
    }

    /// Cancel the scheduled tick and stop. Idempotent.
    pub fn stop(&mut self) {
        self.cancel_pending();
        if self.is_running {
            info!("frame clock stopped after {} ticks", self.tick_count);
        }
        self.is_running = false;
    }

    fn cancel_pending(&mut self) {
        let Some(handle) = self.pending.take() else {
            return;
        };
        match self.mode {
            Some(ClockMode::NativeScheduler) => self.host.cancel_frame(handle),
            Some(ClockMode::TimerFallback) => self.host.clear_timeout(handle),
            None => {}
        }
    }

    /// Handle one host wake-up. Returns `true` if it produced a tick.
    ///
    /// Wake-ups that are not the one the clock is waiting for (cancelled,
    /// superseded by a restart, or of the other mode) are ignored.
    pub fn dispatch(&mut self, event: HostEvent, world: &mut World) -> bool {
        let live = self.is_running
            && self.pending == Some(event.handle())
            && matches!(
                (self.mode, &event),
                (Some(ClockMode::NativeScheduler), HostEvent::Frame { .. })
                    | (Some(ClockMode::TimerFallback), HostEvent::Timeout { .. })
            );
        if !live {
            trace!("ignoring stale wake-up {:?}", event.handle());
            return false;
        }
        self.pending = None;

        let now = match event {
            HostEvent::Frame { timestamp, .. } => timestamp,
            HostEvent::Timeout { .. } => self.host.wall_clock_ms(),
        };
        update_world_time(world, now);
        self.tick_count += 1;

        let mut tick = Tick {
            world,
            timestamp: now,
            stop_requested: false,
        };
        if let Some(callback) = self.callback.as_mut() {
            if let Err(e) = callback(&mut tick) {
                self.failed_ticks += 1;
                error!("frame clock callback failed on tick {}: {e:#}", self.tick_count);
            }
        }

        if tick.stop_requested {
            self.stop();
        } else if self.is_running {
            self.pending = Some(match self.mode {
                Some(ClockMode::TimerFallback) => self.host.set_timeout(self.fallback_interval_ms),
                _ => self.host.request_frame(),
            });
        }
        true
    }

    /// Pump host wake-ups until the clock stops, the host has nothing left,
    /// or `max_ticks` ticks ran. Returns the number of ticks.
    pub fn run_for(&mut self, world: &mut World, max_ticks: u64) -> u64 {
        let mut ticks = 0;
        while self.is_running && ticks < max_ticks {
            let Some(event) = self.host.next_event() else {
                break;
            };
            if self.dispatch(event, world) {
                ticks += 1;
            }
        }
        ticks
    }

    /// Pump host wake-ups until the clock stops.
    pub fn run(&mut self, world: &mut World) -> u64 {
        self.run_for(world, u64::MAX)
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Mode picked by the last `start`, if any.
    pub fn mode(&self) -> Option<ClockMode> {
        self.mode
    }

    pub fn is_native(&self) -> bool {
        self.mode == Some(ClockMode::NativeScheduler)
    }

    pub fn is_fallback(&self) -> bool {
        self.mode == Some(ClockMode::TimerFallback)
    }

    pub fn is_using_set_timeout(&self) -> bool {
        self.is_fallback()
    }

    /// Legacy accessor kept with its historical truth table: it is `true`
    /// only in **timer fallback** mode, the opposite of what the name says.
    /// Use [`is_native`](Self::is_native) / [`is_fallback`](Self::is_fallback).
    pub fn is_using_raf(&self) -> bool {
        self.is_fallback()
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    pub fn fallback_interval_ms(&self) -> u32 {
        self.fallback_interval_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Ticks whose callback returned an error.
    pub fn failed_ticks(&self) -> u64 {
        self.failed_ticks
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
