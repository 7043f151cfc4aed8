//! Frame clock: the per-tick driver.
//!
//! [`FrameClock`] turns whatever the host offers, native per-refresh
//! callbacks or a plain millisecond timer, into one uniform tick. On each tick
//! it writes the host timestamp into
//! [`WorldTime`](crate::resources::worldtime::WorldTime) and then runs the
//! registered game-loop callback.
//!
//! Submodules:
//! - [`frameclock`] – the clock, its modes and the per-tick context
//! - [`host`] – the scheduling collaborator trait and shared wake-up queue
//! - [`manual`] – virtual-time host for tests and headless simulation
//! - [`realtime`] – wall-clock host that sleeps between wake-ups

pub mod frameclock;
pub mod host;
pub mod manual;
pub mod realtime;

pub use frameclock::{ClockMode, FrameClock, Tick, TickCallback};
pub use host::{FrameHost, HostCapabilities, HostEvent, ScheduleHandle};
pub use manual::ManualHost;
pub use realtime::RealtimeHost;

/// Errors raised while starting the clock.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("host offers neither native frame callbacks nor timers")]
    NoScheduler,
}
