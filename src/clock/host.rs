//! Host scheduling collaborator.
//!
//! The [`FrameClock`](super::FrameClock) never reaches into ambient global
//! state to find a scheduler. Everything it needs from the environment goes
//! through a [`FrameHost`]: a one-time capability probe, the native
//! per-refresh request/cancel pair, the millisecond timer pair, a wall-clock
//! read, and an event pump that reports which scheduled wake-up fired.
//!
//! Hosts do not store callbacks. A wake-up is identified by the
//! [`ScheduleHandle`] returned when it was scheduled; the clock compares that
//! handle against the one it is waiting for, so a wake-up cancelled or
//! superseded after it fired is recognized as stale and dropped.

use smallvec::SmallVec;

/// Opaque token for one scheduled wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Result of probing a host for scheduling primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostCapabilities {
    /// Per-refresh callbacks with a host-supplied timestamp.
    pub native_frames: bool,
    /// Millisecond-delay timers.
    pub timers: bool,
}

/// A scheduled wake-up that has come due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Native refresh callback; `timestamp` is the host's frame time in ms.
    Frame {
        handle: ScheduleHandle,
        timestamp: f64,
    },
    /// Timer expiry.
    Timeout { handle: ScheduleHandle },
}

impl HostEvent {
    pub fn handle(&self) -> ScheduleHandle {
        match self {
            HostEvent::Frame { handle, .. } | HostEvent::Timeout { handle } => *handle,
        }
    }
}

/// Scheduling primitives of the environment the clock runs in.
///
/// Methods for a capability the host does not report may be left unreachable;
/// the clock only calls what [`capabilities`](FrameHost::capabilities)
/// advertised.
pub trait FrameHost {
    fn capabilities(&self) -> HostCapabilities;

    /// Ask for one callback at the next display refresh.
    fn request_frame(&mut self) -> ScheduleHandle;

    fn cancel_frame(&mut self, handle: ScheduleHandle);

    /// Arm a one-shot timer `delay_ms` milliseconds from now.
    fn set_timeout(&mut self, delay_ms: u32) -> ScheduleHandle;

    fn clear_timeout(&mut self, handle: ScheduleHandle);

    /// Current wall-clock reading in milliseconds.
    fn wall_clock_ms(&self) -> f64;

    /// Block until the earliest scheduled wake-up is due and return it.
    /// `None` when nothing is scheduled.
    fn next_event(&mut self) -> Option<HostEvent>;
}

/// First refresh boundary strictly after `now` on a grid of `interval_ms`.
///
/// Boundaries are always `n * interval_ms` for an integer `n`. `now / interval_ms`
/// can round just below a boundary that `now` already sits on, so the index is
/// bumped until the result is in the future.
pub fn next_refresh_boundary(now: f64, interval_ms: f64) -> f64 {
    let mut n = (now / interval_ms).floor().max(0.0) as u64 + 1;
    while n as f64 * interval_ms <= now {
        n += 1;
    }
    n as f64 * interval_ms
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Frame,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pending {
    pub handle: ScheduleHandle,
    pub kind: PendingKind,
    pub due_at: f64,
}

/// Small ordered set of scheduled wake-ups shared by the bundled hosts.
///
/// Entries come out by due time; ties keep scheduling order. A running clock
/// has at most one entry outstanding, so this stays inline.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: SmallVec<[Pending; 4]>,
    next_handle: u64,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: PendingKind, due_at: f64) -> ScheduleHandle {
        self.next_handle += 1;
        let handle = ScheduleHandle(self.next_handle);
        let at = self
            .entries
            .iter()
            .position(|p| p.due_at > due_at)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            at,
            Pending {
                handle,
                kind,
                due_at,
            },
        );
        handle
    }

    /// Remove `handle` if it is still scheduled with `kind`.
    pub fn cancel(&mut self, handle: ScheduleHandle, kind: PendingKind) -> bool {
        match self
            .entries
            .iter()
            .position(|p| p.handle == handle && p.kind == kind)
        {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn peek(&self) -> Option<&Pending> {
        self.entries.first()
    }

    pub fn pop(&mut self) -> Option<Pending> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
