//! Deterministic virtual-time host.
//!
//! [`ManualHost`] never sleeps. Asking it for the next event jumps its clock
//! straight to the earliest due wake-up, which makes tick sequences exact and
//! repeatable. It backs the unit tests and the demo's simulated mode.

use super::host::{
    next_refresh_boundary, FrameHost, HostCapabilities, HostEvent, PendingKind, PendingQueue,
    ScheduleHandle,
};

/// Refresh period of a 60 Hz display in milliseconds.
pub const DEFAULT_REFRESH_INTERVAL_MS: f64 = 1000.0 / 60.0;

#[derive(Debug)]
pub struct ManualHost {
    now: f64,
    refresh_interval_ms: f64,
    capabilities: HostCapabilities,
    queue: PendingQueue,
    cancelled: Vec<ScheduleHandle>,
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHost {
    /// Host with native 60 Hz frames and timers.
    pub fn new() -> Self {
        Self {
            now: 0.0,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            capabilities: HostCapabilities {
                native_frames: true,
                timers: true,
            },
            queue: PendingQueue::new(),
            cancelled: Vec::new(),
        }
    }

    /// Host that only offers timers.
    pub fn timers_only() -> Self {
        Self::new().with_capabilities(HostCapabilities {
            native_frames: false,
            timers: true,
        })
    }

    pub fn with_capabilities(mut self, capabilities: HostCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_refresh_rate(mut self, hz: f64) -> Self {
        if hz.is_finite() && hz > 0.0 {
            self.refresh_interval_ms = 1000.0 / hz;
        }
        self
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move virtual time forward without delivering anything, as if the
    /// game spent `ms` inside a tick.
    pub fn advance(&mut self, ms: f64) {
        self.now += ms.max(0.0);
    }

    /// Number of wake-ups still scheduled.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest scheduled wake-up.
    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|p| p.due_at)
    }

    /// Handles cancelled so far, in order.
    pub fn cancelled(&self) -> &[ScheduleHandle] {
        &self.cancelled
    }

    fn next_refresh(&self) -> f64 {
        next_refresh_boundary(self.now, self.refresh_interval_ms)
    }
}

impl FrameHost for ManualHost {
    fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    fn request_frame(&mut self) -> ScheduleHandle {
        let due_at = self.next_refresh();
        self.queue.push(PendingKind::Frame, due_at)
    }

    fn cancel_frame(&mut self, handle: ScheduleHandle) {
        if self.queue.cancel(handle, PendingKind::Frame) {
            self.cancelled.push(handle);
        }
    }

    fn set_timeout(&mut self, delay_ms: u32) -> ScheduleHandle {
        let due_at = self.now + f64::from(delay_ms);
        self.queue.push(PendingKind::Timeout, due_at)
    }

    fn clear_timeout(&mut self, handle: ScheduleHandle) {
        if self.queue.cancel(handle, PendingKind::Timeout) {
            self.cancelled.push(handle);
        }
    }

    fn wall_clock_ms(&self) -> f64 {
        self.now
    }

    fn next_event(&mut self) -> Option<HostEvent> {
        let pending = self.queue.pop()?;
        self.now = self.now.max(pending.due_at);
        Some(match pending.kind {
            PendingKind::Frame => HostEvent::Frame {
                handle: pending.handle,
                timestamp: self.now,
            },
            PendingKind::Timeout => HostEvent::Timeout {
                handle: pending.handle,
            },
        })
    }
}
