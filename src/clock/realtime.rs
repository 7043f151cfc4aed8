//! Wall-clock host.
//!
//! [`RealtimeHost`] measures time with [`Instant`] from the moment it was
//! created and sleeps the calling thread until the next wake-up is due. Native
//! frames are only offered when a refresh rate is configured; they are then
//! paced on that rate's boundaries like a vsync'd display.

use std::thread;
use std::time::{Duration, Instant};

use super::host::{
    next_refresh_boundary, FrameHost, HostCapabilities, HostEvent, PendingKind, PendingQueue,
    ScheduleHandle,
};

#[derive(Debug)]
pub struct RealtimeHost {
    origin: Instant,
    refresh_interval_ms: Option<f64>,
    queue: PendingQueue,
}

impl Default for RealtimeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHost {
    /// Timer-only host.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            refresh_interval_ms: None,
            queue: PendingQueue::new(),
        }
    }

    /// Host that also offers native frames paced at `hz`.
    pub fn with_refresh_rate(mut self, hz: f64) -> Self {
        self.refresh_interval_ms = (hz.is_finite() && hz > 0.0).then(|| 1000.0 / hz);
        self
    }

    fn elapsed_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

impl FrameHost for RealtimeHost {
    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            native_frames: self.refresh_interval_ms.is_some(),
            timers: true,
        }
    }

    fn request_frame(&mut self) -> ScheduleHandle {
        let now = self.elapsed_ms();
        let due_at = match self.refresh_interval_ms {
            Some(interval) => next_refresh_boundary(now, interval),
            None => now,
        };
        self.queue.push(PendingKind::Frame, due_at)
    }

    fn cancel_frame(&mut self, handle: ScheduleHandle) {
        self.queue.cancel(handle, PendingKind::Frame);
    }

    fn set_timeout(&mut self, delay_ms: u32) -> ScheduleHandle {
        let due_at = self.elapsed_ms() + f64::from(delay_ms);
        self.queue.push(PendingKind::Timeout, due_at)
    }

    fn clear_timeout(&mut self, handle: ScheduleHandle) {
        self.queue.cancel(handle, PendingKind::Timeout);
    }

    fn wall_clock_ms(&self) -> f64 {
        self.elapsed_ms()
    }

    fn next_event(&mut self) -> Option<HostEvent> {
        let pending = self.queue.pop()?;
        let wait_ms = pending.due_at - self.elapsed_ms();
        if wait_ms > 0.0 {
            thread::sleep(Duration::from_secs_f64(wait_ms / 1000.0));
        }
        Some(match pending.kind {
            PendingKind::Frame => HostEvent::Frame {
                handle: pending.handle,
                timestamp: self.elapsed_ms(),
            },
            PendingKind::Timeout => HostEvent::Timeout {
                handle: pending.handle,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_frames_need_a_refresh_rate() {
        assert!(!RealtimeHost::new().capabilities().native_frames);
        assert!(RealtimeHost::new()
            .with_refresh_rate(120.0)
            .capabilities()
            .native_frames);
        assert!(!RealtimeHost::new()
            .with_refresh_rate(0.0)
            .capabilities()
            .native_frames);
    }

    #[test]
    fn timeout_waits_at_least_its_delay() {
        let mut host = RealtimeHost::new();
        let start = host.wall_clock_ms();
        let handle = host.set_timeout(5);

        assert_eq!(host.next_event(), Some(HostEvent::Timeout { handle }));
        assert!(host.wall_clock_ms() - start >= 5.0);
    }

    #[test]
    fn frame_timestamps_increase() {
        let mut host = RealtimeHost::new().with_refresh_rate(500.0);
        host.request_frame();
        let Some(HostEvent::Frame { timestamp: first, .. }) = host.next_event() else {
            panic!("expected a frame");
        };
        host.request_frame();
        let Some(HostEvent::Frame { timestamp: second, .. }) = host.next_event() else {
            panic!("expected a frame");
        };
        assert!(second > first);
    }

    #[test]
    fn uneven_refresh_rate_never_repeats_a_frame() {
        let mut host = RealtimeHost::new().with_refresh_rate(240.0);
        let mut last = -1.0;
        for _ in 0..20 {
            host.request_frame();
            let Some(HostEvent::Frame { timestamp, .. }) = host.next_event() else {
                panic!("expected a frame");
            };
            assert!(timestamp > last);
            last = timestamp;
        }
    }
}
