//! Platform abstraction layer
//!
//! The simulation never assumes a frame rate. It asks the host for "the next
//! frame" through a `FrameScheduler` and is called back with a timestamp.
//! - Web: `requestAnimationFrame` / `cancelAnimationFrame`
//! - Native and tests: `ManualScheduler`, driven by hand

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Wall-clock time in Unix milliseconds (persisted timestamps)
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock time in Unix milliseconds (persisted timestamps)
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Opaque id of a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub i32);

/// Host primitive for per-frame callbacks
pub trait FrameScheduler {
    /// Request one callback on the next frame
    fn request_tick(&mut self) -> TickHandle;
    /// Cancel a request that has not fired yet
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// Scheduler whose frames are delivered by the caller
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    next_handle: i32,
    pending: Option<TickHandle>,
    requested: u32,
    cancelled: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that has not been delivered or cancelled
    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Deliver the pending request (the driver then calls the frame handler)
    pub fn take_pending(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }

    pub fn requested(&self) -> u32 {
        self.requested
    }

    pub fn cancelled(&self) -> u32 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_tick(&mut self) -> TickHandle {
        self.next_handle += 1;
        let handle = TickHandle(self.next_handle);
        self.pending = Some(handle);
        self.requested += 1;
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_roundtrip() {
        let mut sched = ManualScheduler::new();
        let a = sched.request_tick();
        assert_eq!(sched.pending(), Some(a));
        assert_eq!(sched.take_pending(), Some(a));
        assert!(sched.pending().is_none());

        let b = sched.request_tick();
        assert_ne!(a, b);
        sched.cancel_tick(b);
        assert!(sched.pending().is_none());
        assert_eq!(sched.requested(), 2);
        assert_eq!(sched.cancelled(), 1);
    }

    #[test]
    fn test_now_is_unix_millis() {
        // Later than 2020-01-01
        assert!(now_ms() > 1_577_836_800_000.0);
    }
}
