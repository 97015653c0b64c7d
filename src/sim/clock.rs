//! Simulation clock
//!
//! Turns host frame callbacks into bounded deltas and owns the single
//! pending frame subscription. Nothing else may request or cancel frames.

use crate::platform::{FrameScheduler, TickHandle};

/// What the host's frame callback should do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// No subscription is pending (round ended or was cancelled)
    Stale,
    /// First frame of a round: timestamp recorded, nothing advanced
    Warmup,
    /// Advance the simulation by this many (capped) milliseconds
    Advance(f64),
}

#[derive(Debug, Clone)]
pub struct SimulationClock {
    max_delta_ms: f64,
    last_timestamp: Option<f64>,
    pending: Option<TickHandle>,
}

impl SimulationClock {
    pub fn new(max_delta_ms: f64) -> Self {
        Self {
            max_delta_ms,
            last_timestamp: None,
            pending: None,
        }
    }

    /// Begin a round: drop any earlier subscription and request the first frame
    pub fn start<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        self.cancel(scheduler);
        self.last_timestamp = None;
        self.pending = Some(scheduler.request_tick());
    }

    /// Consume the pending subscription for a delivered frame
    pub fn frame(&mut self, timestamp: f64) -> Frame {
        if self.pending.take().is_none() {
            return Frame::Stale;
        }

        match self.last_timestamp.replace(timestamp) {
            None => Frame::Warmup,
            Some(last) => Frame::Advance((timestamp - last).clamp(0.0, self.max_delta_ms)),
        }
    }

    /// Ask for the next frame once the current tick is fully processed
    pub fn schedule_next<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        debug_assert!(self.pending.is_none(), "frame already pending");
        self.pending = Some(scheduler.request_tick());
    }

    /// Cancel the pending subscription, if any
    pub fn cancel<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_tick(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualScheduler;

    #[test]
    fn test_first_frame_is_warmup() {
        let mut sched = ManualScheduler::default();
        let mut clock = SimulationClock::new(50.0);
        clock.start(&mut sched);
        assert_eq!(clock.frame(1000.0), Frame::Warmup);
        clock.schedule_next(&mut sched);
        assert_eq!(clock.frame(1016.0), Frame::Advance(16.0));
    }

    #[test]
    fn test_backgrounded_jump_is_capped() {
        let mut sched = ManualScheduler::default();
        let mut clock = SimulationClock::new(50.0);
        clock.start(&mut sched);
        clock.frame(0.0);
        clock.schedule_next(&mut sched);
        assert_eq!(clock.frame(5000.0), Frame::Advance(50.0));
    }

    #[test]
    fn test_cancel_makes_frames_stale() {
        let mut sched = ManualScheduler::default();
        let mut clock = SimulationClock::new(50.0);
        clock.start(&mut sched);
        clock.cancel(&mut sched);
        assert!(!clock.is_running());
        assert!(sched.pending().is_none());
        assert_eq!(sched.cancelled(), 1);
        assert_eq!(clock.frame(10.0), Frame::Stale);
    }

    #[test]
    fn test_restart_cancels_previous() {
        let mut sched = ManualScheduler::default();
        let mut clock = SimulationClock::new(50.0);
        clock.start(&mut sched);
        clock.start(&mut sched);
        assert_eq!(sched.requested(), 2);
        assert_eq!(sched.cancelled(), 1);
    }

    #[test]
    fn test_backwards_timestamp_clamps_to_zero() {
        let mut sched = ManualScheduler::default();
        let mut clock = SimulationClock::new(50.0);
        clock.start(&mut sched);
        clock.frame(100.0);
        clock.schedule_next(&mut sched);
        assert_eq!(clock.frame(90.0), Frame::Advance(0.0));
    }
}
