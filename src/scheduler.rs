//! Tick and auto-start deadlines for the driver loop.
//!
//! The scheduler never reads the clock itself; every method takes the
//! current `Instant` so it can be driven deterministically in tests.

use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_secs(1);

/// Something the driver has to dispatch now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Due {
    Tick,
    AutoStart { token: u64 },
}

#[derive(Debug, Default)]
pub struct Scheduler {
    next_tick: Option<Instant>,
    auto_start: Option<(Instant, u64)>,
}

impl Scheduler {
    /// Arms the ticker one second ahead when the timer starts running and
    /// disarms it when it stops. An armed ticker keeps its phase.
    pub fn sync_ticking(&mut self, running: bool, now: Instant) {
        match (running, self.next_tick) {
            (true, None) => self.next_tick = Some(now + TICK),
            (false, Some(_)) => self.next_tick = None,
            _ => {}
        }
    }

    pub fn schedule_auto_start(&mut self, token: u64, delay: Duration, now: Instant) {
        self.auto_start = Some((now + delay, token));
    }

    pub fn cancel_auto_start(&mut self) {
        self.auto_start = None;
    }

    /// The earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        let auto = self.auto_start.map(|(at, _)| at);
        match (self.next_tick, auto) {
            (Some(tick), Some(auto)) => Some(tick.min(auto)),
            (tick, auto) => tick.or(auto),
        }
    }

    /// Pops the earliest deadline at or before `now`, with the instant it
    /// was due. Ticks win ties with an auto-start.
    ///
    /// Call repeatedly until it returns `None`. Deadlines armed while
    /// handling an earlier item are picked up by the same drain, so a late
    /// wakeup replays every missed second.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, Due)> {
        let tick = self.next_tick.filter(|at| *at <= now);
        let auto = self.auto_start.filter(|(at, _)| *at <= now);
        match (tick, auto) {
            (Some(at), Some((auto_at, _))) if at <= auto_at => self.take_tick(at),
            (Some(at), None) => self.take_tick(at),
            (_, Some((at, token))) => {
                self.auto_start = None;
                Some((at, Due::AutoStart { token }))
            }
            (None, None) => None,
        }
    }

    fn take_tick(&mut self, at: Instant) -> Option<(Instant, Due)> {
        self.next_tick = Some(at + TICK);
        Some((at, Due::Tick))
    }
}
