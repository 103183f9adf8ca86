//! Countdown tick source.
//!
//! The engine owns no clock and no thread. A scheduler (see
//! [`Ticker`](super::Ticker)) calls [`TimerEngine::fire`] once per elapsed
//! period; the engine decides whether that period produces a tick.
//!
//! ## State Transitions
//!
//! ```text
//! Inactive -> Active <-> Paused -> Inactive
//! ```
//!
//! Pausing is logical: periods keep arriving but are dropped, not banked, so
//! resuming never releases a burst of catch-up ticks.

/// One effective period while the engine is active and not paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Generation of the run that produced this tick.
    pub generation: u64,
    /// 1-based count of ticks produced since the last `start()`.
    pub seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    active: bool,
    paused: bool,
    /// Bumped on every `start()`; lets the scheduler realign its period.
    generation: u64,
    ticks_fired: u64,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticks produced by the current run.
    pub fn ticks_fired(&self) -> u64 {
        self.ticks_fired
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the engine. Any previous run is dropped, never an error.
    pub fn start(&mut self) {
        self.active = true;
        self.paused = false;
        self.ticks_fired = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn pause(&mut self) {
        if self.active {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.active {
            self.paused = false;
        }
    }

    /// Stop emitting. No-op when already inactive.
    pub fn cancel(&mut self) {
        self.active = false;
        self.paused = false;
    }

    /// Called by the scheduler once per elapsed period.
    pub fn fire(&mut self) -> Option<Tick> {
        if !self.active || self.paused {
            return None;
        }
        self.ticks_fired += 1;
        Some(Tick {
            generation: self.generation,
            seq: self.ticks_fired,
        })
    }
}
