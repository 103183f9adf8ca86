//! Routine state machine.
//!
//! Sequences a [`StepCatalog`], drives a [`TimerEngine`] per step and returns
//! the events each transition produces. It performs no I/O and owns no clock:
//! the scheduler calls [`RoutineMachine::tick`] once per elapsed period.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Completed
//!           |           |
//!           +-- stop ---+--> Idle
//! ```
//!
//! Commands that do not apply in the current state are no-ops and return no
//! events.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{StepCatalog, StepDefinition};
use crate::events::Event;
use crate::timer::TimerEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

impl RoutineStatus {
    /// Running or paused.
    pub fn is_active(self) -> bool {
        matches!(self, RoutineStatus::Running | RoutineStatus::Paused)
    }
}

/// Per-run counters. Created at step 0 on start, dropped on stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineState {
    /// `catalog.len()` marks a completed routine.
    pub current_step_index: usize,
    pub time_remaining_secs: u32,
    /// Snapshot of the current step's duration; fixed for the whole step.
    pub total_duration_secs: u32,
    pub is_paused: bool,
    pub is_running: bool,
}

#[derive(Debug, Clone)]
pub struct RoutineMachine {
    catalog: StepCatalog,
    timer: TimerEngine,
    state: Option<RoutineState>,
}

impl RoutineMachine {
    pub fn new(catalog: StepCatalog) -> Self {
        Self {
            catalog,
            timer: TimerEngine::new(),
            state: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> RoutineStatus {
        match &self.state {
            None => RoutineStatus::Idle,
            Some(s) if s.current_step_index >= self.catalog.len() => RoutineStatus::Completed,
            Some(s) if s.is_paused => RoutineStatus::Paused,
            Some(_) => RoutineStatus::Running,
        }
    }

    pub fn state(&self) -> Option<&RoutineState> {
        self.state.as_ref()
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.state
            .as_ref()
            .and_then(|s| self.catalog.get(s.current_step_index))
    }

    /// `remaining / total` for the current step, 1.0 at step start.
    pub fn progress_fraction(&self) -> Option<f64> {
        let s = self.state.as_ref()?;
        if !s.is_running || s.total_duration_secs == 0 {
            return None;
        }
        Some(f64::from(s.time_remaining_secs) / f64::from(s.total_duration_secs))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let (step_index, remaining_secs, total_secs) = self
            .state
            .as_ref()
            .map(|s| {
                (
                    s.current_step_index,
                    s.time_remaining_secs,
                    s.total_duration_secs,
                )
            })
            .unwrap_or((0, 0, 0));
        Event::StateSnapshot {
            status: self.status(),
            step_index,
            step_count: self.catalog.len(),
            step_title: self.current_step().map(|s| s.title.clone()),
            remaining_secs,
            total_secs,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh run at step 0. Valid from `Idle` and `Completed`.
    pub fn start(&mut self) -> Vec<Event> {
        if self.status().is_active() {
            return Vec::new();
        }
        self.state = Some(RoutineState {
            current_step_index: 0,
            time_remaining_secs: 0,
            total_duration_secs: 0,
            is_paused: false,
            is_running: true,
        });
        debug!(steps = self.catalog.len(), "routine started");
        self.load_step(0)
    }

    /// Apply one elapsed period. Only has an effect while `Running`.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.status() != RoutineStatus::Running || self.timer.fire().is_none() {
            return Vec::new();
        }
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };

        state.time_remaining_secs = state.time_remaining_secs.saturating_sub(1);
        let mut events = vec![Event::Tick {
            remaining_secs: state.time_remaining_secs,
            total_secs: state.total_duration_secs,
            at: Utc::now(),
        }];

        if state.time_remaining_secs == 0 {
            self.timer.cancel();
            events.extend(self.advance());
        }
        events
    }

    pub fn pause(&mut self) -> Vec<Event> {
        if self.status() != RoutineStatus::Running {
            return Vec::new();
        }
        self.set_paused(true)
    }

    pub fn resume(&mut self) -> Vec<Event> {
        if self.status() != RoutineStatus::Paused {
            return Vec::new();
        }
        self.set_paused(false)
    }

    pub fn toggle_pause(&mut self) -> Vec<Event> {
        match self.status() {
            RoutineStatus::Running => self.pause(),
            RoutineStatus::Paused => self.resume(),
            _ => Vec::new(),
        }
    }

    /// Expire the current step immediately.
    pub fn skip(&mut self) -> Vec<Event> {
        if !self.status().is_active() {
            return Vec::new();
        }
        debug!(from = ?self.state.as_ref().map(|s| s.current_step_index), "step skipped");
        self.advance()
    }

    /// Abort an active run and return to `Idle`.
    pub fn stop(&mut self) -> Vec<Event> {
        if !self.status().is_active() {
            return Vec::new();
        }
        self.discard()
    }

    /// Like [`stop`](Self::stop), but also leaves the `Completed` screen.
    pub fn reset(&mut self) -> Vec<Event> {
        if self.status() == RoutineStatus::Idle {
            return Vec::new();
        }
        self.discard()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn discard(&mut self) -> Vec<Event> {
        self.timer.cancel();
        self.state = None;
        debug!("routine stopped");
        vec![Event::RoutineStopped { at: Utc::now() }]
    }

    fn set_paused(&mut self, paused: bool) -> Vec<Event> {
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };
        state.is_paused = paused;
        if paused {
            self.timer.pause();
        } else {
            self.timer.resume();
        }
        vec![Event::PausedChanged {
            is_paused: paused,
            at: Utc::now(),
        }]
    }

    fn advance(&mut self) -> Vec<Event> {
        let next = match &self.state {
            Some(s) => s.current_step_index + 1,
            None => return Vec::new(),
        };
        self.load_step(next)
    }

    fn load_step(&mut self, index: usize) -> Vec<Event> {
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };

        let Some(step) = self.catalog.get(index) else {
            self.timer.cancel();
            state.current_step_index = self.catalog.len();
            state.time_remaining_secs = 0;
            state.is_paused = false;
            state.is_running = false;
            debug!("routine completed");
            return vec![Event::RoutineCompleted { at: Utc::now() }];
        };

        state.current_step_index = index;
        state.total_duration_secs = step.duration_secs;
        state.time_remaining_secs = step.duration_secs;
        state.is_paused = false;
        self.timer.start();
        debug!(step = index, title = %step.title, secs = step.duration_secs, "step started");

        vec![Event::StepStarted {
            step_index: index,
            title: step.title.clone(),
            description: step.description.clone(),
            visual_stage: step.visual_stage,
            duration_secs: step.duration_secs,
            at: Utc::now(),
        }]
    }
}

impl Default for RoutineMachine {
    fn default() -> Self {
        Self::new(StepCatalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_catalog() -> StepCatalog {
        StepCatalog::new(vec![
            StepDefinition::new("one", "first", 2, 1),
            StepDefinition::new("two", "second", 3, 2),
        ])
        .unwrap()
    }

    fn tick_n(machine: &mut RoutineMachine, n: usize) -> Vec<Event> {
        (0..n).flat_map(|_| machine.tick()).collect()
    }

    #[test]
    fn starts_idle() {
        let machine = RoutineMachine::default();
        assert_eq!(machine.status(), RoutineStatus::Idle);
        assert!(machine.state().is_none());
        assert!(machine.progress_fraction().is_none());
    }

    #[test]
    fn start_emits_first_step() {
        let mut machine = RoutineMachine::new(short_catalog());
        let events = machine.start();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::StepStarted {
                step_index,
                title,
                visual_stage,
                duration_secs,
                ..
            } => {
                assert_eq!(*step_index, 0);
                assert_eq!(title, "one");
                assert_eq!(*visual_stage, 1);
                assert_eq!(*duration_secs, 2);
            }
            other => panic!("Expected StepStarted, got {other:?}"),
        }
        assert_eq!(machine.status(), RoutineStatus::Running);
        assert_eq!(machine.progress_fraction(), Some(1.0));
    }

    #[test]
    fn start_while_running_is_noop() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();
        machine.tick();
        assert!(machine.start().is_empty());
        assert_eq!(machine.state().unwrap().time_remaining_secs, 1);
    }

    #[test]
    fn tick_counts_down_and_advances() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();

        let events = machine.tick();
        assert!(matches!(
            events.as_slice(),
            [Event::Tick { remaining_secs: 1, total_secs: 2, .. }]
        ));

        let events = machine.tick();
        assert!(matches!(
            events.as_slice(),
            [
                Event::Tick { remaining_secs: 0, .. },
                Event::StepStarted { step_index: 1, .. }
            ]
        ));
        assert_eq!(machine.state().unwrap().time_remaining_secs, 3);
    }

    #[test]
    fn paused_ticks_are_dropped() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();
        let events = machine.pause();
        assert!(matches!(events.as_slice(), [Event::PausedChanged { is_paused: true, .. }]));
        assert_eq!(machine.status(), RoutineStatus::Paused);

        assert!(tick_n(&mut machine, 5).is_empty());
        assert_eq!(machine.state().unwrap().time_remaining_secs, 2);

        let events = machine.resume();
        assert!(matches!(events.as_slice(), [Event::PausedChanged { is_paused: false, .. }]));
        assert_eq!(machine.tick().len(), 1);
    }

    #[test]
    fn pause_and_resume_require_active_routine() {
        let mut machine = RoutineMachine::new(short_catalog());
        assert!(machine.pause().is_empty());
        assert!(machine.resume().is_empty());
        assert!(machine.toggle_pause().is_empty());
        machine.start();
        assert!(machine.resume().is_empty());
        assert_eq!(machine.toggle_pause().len(), 1);
        assert_eq!(machine.status(), RoutineStatus::Paused);
        assert!(machine.pause().is_empty());
    }

    #[test]
    fn skip_while_paused_starts_next_step_unpaused() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();
        machine.pause();
        let events = machine.skip();
        assert!(matches!(events.as_slice(), [Event::StepStarted { step_index: 1, .. }]));
        assert_eq!(machine.status(), RoutineStatus::Running);
        assert_eq!(machine.tick().len(), 1);
    }

    #[test]
    fn skip_last_step_completes() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();
        machine.skip();
        let events = machine.skip();
        assert!(matches!(events.as_slice(), [Event::RoutineCompleted { .. }]));
        assert_eq!(machine.status(), RoutineStatus::Completed);
        assert_eq!(machine.state().unwrap().current_step_index, 2);
        assert!(machine.current_step().is_none());
        assert!(!machine.timer().is_active());
        assert!(machine.skip().is_empty());
        assert!(machine.tick().is_empty());
    }

    #[test]
    fn stop_returns_to_idle_and_silences_ticks() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();
        machine.tick();
        let events = machine.stop();
        assert!(matches!(events.as_slice(), [Event::RoutineStopped { .. }]));
        assert_eq!(machine.status(), RoutineStatus::Idle);
        assert!(tick_n(&mut machine, 10).is_empty());
        assert!(machine.stop().is_empty());
    }

    #[test]
    fn stop_while_paused_returns_to_idle() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();
        machine.tick();
        machine.pause();
        assert_eq!(machine.status(), RoutineStatus::Paused);

        let events = machine.stop();
        assert!(matches!(events.as_slice(), [Event::RoutineStopped { .. }]));
        assert_eq!(machine.status(), RoutineStatus::Idle);
        assert!(machine.state().is_none());
        assert!(!machine.timer().is_active());
        assert!(tick_n(&mut machine, 10).is_empty());
        assert!(machine.resume().is_empty());
        assert!(machine.toggle_pause().is_empty());
        assert_eq!(machine.status(), RoutineStatus::Idle);
        assert!(tick_n(&mut machine, 3).is_empty());
    }

    #[test]
    fn stop_does_not_apply_to_completed_but_reset_does() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();
        machine.skip();
        machine.skip();
        assert!(machine.stop().is_empty());
        assert_eq!(machine.reset().len(), 1);
        assert_eq!(machine.status(), RoutineStatus::Idle);
        assert!(machine.reset().is_empty());
    }

    #[test]
    fn restart_after_completion_matches_first_run() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();
        let first = machine.state().cloned();
        tick_n(&mut machine, 5);
        assert_eq!(machine.status(), RoutineStatus::Completed);

        machine.start();
        assert_eq!(machine.state().cloned(), first);
        assert_eq!(machine.timer().ticks_fired(), 0);
    }

    #[test]
    fn snapshot_reports_status() {
        let mut machine = RoutineMachine::new(short_catalog());
        machine.start();
        machine.tick();
        match machine.snapshot() {
            Event::StateSnapshot {
                status,
                step_index,
                step_count,
                step_title,
                remaining_secs,
                total_secs,
                ..
            } => {
                assert_eq!(status, RoutineStatus::Running);
                assert_eq!(step_index, 0);
                assert_eq!(step_count, 2);
                assert_eq!(step_title.as_deref(), Some("one"));
                assert_eq!(remaining_secs, 1);
                assert_eq!(total_secs, 2);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
