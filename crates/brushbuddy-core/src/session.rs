//! Routine session: setup + state machine + presentation adapter.
//!
//! The session is the inbound command surface. It checks the setup
//! precondition, forwards commands to the [`RoutineMachine`], and hands every
//! resulting event to the [`PresentationPort`]. Adapter failures are logged
//! and dropped so a broken speaker never stalls the countdown.

use tracing::{debug, warn};

use crate::error::RoutineError;
use crate::events::Event;
use crate::presentation::{PortResult, PresentationPort, Screen};
use crate::routine::{RoutineMachine, RoutineStatus, StepCatalog};
use crate::setup::Setup;

/// User-facing commands, as delivered to the [`Ticker`](crate::timer::Ticker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Pause,
    Resume,
    TogglePause,
    Skip,
    /// Leave the completion screen (or abort) and return to setup.
    Reset,
    /// End the driver loop. Sessions ignore it.
    Quit,
}

pub struct RoutineSession<P> {
    setup: Setup,
    machine: RoutineMachine,
    port: P,
}

impl<P: PresentationPort> RoutineSession<P> {
    pub fn new(catalog: StepCatalog, setup: Setup, port: P) -> Self {
        Self {
            setup,
            machine: RoutineMachine::new(catalog),
            port,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn setup(&self) -> &Setup {
        &self.setup
    }

    /// Selections may change at any time; they take effect on the next
    /// start or resume.
    pub fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }

    pub fn machine(&self) -> &RoutineMachine {
        &self.machine
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn status(&self) -> RoutineStatus {
        self.machine.status()
    }

    pub fn timer_generation(&self) -> u64 {
        self.machine.timer().generation()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn apply(&mut self, command: Command) -> Result<(), RoutineError> {
        match command {
            Command::Start => return self.start(),
            Command::Stop => self.stop(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePause => self.toggle_pause(),
            Command::Skip => self.skip(),
            Command::Reset => self.reset(),
            Command::Quit => {}
        }
        Ok(())
    }

    /// Start a fresh run. Requires a selected avatar.
    pub fn start(&mut self) -> Result<(), RoutineError> {
        if !self.setup.is_ready() {
            return Err(RoutineError::NoIdentitySelected);
        }
        let events = self.machine.start();
        if events.is_empty() {
            return Ok(());
        }
        let result = self.port.show_screen(Screen::Active);
        report("show_screen", result);
        self.play_audio();
        self.dispatch(&events);
        Ok(())
    }

    pub fn stop(&mut self) {
        let events = self.machine.stop();
        self.leave(&events);
    }

    pub fn reset(&mut self) {
        let events = self.machine.reset();
        self.leave(&events);
    }

    pub fn pause(&mut self) {
        let events = self.machine.pause();
        if !events.is_empty() {
            let result = self.port.pause_audio();
            report("pause_audio", result);
        }
        self.dispatch(&events);
    }

    pub fn resume(&mut self) {
        let events = self.machine.resume();
        if !events.is_empty() {
            self.play_audio();
        }
        self.dispatch(&events);
    }

    pub fn toggle_pause(&mut self) {
        match self.machine.status() {
            RoutineStatus::Running => self.pause(),
            RoutineStatus::Paused => self.resume(),
            _ => {}
        }
    }

    pub fn skip(&mut self) {
        let events = self.machine.skip();
        self.dispatch(&events);
    }

    /// Apply one elapsed timer period.
    pub fn tick(&mut self) {
        let events = self.machine.tick();
        self.dispatch(&events);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn leave(&mut self, events: &[Event]) {
        if events.is_empty() {
            return;
        }
        report("pause_audio", self.port.pause_audio());
        report("rewind_audio", self.port.rewind_audio());
        report("show_screen", self.port.show_screen(Screen::Setup));
        self.dispatch(events);
    }

    fn play_audio(&mut self) {
        match self.setup.audio() {
            Some(source) => report("play_audio", self.port.play_audio(source)),
            None => debug!("no audio source selected; skipping playback"),
        }
    }

    fn dispatch(&mut self, events: &[Event]) {
        for event in events {
            report(event.kind(), self.port.present(event, &self.setup));
            if matches!(event, Event::RoutineCompleted { .. }) {
                report("show_screen", self.port.show_screen(Screen::Completion));
            }
        }
    }
}

fn report(operation: &str, result: PortResult) {
    if let Err(e) = result {
        warn!(operation, error = %e, "presentation failure ignored");
    }
}
