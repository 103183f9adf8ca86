//! Real-time driver for a [`RoutineSession`].
//!
//! One task owns the session and `select!`s between the period clock and the
//! user's command channel, so every transition happens on a single logical
//! thread. Whenever the session restarts its timer (a new step, a restart)
//! the period is realigned so the new step gets a full first second.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::presentation::PresentationPort;
use crate::routine::RoutineStatus;
use crate::session::{Command, RoutineSession};

#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    period: Duration,
    exit_on_complete: bool,
}

impl Ticker {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    /// A zero period is clamped to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            exit_on_complete: false,
        }
    }

    /// Return as soon as the routine reaches `Completed`.
    pub fn exit_on_complete(mut self, exit: bool) -> Self {
        self.exit_on_complete = exit;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Drive `session` until [`Command::Quit`] arrives.
    ///
    /// Dropping every sender only ends user input: a running routine keeps
    /// ticking until it completes. With no input left, an idle, paused or
    /// completed session ends the loop since nothing could change it.
    pub async fn run<P: PresentationPort>(
        &self,
        session: &mut RoutineSession<P>,
        mut commands: mpsc::Receiver<Command>,
    ) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;
        interval.reset();

        let mut generation = session.timer_generation();
        let mut input_open = true;
        loop {
            tokio::select! {
                biased;

                command = commands.recv(), if input_open => match command {
                    Some(Command::Quit) => break,
                    None => {
                        debug!("command channel closed");
                        input_open = false;
                    }
                    Some(command) => {
                        debug!(?command, "command received");
                        if let Err(e) = session.apply(command) {
                            warn!(?command, error = %e, "command rejected");
                        }
                    }
                },

                _ = interval.tick() => session.tick(),
            }

            let current = session.timer_generation();
            if current != generation {
                generation = current;
                interval.reset();
            }

            let status = session.status();
            if status == RoutineStatus::Completed && self.exit_on_complete {
                break;
            }
            if !input_open && status != RoutineStatus::Running {
                break;
            }
        }
        debug!("ticker stopped");
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}
