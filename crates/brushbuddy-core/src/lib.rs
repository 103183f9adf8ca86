//! # BrushBuddy Core Library
//!
//! This library provides the core logic for BrushBuddy, a guided hair-brushing
//! routine with an avatar buddy. The CLI binary is a thin terminal adapter over
//! the same library.
//!
//! ## Architecture
//!
//! - **Step Catalog**: immutable, ordered list of timed steps
//! - **Timer Engine**: pull-based tick source with start/pause/resume/cancel
//! - **Routine State Machine**: sequences steps and emits transition events
//! - **Routine Session**: checks setup preconditions and forwards events to a
//!   presentation adapter
//! - **Ticker**: tokio driver that fires the timer once per period
//!
//! ## Key Components
//!
//! - [`RoutineMachine`]: Core routine state machine
//! - [`RoutineSession`]: Command surface used by front ends
//! - [`PresentationPort`]: Trait implemented by rendering adapters
//! - [`Config`]: Application configuration management

pub mod config;
pub mod error;
pub mod events;
pub mod presentation;
pub mod routine;
pub mod session;
pub mod setup;
pub mod timer;

pub use config::Config;
pub use error::{ConfigError, CoreError, PresentationError, RoutineError, ValidationError};
pub use events::Event;
pub use presentation::{
    AvatarAssets, AvatarImage, PresentationPort, ProgressRing, Screen, StepView,
};
pub use routine::{RoutineMachine, RoutineState, RoutineStatus, StepCatalog, StepDefinition};
pub use session::{Command, RoutineSession};
pub use setup::{AudioSource, Identity, Setup, Track, TRACKS};
pub use timer::{Ticker, TimerEngine};
