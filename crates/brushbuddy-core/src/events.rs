use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::routine::RoutineStatus;

/// Every routine transition produces one or more Events.
/// The presentation layer renders them; nothing in the core reads them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StepStarted {
        step_index: usize,
        title: String,
        description: String,
        visual_stage: u8,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    Tick {
        remaining_secs: u32,
        total_secs: u32,
        at: DateTime<Utc>,
    },
    PausedChanged {
        is_paused: bool,
        at: DateTime<Utc>,
    },
    RoutineCompleted {
        at: DateTime<Utc>,
    },
    RoutineStopped {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: RoutineStatus,
        step_index: usize,
        step_count: usize,
        step_title: Option<String>,
        remaining_secs: u32,
        total_secs: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Stable snake_case name, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StepStarted { .. } => "step_started",
            Event::Tick { .. } => "tick",
            Event::PausedChanged { .. } => "paused_changed",
            Event::RoutineCompleted { .. } => "routine_completed",
            Event::RoutineStopped { .. } => "routine_stopped",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::Tick {
            remaining_secs: 12,
            total_secs: 30,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Tick");
        assert_eq!(json["remaining_secs"], 12);
        assert_eq!(event.kind(), "tick");
    }
}
