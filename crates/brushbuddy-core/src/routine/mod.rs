mod catalog;
mod machine;

pub use catalog::{StepCatalog, StepDefinition};
pub use machine::{RoutineMachine, RoutineState, RoutineStatus};
