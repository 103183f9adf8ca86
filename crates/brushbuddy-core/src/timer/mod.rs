mod engine;
mod ticker;

pub use engine::{Tick, TimerEngine};
pub use ticker::Ticker;
