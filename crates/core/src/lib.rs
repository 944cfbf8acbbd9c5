#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod model;
pub mod time;

pub use engine::{CompletionPolicy, DayCompletionStatus};
pub use error::Error;
pub use time::Clock;
