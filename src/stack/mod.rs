//! The resolution stack: pending choices and their completion callbacks.

mod callback;
mod step;

pub use callback::CompletionCallback;
pub use step::{ResolutionStep, StepHeader};
