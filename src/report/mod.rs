//! Final run result and its plain text rendering.
mod lines;
mod result;


pub use lines::summary_lines;
pub use result::{AuthOutcome, LoadTestResult, RunShape, assemble_result};
