//! Domain models for taskpulse.
//!
//! - [`Task`]: a work item living in one of three status columns.
//! - [`DailyStat`]: a computed completion summary for one calendar date.
//! - [`Insight`]: an append-only log entry of a generated observation.
//! - [`AnalysisResult`]: the four categories of observations for a task list.

mod insight;
mod stats;
mod task;

pub use insight::*;
pub use stats::*;
pub use task::*;
