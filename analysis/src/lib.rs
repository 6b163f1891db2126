//! Result model, comparison and reporting for database benchmark runs.

pub mod comparison;
pub mod model;
pub mod report;
pub mod stats;

pub use comparison::{Cell, Comparison, ComparisonRow};
pub use model::{BackendKind, BenchmarkResult, OutcomeError, ScenarioOutcome, Status, UnsupportedBackend};
pub use report::ReportError;
pub use stats::{StatsError, TimingStats};
