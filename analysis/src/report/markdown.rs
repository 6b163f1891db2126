use super::{write_artifact, ReportError, UNAVAILABLE};
use crate::{
    comparison::{Cell, Comparison},
    model::{BenchmarkResult, Status},
};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use std::{
    fmt::{self, Display},
    path::Path,
};

/// Markdown document mirroring the console tables
#[derive(Debug, Clone, Copy)]
pub struct MarkdownReport<'r> {
    pub results: &'r [BenchmarkResult],
    pub generated: DateTime<Utc>,
}

pub fn render(results: &[BenchmarkResult], generated: DateTime<Utc>) -> String {
    MarkdownReport { results, generated }.to_string()
}

impl Display for MarkdownReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Database Performance Benchmark Report\n")?;
        writeln!(f, "Generated: {}\n", self.generated.to_rfc3339())?;
        writeln!(f, "## Summary\n")?;
        writeln!(
            f,
            "This report compares {} database target(s) on a fixed suite of operations.\n",
            self.results.len()
        )?;

        for result in self.results {
            write_target(f, result)?;
        }

        if let Some(comparison) = Comparison::new(self.results) {
            write_comparison(f, &comparison)?;
        }

        Ok(())
    }
}

fn write_target(f: &mut fmt::Formatter<'_>, result: &BenchmarkResult) -> fmt::Result {
    writeln!(
        f,
        "## {} ({})\n",
        escape(&result.target_name),
        result.target_kind
    )?;
    writeln!(
        f,
        "| Test Name | Avg (ms) | Min (ms) | Max (ms) | Total (ms) | Throughput/s | Status |"
    )?;
    writeln!(
        f,
        "|-----------|----------|----------|----------|------------|--------------|--------|"
    )?;

    for outcome in result.outcomes() {
        match &outcome.status {
            Status::Success(timing) => writeln!(
                f,
                "| {} | {} | {} | {} | {} | {} | ✓ |",
                escape(&outcome.name),
                timing.avg_ms(),
                timing.min_ms(),
                timing.max_ms(),
                timing.total_ms(),
                timing.throughput_ops_per_sec
            )?,
            Status::Failure(error) => writeln!(
                f,
                "| {} | N/A | N/A | N/A | N/A | N/A | ✗ ({}) |",
                escape(&outcome.name),
                escape(error)
            )?,
        }
    }

    writeln!(f)
}

fn write_comparison(f: &mut fmt::Formatter<'_>, comparison: &Comparison<'_>) -> fmt::Result {
    writeln!(f, "## Performance Comparison\n")?;
    writeln!(
        f,
        "Average execution time in milliseconds (lower is better):\n"
    )?;
    writeln!(
        f,
        "| Test Name | {} |",
        comparison.targets().map(escape).join(" | ")
    )?;
    writeln!(
        f,
        "|-----------|{}",
        comparison.targets().map(|_| "-----------|").join("")
    )?;

    for row in comparison.rows() {
        let cells = row
            .cells
            .iter()
            .map(|cell| match cell {
                Cell::Average(_) => cell.avg_ms().unwrap_or_default().to_string(),
                Cell::Unavailable => UNAVAILABLE.to_owned(),
            })
            .join(" | ");

        writeln!(f, "| {} | {} |", escape(row.name), cells)?;
    }

    writeln!(f)
}

/// render with the current time as generation date and write to `path`
pub fn write(results: &[BenchmarkResult], path: &Path) -> Result<(), ReportError> {
    write_artifact(path, &render(results, Utc::now()))
}

/// keep free text from breaking the table layout
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
