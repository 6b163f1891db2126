use super::UNAVAILABLE;
use crate::{
    comparison::Comparison,
    model::{BenchmarkResult, Status},
};
use std::fmt::{self, Display};

const WIDTH: usize = 100;

/// Tabular console summary, followed by the comparison table when there are
/// at least two results.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReport<'r>(pub &'r [BenchmarkResult]);

pub fn render(results: &[BenchmarkResult]) -> String {
    ConsoleReport(results).to_string()
}

impl Display for ConsoleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(WIDTH);
        let light = "-".repeat(WIDTH);

        writeln!(f, "\n{heavy}")?;
        writeln!(f, "Database Performance Benchmark Report")?;
        writeln!(f, "{heavy}")?;

        for result in self.0 {
            writeln!(f, "\n{light}")?;
            writeln!(f, "Database: {} ({})", result.target_name, result.target_kind)?;
            writeln!(f, "{light}")?;
            writeln!(
                f,
                "{:<25} {:>10} {:>10} {:>10} {:>10} {:>15} {:>10}",
                "Test Name", "Avg (ms)", "Min (ms)", "Max (ms)", "Total (ms)", "Throughput/s", "Status"
            )?;
            writeln!(f, "{light}")?;

            for outcome in result.outcomes() {
                match &outcome.status {
                    Status::Success(timing) => writeln!(
                        f,
                        "{:<25} {:>10} {:>10} {:>10} {:>10} {:>15} {:>10}",
                        outcome.name,
                        timing.avg_ms(),
                        timing.min_ms(),
                        timing.max_ms(),
                        timing.total_ms(),
                        timing.throughput_ops_per_sec,
                        "SUCCESS"
                    )?,
                    Status::Failure(error) => writeln!(
                        f,
                        "{:<25} {:>10} {:>10} {:>10} {:>10} {:>15} {:>10}",
                        outcome.name,
                        "N/A",
                        "N/A",
                        "N/A",
                        "N/A",
                        "N/A",
                        format!("FAILED: {error}")
                    )?,
                }
            }
        }

        writeln!(f, "\n{heavy}")?;
        if let Some(comparison) = Comparison::new(self.0) {
            write_comparison(f, &comparison)?;
        }
        writeln!(f, "{heavy}")
    }
}

fn write_comparison(f: &mut fmt::Formatter<'_>, comparison: &Comparison<'_>) -> fmt::Result {
    let light = "-".repeat(WIDTH);

    writeln!(
        f,
        "\nPerformance Comparison (Average Time in ms - Lower is Better)"
    )?;
    writeln!(f, "{light}")?;

    write!(f, "{:<25}", "Test Name")?;
    for target in comparison.targets() {
        write!(f, " {target:>20}")?;
    }
    writeln!(f)?;
    writeln!(f, "{light}")?;

    for row in comparison.rows() {
        write!(f, "{:<25}", row.name)?;
        for cell in row.cells {
            match cell.avg_ms() {
                Some(avg_ms) => write!(f, " {avg_ms:>20}")?,
                None => write!(f, " {UNAVAILABLE:>20}")?,
            }
        }
        writeln!(f)?;
    }

    Ok(())
}
