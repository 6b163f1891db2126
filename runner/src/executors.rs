mod parallel;

use crate::{config::Target, suite::RunnerError, suite::SuiteRunner};
use dbbench_analysis::BenchmarkResult;
use tracing::{error, info};

/// How the targets of a run are scheduled. Scenarios of one target always
/// run one after the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Executor {
    Sequential,
    /// targets spread over a dedicated thread pool, `None` uses one thread per target
    Parallel { threads: Option<usize> },
}

/// Everything a run produced, both lists keep the configured target order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<BenchmarkResult>,
    pub failures: Vec<(String, RunnerError)>,
}

impl RunSummary {
    /// split per target outcomes, `outcomes` must be in target order
    fn collect<I>(targets: &[Target], outcomes: I) -> Self
    where
        I: IntoIterator<Item = Result<BenchmarkResult, RunnerError>>,
    {
        let mut summary = Self::default();

        for (target, outcome) in targets.iter().zip(outcomes) {
            match outcome {
                Ok(result) => summary.results.push(result),
                Err(e) => {
                    error!(target = %target.name, "Benchmark failed: {e}");
                    summary.failures.push((target.name.clone(), e));
                }
            }
        }

        summary
    }
}

impl Executor {
    pub fn new(parallel: bool, threads: Option<usize>) -> Self {
        if parallel {
            Self::Parallel { threads }
        } else {
            Self::Sequential
        }
    }

    /// Benchmark every target. Failing targets are reported in the summary and
    /// never stop the remaining ones.
    pub fn execute(&self, runner: &SuiteRunner<'_>, targets: &[Target]) -> RunSummary {
        let summary = match self {
            Self::Sequential => RunSummary::collect(
                targets,
                targets.iter().enumerate().map(|(slot, target)| {
                    info!(target = %target.name, "Running benchmarks");
                    runner.run(slot, target)
                }),
            ),
            Self::Parallel { threads } => {
                RunSummary::collect(targets, parallel::execute(runner, targets, *threads))
            }
        };

        info!(
            succeeded = summary.results.len(),
            failed = summary.failures.len(),
            "Done with all targets"
        );

        summary
    }
}
