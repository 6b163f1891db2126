use crate::{config::Target, suite::RunnerError, suite::SuiteRunner};
use dbbench_analysis::BenchmarkResult;
use rayon::{prelude::*, ThreadPoolBuilder};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument, warn};

/// Run every target on a dedicated thread pool.
///
/// The outcomes are returned in target order once all targets are done, so
/// no partial result is visible before that.
#[instrument(skip_all, level = "info")]
pub fn execute(
    runner: &SuiteRunner<'_>,
    targets: &[Target],
    threads: Option<usize>,
) -> Vec<Result<BenchmarkResult, RunnerError>> {
    let thread_number = threads.unwrap_or_else(|| targets.len()).max(1);
    debug!("Starting thread pool with {thread_number} threads");

    // general counters to provide progress
    let total = targets.len() as u64;
    let processed = AtomicU64::new(0);

    let run = || {
        targets
            .par_iter()
            .enumerate()
            .map(|(slot, target)| {
                info!(target = %target.name, "Running benchmarks");
                let outcome = runner.run(slot, target);

                info!(
                    "Done with {}/{total}",
                    processed.fetch_add(1, Ordering::SeqCst) + 1
                );

                outcome
            })
            .collect::<Vec<_>>()
    };

    match ThreadPoolBuilder::new().num_threads(thread_number).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!("Failed to build thread pool, running on the global pool: {e}");
            run()
        }
    }
}
