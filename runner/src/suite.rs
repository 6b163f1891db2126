use crate::{
    config::{PoolConfig, Target},
    database::{ConnectionError, ConnectionPool},
    scenario::{catalog::catalog, Namespace, Scenario},
};
use dbbench_analysis::BenchmarkResult;
use thiserror::Error;
use tracing::{info, instrument};

/// Target level failures, scenario failures never leave the runner
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(ConnectionError),
    #[error("Target unavailable: {0}")]
    TargetUnavailable(ConnectionError),
}

/// Runs an ordered list of scenarios against one target at a time
#[derive(Clone, Debug)]
pub struct SuiteRunner<'c> {
    scenarios: &'c [Scenario],
    namespace: Namespace,
    pool: PoolConfig,
}

impl SuiteRunner<'static> {
    /// runner over the fixed benchmark catalog
    pub fn new(namespace: Namespace, pool: PoolConfig) -> Self {
        Self::with_scenarios(catalog(), namespace, pool)
    }
}

impl<'c> SuiteRunner<'c> {
    pub fn with_scenarios(scenarios: &'c [Scenario], namespace: Namespace, pool: PoolConfig) -> Self {
        Self {
            scenarios,
            namespace,
            pool,
        }
    }

    /// Open the target's own pool and run the whole suite on it. `slot` is
    /// the position of the target in the run and keeps its tables apart.
    #[instrument(skip_all, fields(target = %target.name))]
    pub fn run(&self, slot: usize, target: &Target) -> Result<BenchmarkResult, RunnerError> {
        let pool = ConnectionPool::open(target, &self.pool).map_err(RunnerError::InvalidConfiguration)?;

        self.run_with_pool(slot, target, &pool)
    }

    /// Run every scenario in order on one connection checked out for the whole
    /// suite. Fails only if that connection cannot be acquired.
    pub fn run_with_pool(
        &self,
        slot: usize,
        target: &Target,
        pool: &ConnectionPool,
    ) -> Result<BenchmarkResult, RunnerError> {
        let namespace = self.namespace.for_target(slot);
        info!(kind = %target.kind, run = namespace.run_id(), slot, "Starting suite");

        let mut session = pool.acquire().map_err(RunnerError::TargetUnavailable)?;
        let mut result = BenchmarkResult::new(target.name.clone(), target.kind);

        for scenario in self.scenarios {
            result.insert(scenario.run(pool, &mut session, &namespace));
        }

        info!(
            scenarios = result.len(),
            failed = result.failures(),
            "Suite finished"
        );

        Ok(result)
    }
}
