pub mod catalog;

use crate::{
    config::TableConfig,
    database::{ConnectionError, ConnectionPool, Session},
};
use dbbench_analysis::{ScenarioOutcome, TimingStats};
use std::{
    any::Any,
    panic::{catch_unwind, AssertUnwindSafe},
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// untimed step, e.g. creating and seeding the scenario table
pub type Step = fn(&mut Workload<'_>) -> Result<(), ConnectionError>;
/// step that receives the iteration index within the current round
pub type IterationStep = fn(&mut Workload<'_>, u32) -> Result<(), ConnectionError>;

/// Declarative description of one benchmark scenario.
///
/// For every round the `setup` runs once, then `iterations` timed calls of
/// `operation` follow, each optionally chased by an untimed `after_each`.
/// `teardown` runs once at the end, whether the scenario failed or not.
#[derive(Clone, Copy, Debug)]
pub struct Scenario {
    /// stable key of the outcome in a result
    pub key: &'static str,
    pub name: &'static str,
    /// base name of the working table, namespaced per run
    pub table: &'static str,
    pub rounds: u32,
    pub iterations: u32,
    /// logical operations used for the throughput
    pub throughput_iterations: u64,
    pub setup: Option<Step>,
    pub operation: IterationStep,
    pub after_each: Option<IterationStep>,
    pub teardown: Option<Step>,
}

/// Everything a scenario step may touch
pub struct Workload<'a> {
    pub pool: &'a ConnectionPool,
    pub session: &'a mut Session,
    table: String,
    iterations: u32,
}

impl Workload<'_> {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

/// Table naming for one run.
///
/// Isolated runs name tables `<prefix>_<run>_t<slot>_<table>`, where the slot
/// is the position of the target in the run, so targets sharing one physical
/// database never touch each other's tables. Without isolation tables are
/// plainly `<prefix>_<table>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
    run: Option<String>,
    slot: Option<usize>,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, run: Option<String>) -> Self {
        Self {
            prefix: prefix.into(),
            run,
            slot: None,
        }
    }

    /// the namespace of the target at position `slot` of the run
    pub fn for_target(&self, slot: usize) -> Self {
        Self {
            slot: self.run.as_ref().map(|_| slot),
            ..self.clone()
        }
    }

    pub fn from_config(config: &TableConfig) -> Self {
        let run = if config.isolate_runs {
            Some(config.run_id.clone().unwrap_or_else(random_run_id))
        } else {
            None
        };

        Self::new(config.prefix.clone(), run)
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run.as_deref()
    }

    pub fn table(&self, base: &str) -> String {
        match (&self.run, self.slot) {
            (Some(run), Some(slot)) => format!("{}_{run}_t{slot}_{base}", self.prefix),
            (Some(run), None) => format!("{}_{run}_{base}", self.prefix),
            (None, _) => format!("{}_{base}", self.prefix),
        }
    }
}

fn random_run_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// run a step, turning a panic into an error
fn guarded<F>(step: F) -> Result<(), ConnectionError>
where
    F: FnOnce() -> Result<(), ConnectionError>,
{
    catch_unwind(AssertUnwindSafe(step))
        .unwrap_or_else(|panic| Err(ConnectionError::Panic(panic_message(panic))))
}

impl Scenario {
    /// Execute the scenario on the suite's session. Never fails: every error,
    /// including a panic, ends up in the returned outcome.
    pub fn run(
        &self,
        pool: &ConnectionPool,
        session: &mut Session,
        namespace: &Namespace,
    ) -> ScenarioOutcome {
        info!(scenario = self.key, "Running {}", self.name);

        let mut workload = Workload {
            pool,
            session,
            table: namespace.table(self.table),
            iterations: self.iterations,
        };
        let mut samples = Vec::with_capacity((self.rounds * self.iterations) as usize);

        let measured = guarded(|| self.measure(&mut workload, &mut samples));

        if let Some(teardown) = self.teardown {
            if let Err(e) = guarded(|| teardown(&mut workload)) {
                warn!(scenario = self.key, table = workload.table(), "Cleanup failed: {e}");
            }
        }

        let timing = measured
            .map_err(|e| e.to_string())
            .and_then(|()| {
                TimingStats::from_samples(&samples, self.throughput_iterations)
                    .map_err(|e| e.to_string())
            });

        match timing {
            Ok(timing) => {
                info!(
                    scenario = self.key,
                    samples = timing.sample_count,
                    avg_ms = timing.avg_ms(),
                    throughput = timing.throughput_ops_per_sec,
                    "Finished {}",
                    self.name
                );

                ScenarioOutcome::success(self.key, self.name, timing)
            }
            Err(message) => {
                error!(scenario = self.key, "{} failed: {message}", self.name);

                ScenarioOutcome::failure(self.key, self.name, message)
            }
        }
    }

    fn measure(
        &self,
        workload: &mut Workload<'_>,
        samples: &mut Vec<Duration>,
    ) -> Result<(), ConnectionError> {
        for round in 0..self.rounds {
            if let Some(setup) = self.setup {
                setup(workload)?;
            }

            for iteration in 0..self.iterations {
                let start = Instant::now();
                (self.operation)(workload, iteration)?;
                samples.push(start.elapsed());

                if let Some(after_each) = self.after_each {
                    after_each(workload, iteration)?;
                }
            }

            debug!(scenario = self.key, round, "Round done");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_tables_carry_the_run_id() {
        let namespace = Namespace::new("bench", Some("a1b2c3d4".to_owned()));

        assert_eq!(namespace.table("select"), "bench_a1b2c3d4_select");
        assert_eq!(namespace.run_id(), Some("a1b2c3d4"));
    }

    #[test]
    fn targets_get_their_own_tables() {
        let namespace = Namespace::new("bench", Some("a1b2c3d4".to_owned()));

        assert_eq!(
            namespace.for_target(0).table("delete"),
            "bench_a1b2c3d4_t0_delete"
        );
        assert_ne!(
            namespace.for_target(0).table("delete"),
            namespace.for_target(1).table("delete")
        );
        assert_eq!(namespace.for_target(3).run_id(), Some("a1b2c3d4"));
    }

    #[test]
    fn shared_tables_match_plain_names() {
        let config = TableConfig {
            isolate_runs: false,
            ..TableConfig::default()
        };

        let namespace = Namespace::from_config(&config);
        assert_eq!(namespace.table("test"), "bench_test");
        assert_eq!(namespace.for_target(2).table("test"), "bench_test");
    }

    #[test]
    fn generated_run_ids_are_short_and_distinct() {
        let config = TableConfig::default();
        let first = Namespace::from_config(&config);
        let second = Namespace::from_config(&config);

        assert_eq!(first.run_id().map(str::len), Some(8));
        assert_ne!(first, second);
    }

    #[test]
    fn pinned_run_id_is_used() {
        let config = TableConfig {
            run_id: Some("nightly".to_owned()),
            ..TableConfig::default()
        };

        assert_eq!(
            Namespace::from_config(&config).for_target(1).table("update"),
            "bench_nightly_t1_update"
        );
    }

    #[test]
    fn panics_become_errors() {
        let result = guarded(|| panic!("driver exploded"));

        assert!(matches!(result, Err(ConnectionError::Panic(message)) if message == "driver exploded"));
    }
}
