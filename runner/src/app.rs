use crate::{
    config::{BenchConfig, ConfigErrors},
    executors::Executor,
    scenario::Namespace,
    suite::SuiteRunner,
};
use dbbench_analysis::report::{self, console, json, markdown};
use itertools::Itertools;
use std::{
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{error, info, warn};

/// Process exit status, every fatal condition has its own code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Success = 0,
    ConfigLoad = 2,
    NoTargets = 3,
    NoResults = 4,
    ReportWrite = 5,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status as u8)
    }
}

/// Overrides of the output section given on the command line
#[derive(Clone, Debug, Default)]
pub struct OutputOverrides {
    pub directory: Option<PathBuf>,
    pub skip_json: bool,
    pub skip_markdown: bool,
}

/// Load the configuration at `path` and benchmark it, see [`run`]
pub fn load_and_run(
    path: &PathBuf,
    executor: Executor,
    overrides: OutputOverrides,
    console_out: &mut impl Write,
) -> Status {
    match BenchConfig::load(path) {
        Ok(config) => run(config, executor, overrides, console_out),
        Err(e) => {
            error!("{e}");
            Status::ConfigLoad
        }
    }
}

/// Benchmark every valid target of `config`, print the console report to
/// `console_out` and write the report artifacts.
pub fn run(
    mut config: BenchConfig,
    executor: Executor,
    overrides: OutputOverrides,
    console_out: &mut impl Write,
) -> Status {
    if config.targets.is_empty() {
        error!("{}", ConfigErrors::NoTargets);
        return Status::NoTargets;
    }

    if config.preflight_checks() {
        error!("{}", ConfigErrors::Preflight);
        return Status::ConfigLoad;
    }

    let (targets, invalid) = config.resolve_targets();
    if targets.is_empty() {
        error!("None of the {} configured targets is valid", invalid.len());
        return Status::ConfigLoad;
    }

    if let Some(directory) = overrides.directory {
        config.output.directory = directory;
    }
    config.output.json &= !overrides.skip_json;
    config.output.markdown &= !overrides.skip_markdown;

    let namespace = Namespace::from_config(&config.tables);
    info!(
        targets = targets.len(),
        run = namespace.run_id(),
        "Starting database performance benchmarks"
    );

    let runner = SuiteRunner::new(namespace, config.pool.clone());
    let summary = executor.execute(&runner, &targets);

    if !summary.failures.is_empty() || !invalid.is_empty() {
        let skipped = invalid.iter().filter_map(|e| match e {
            ConfigErrors::InvalidConfiguration { target, .. } => Some(target.as_str()),
            _ => None,
        });

        warn!(
            "No results for: {}",
            summary
                .failures
                .iter()
                .map(|(name, _)| name.as_str())
                .chain(skipped)
                .join(", ")
        );
    }

    if summary.results.is_empty() {
        error!("No benchmark results were produced");
        return Status::NoResults;
    }

    if let Err(e) = writeln!(console_out, "{}", console::render(&summary.results)) {
        warn!("Failed to print the console report: {e}");
    }

    let written = report::write_all(
        &summary.results,
        &config.output.directory,
        config.output.json,
        config.output.markdown,
    );

    if written.iter().any(Result::is_err) {
        Status::ReportWrite
    } else {
        info!("Benchmark completed successfully");
        Status::Success
    }
}

/// Render the reports of an earlier run from its JSON results
pub fn rerender(
    results: &Path,
    markdown_path: Option<&Path>,
    console_out: &mut impl Write,
) -> Status {
    let results = match json::read(results) {
        Ok(results) => results,
        Err(e) => {
            error!("{e}");
            return Status::ConfigLoad;
        }
    };

    if results.is_empty() {
        error!("The results file contains no benchmark results");
        return Status::NoResults;
    }

    if let Err(e) = writeln!(console_out, "{}", console::render(&results)) {
        warn!("Failed to print the console report: {e}");
    }

    match markdown_path.map(|path| markdown::write(&results, path)) {
        Some(Err(e)) => {
            error!("{e}");
            Status::ReportWrite
        }
        _ => Status::Success,
    }
}
