mod app;
mod config;
mod database;
mod executors;
mod scenario;
mod suite;

#[cfg(test)]
mod app_test;

use app::OutputOverrides;
use clap::{Parser, Subcommand};
use executors::Executor;
use std::{io, path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dbbench", version)]
#[command(about = "Benchmark a fixed suite of SQL workloads against MySQL, MariaDB, PostgreSQL and SQLite")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the benchmark suite against every configured target
    Run {
        /// YAML configuration with the targets to benchmark
        #[arg(short, long, default_value = "dbbench.yaml")]
        config: PathBuf,

        /// Benchmark independent targets concurrently
        #[arg(long)]
        parallel: bool,

        /// Worker threads for --parallel, defaults to one per target
        #[arg(long, requires = "parallel")]
        threads: Option<usize>,

        /// Directory for the report files, overrides output.directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Do not write the JSON results
        #[arg(long)]
        no_json: bool,

        /// Do not write the Markdown report
        #[arg(long)]
        no_markdown: bool,
    },
    /// Render the reports of an earlier run from its JSON results
    Report {
        /// JSON results written by `dbbench run`
        #[arg(short, long)]
        results: PathBuf,

        /// Also write a Markdown report to this path
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },
}

fn init_tracing() {
    // stdout is reserved for the console report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let status = match Cli::parse().command {
        Command::Run {
            config,
            parallel,
            threads,
            output_dir,
            no_json,
            no_markdown,
        } => app::load_and_run(
            &config,
            Executor::new(parallel, threads),
            OutputOverrides {
                directory: output_dir,
                skip_json: no_json,
                skip_markdown: no_markdown,
            },
            &mut io::stdout(),
        ),
        Command::Report { results, markdown } => {
            app::rerender(&results, markdown.as_deref(), &mut io::stdout())
        }
    };

    status.into()
}
