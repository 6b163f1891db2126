//! Report rendering for a list of benchmark results.
//!
//! Every renderer is a pure projection of the results into a string, writing
//! an artifact never touches the in-memory results.

pub mod console;
pub mod json;
pub mod markdown;

use crate::model::BenchmarkResult;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read results {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to (de)serialize results: {0}")]
    Json(#[from] serde_json::Error),
}

/// text shown instead of a number when a scenario has no timing
pub const UNAVAILABLE: &str = "FAILED";

pub(crate) fn write_artifact(path: &Path, content: &str) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Report written");

    Ok(())
}

/// milliseconds since the epoch, used to keep artifacts of different runs apart
fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// Write the selected artifacts into `directory`.
///
/// Every artifact is attempted even if an earlier one failed, the outcome of
/// each is returned in the order JSON, Markdown.
pub fn write_all(
    results: &[BenchmarkResult],
    directory: &Path,
    with_json: bool,
    with_markdown: bool,
) -> Vec<Result<PathBuf, ReportError>> {
    let stamp = timestamp_millis();
    let mut written = Vec::new();

    if with_json {
        let path = directory.join(format!("benchmark-results-{stamp}.json"));
        written.push(json::write(results, &path).map(|()| path));
    }

    if with_markdown {
        let path = directory.join(format!("benchmark-report-{stamp}.md"));
        written.push(markdown::write(results, &path).map(|()| path));
    }

    for failed in written.iter().filter_map(|outcome| outcome.as_ref().err()) {
        error!("{failed}");
    }

    written
}
