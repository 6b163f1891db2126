use super::{write_artifact, ReportError};
use crate::model::BenchmarkResult;
use std::{fs, path::Path};

pub fn render(results: &[BenchmarkResult]) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(results)?)
}

pub fn write(results: &[BenchmarkResult], path: &Path) -> Result<(), ReportError> {
    write_artifact(path, &render(results)?)
}

/// Load results written by [`write`], e.g. to re-render an older run
pub fn read(path: &Path) -> Result<Vec<BenchmarkResult>, ReportError> {
    let content = fs::read_to_string(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(serde_json::from_str(&content)?)
}
