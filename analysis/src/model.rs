use crate::stats::TimingStats;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutcomeError {
    #[error("Outcome {0} is marked successful but carries no timing")]
    MissingTiming(String),
    #[error("Outcome {0} is marked failed but carries no error message")]
    MissingError(String),
    #[error("Result {target} holds outcome {key} more than once")]
    DuplicateKey { target: String, key: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported database type: {0}")]
pub struct UnsupportedBackend(pub String);

/// All supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    MySql,
    PostgreSql,
    MariaDb,
    Sqlite,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
            Self::MariaDb => "mariadb",
            Self::Sqlite => "sqlite",
        }
    }
}

impl FromStr for BackendKind {
    type Err = UnsupportedBackend;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind.trim().to_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "postgresql" | "postgres" | "pg" => Ok(Self::PostgreSql),
            "mariadb" => Ok(Self::MariaDb),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(UnsupportedBackend(kind.to_owned())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either the timing of a completed scenario or the reason it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success(TimingStats),
    Failure(String),
}

/// Outcome of one scenario execution, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OutcomeRecord", try_from = "OutcomeRecord")]
pub struct ScenarioOutcome {
    pub key: String,
    pub name: String,
    pub status: Status,
}

impl ScenarioOutcome {
    pub fn success(key: impl Into<String>, name: impl Into<String>, timing: TimingStats) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            status: Status::Success(timing),
        }
    }

    /// an empty message is replaced, a failed outcome always explains itself
    pub fn failure(key: impl Into<String>, name: impl Into<String>, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown error".to_owned();
        }

        Self {
            key: key.into(),
            name: name.into(),
            status: Status::Failure(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Success(_))
    }

    pub fn timing(&self) -> Option<&TimingStats> {
        match &self.status {
            Status::Success(timing) => Some(timing),
            Status::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Status::Success(_) => None,
            Status::Failure(error) => Some(error),
        }
    }
}

/// flat wire shape of an outcome: `{key, name, success, error, timing}`
#[derive(Serialize, Deserialize)]
struct OutcomeRecord {
    key: String,
    name: String,
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timing: Option<TimingStats>,
}

impl From<ScenarioOutcome> for OutcomeRecord {
    fn from(outcome: ScenarioOutcome) -> Self {
        let (success, error, timing) = match outcome.status {
            Status::Success(timing) => (true, None, Some(timing)),
            Status::Failure(error) => (false, Some(error), None),
        };

        Self {
            key: outcome.key,
            name: outcome.name,
            success,
            error,
            timing,
        }
    }
}

impl TryFrom<OutcomeRecord> for ScenarioOutcome {
    type Error = OutcomeError;

    fn try_from(record: OutcomeRecord) -> Result<Self, Self::Error> {
        let status = if record.success {
            Status::Success(
                record
                    .timing
                    .ok_or_else(|| OutcomeError::MissingTiming(record.key.clone()))?,
            )
        } else {
            match record.error {
                Some(error) if !error.is_empty() => Status::Failure(error),
                _ => return Err(OutcomeError::MissingError(record.key)),
            }
        };

        Ok(Self {
            key: record.key,
            name: record.name,
            status,
        })
    }
}

/// Outcomes of one suite run against one target.
///
/// Outcomes keep their insertion order, which is the execution order of the
/// catalog and the row order of every comparison built from this result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ResultRecord")]
pub struct BenchmarkResult {
    pub target_name: String,
    pub target_kind: BackendKind,
    outcomes: Vec<ScenarioOutcome>,
}

/// wire shape of `BenchmarkResult`, outcome keys must be unique
#[derive(Deserialize)]
struct ResultRecord {
    target_name: String,
    target_kind: BackendKind,
    outcomes: Vec<ScenarioOutcome>,
}

impl TryFrom<ResultRecord> for BenchmarkResult {
    type Error = OutcomeError;

    fn try_from(record: ResultRecord) -> Result<Self, Self::Error> {
        let mut result = Self::new(record.target_name, record.target_kind);

        for outcome in record.outcomes {
            if result.get(&outcome.key).is_some() {
                return Err(OutcomeError::DuplicateKey {
                    target: result.target_name,
                    key: outcome.key,
                });
            }
            result.insert(outcome);
        }

        Ok(result)
    }
}

impl BenchmarkResult {
    pub fn new(target_name: impl Into<String>, target_kind: BackendKind) -> Self {
        Self {
            target_name: target_name.into(),
            target_kind,
            outcomes: Vec::new(),
        }
    }

    /// Append an outcome; a repeated key replaces the earlier outcome in place.
    pub fn insert(&mut self, outcome: ScenarioOutcome) {
        match self.outcomes.iter_mut().find(|known| known.key == outcome.key) {
            Some(known) => *known = outcome,
            None => self.outcomes.push(outcome),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|outcome| outcome.key == key)
    }

    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|outcome| outcome.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.is_success())
            .count()
    }
}
