use dbbench_analysis::BackendKind;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fs, path::PathBuf, time::Duration};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Configuration failed preflight checks")]
    Preflight,
    #[error("No database targets configured")]
    NoTargets,
    #[error("Invalid configuration for {target}: {reason}")]
    InvalidConfiguration { target: String, reason: String },
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub tables: TableConfig,
    #[serde(default)]
    pub output: OutputConfig,
    // Ordered list of targets, results and reports keep this order
    #[serde(default, alias = "databases")]
    pub targets: Vec<TargetConfig>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub name: String,
    // kept as a string so that unsupported kinds are reported per target
    #[serde(alias = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields, default)]
pub struct PoolConfig {
    pub max_size: u32,
    pub min_idle: u32,
    pub connection_timeout_ms: u64,
    pub idle_timeout_ms: u64,
    pub max_lifetime_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: 2,
            connection_timeout_ms: 30_000,
            idle_timeout_ms: 600_000,
            max_lifetime_ms: 1_800_000,
        }
    }
}

impl PoolConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    /// `0` disables idle eviction
    pub fn idle_timeout(&self) -> Option<Duration> {
        Some(self.idle_timeout_ms)
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
    }

    /// `0` keeps connections forever
    pub fn max_lifetime(&self) -> Option<Duration> {
        Some(self.max_lifetime_ms)
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields, default)]
pub struct TableConfig {
    pub prefix: String,
    // append a per-run identifier to every table name
    pub isolate_runs: bool,
    // pin the run identifier instead of generating one
    pub run_id: Option<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            prefix: "bench".to_owned(),
            isolate_runs: true,
            run_id: None,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub json: bool,
    pub markdown: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            json: true,
            markdown: true,
        }
    }
}

/// Validated, immutable identity of one database under test
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub kind: BackendKind,
    pub url: String,
    pub username: String,
    pub password: String,
}

impl TargetConfig {
    /// check the descriptor before any connection is attempted
    pub fn resolve(&self) -> Result<Target, ConfigErrors> {
        let invalid = |reason: &str| ConfigErrors::InvalidConfiguration {
            target: self.name.clone(),
            reason: reason.to_owned(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.url.trim().is_empty() {
            return Err(invalid("url must not be empty"));
        }
        let kind = self.kind.parse::<BackendKind>().map_err(|unsupported| {
            ConfigErrors::InvalidConfiguration {
                target: self.name.clone(),
                reason: unsupported.to_string(),
            }
        })?;

        Ok(Target {
            name: self.name.clone(),
            kind,
            url: self.url.trim().to_owned(),
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

/// table and run identifiers are spliced into SQL, so only plain identifiers pass
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();

    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl BenchConfig {
    pub fn load(path: &PathBuf) -> Result<Self, ConfigErrors> {
        let content = fs::read_to_string(path).map_err(|source| ConfigErrors::Read {
            path: path.clone(),
            source,
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigErrors> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Checks that concern the whole run. Returns true if any error was found,
    /// every problem is logged instead of stopping at the first one.
    pub fn preflight_checks(&self) -> bool {
        let mut contains_error = false;

        if self.pool.max_size == 0 {
            error!("pool.max_size must be at least 1");
            contains_error = true;
        } else if self.pool.max_size < 2 {
            warn!("pool.max_size is 1, the connection scenario will wait for the suite connection");
        }

        if self.pool.min_idle > self.pool.max_size {
            error!(
                "pool.min_idle ({}) cannot exceed pool.max_size ({})",
                self.pool.min_idle, self.pool.max_size
            );
            contains_error = true;
        }

        if self.pool.connection_timeout_ms == 0 {
            error!("pool.connection_timeout_ms cannot be 0");
            contains_error = true;
        }

        if !is_identifier(&self.tables.prefix) {
            error!(
                "tables.prefix '{}' must start with a letter or '_' and only contain letters, digits and '_'",
                self.tables.prefix
            );
            contains_error = true;
        }

        if let Some(run_id) = &self.tables.run_id {
            if !run_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') || run_id.is_empty()
            {
                error!("tables.run_id '{run_id}' must only contain letters, digits and '_'");
                contains_error = true;
            }
            if !self.tables.isolate_runs {
                warn!("tables.run_id is set but tables.isolate_runs is false, the run id is ignored");
            }
        }

        let mut names = BTreeSet::new();
        for target in self.targets.iter() {
            if !names.insert(target.name.as_str()) {
                error!("Target {} is defined more than once", target.name);
                contains_error = true;
            }
        }

        contains_error
    }

    /// Resolve every target descriptor; invalid ones are returned separately
    /// so that the remaining targets can still run.
    pub fn resolve_targets(&self) -> (Vec<Target>, Vec<ConfigErrors>) {
        let mut targets = Vec::new();
        let mut errors = Vec::new();

        for descriptor in self.targets.iter() {
            match descriptor.resolve() {
                Ok(target) => targets.push(target),
                Err(e) => {
                    error!(target = %descriptor.name, "Skipping target: {e}");
                    errors.push(e);
                }
            }
        }

        (targets, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
pool:
  max_size: 4
targets:
  - name: Custom MySQL
    kind: mysql
    url: mysql://localhost:3306/benchmark
    username: root
    password: password
  - name: Custom PostgreSQL
    type: PG
    url: jdbc:postgresql://localhost:5432/benchmark
  - name: Broken
    kind: oracle
    url: oracle://localhost
"#;

    #[test]
    fn parses_with_defaults() {
        let config = BenchConfig::parse(CONFIG).unwrap();

        assert_eq!(config.pool.max_size, 4);
        assert_eq!(config.pool.min_idle, 2);
        assert_eq!(config.pool.connection_timeout_ms, 30_000);
        assert_eq!(config.tables.prefix, "bench");
        assert!(config.tables.isolate_runs);
        assert!(config.output.json && config.output.markdown);
        assert_eq!(config.targets.len(), 3);
        assert_eq!(config.targets[1].username, "");
        assert!(!config.preflight_checks());
    }

    #[test]
    fn unsupported_kind_only_affects_its_target() {
        let config = BenchConfig::parse(CONFIG).unwrap();
        let (targets, errors) = config.resolve_targets();

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].kind, BackendKind::PostgreSql);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Unsupported database type: oracle"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            BenchConfig::parse("targets: []\nthreads: 3\n"),
            Err(ConfigErrors::Parse(_))
        ));
    }

    #[test]
    fn preflight_catches_all_problems() {
        let mut config = BenchConfig::parse(CONFIG).unwrap();
        config.pool.min_idle = 10;
        config.tables.prefix = "bench; drop".to_owned();
        config.targets.push(config.targets[0].clone());

        assert!(config.preflight_checks());
    }

    #[test]
    fn empty_url_is_invalid() {
        let descriptor = TargetConfig {
            name: "empty".to_owned(),
            kind: "sqlite".to_owned(),
            url: " ".to_owned(),
            username: String::new(),
            password: String::new(),
        };

        assert!(matches!(
            descriptor.resolve(),
            Err(ConfigErrors::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("bench"));
        assert!(is_identifier("_b2"));
        assert!(!is_identifier("2b"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }
}
