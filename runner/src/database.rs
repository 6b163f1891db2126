pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod util;

#[cfg(test)]
mod util_test;

use crate::config::{PoolConfig, Target};
use dbbench_analysis::BackendKind;
use r2d2::{ManageConnection, PooledConnection};
use r2d2_mysql::MySqlConnectionManager;
use r2d2_postgres::{postgres::NoTls, PostgresConnectionManager};
use r2d2_sqlite::SqliteConnectionManager;
use std::fmt::{self, Debug};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("PostgreSQL error: {0}")]
    Postgres(r2d2_postgres::postgres::Error),
    #[error("MySQL error: {0}")]
    MySql(r2d2_mysql::mysql::Error),
    #[error("SQLite error: {0}")]
    SQLite(rusqlite::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Invalid connection url: {0}")]
    Url(String),
    #[error("Panicked: {0}")]
    Panic(String),
}

/// Positional statement parameter, statements use `?` as placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Int(i32),
    Text(String),
}

/// Row shape of every benchmark table read back by the scenarios
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchRow {
    pub id: i32,
    pub value: String,
}

/// Routes r2d2's background connection errors into the tracing output
#[derive(Debug)]
struct TracingErrorHandler;

impl<E: fmt::Display> r2d2::HandleError<E> for TracingErrorHandler {
    fn handle_error(&self, error: E) {
        warn!("Connection pool error: {error}");
    }
}

fn build_pool<M: ManageConnection>(manager: M, config: &PoolConfig) -> r2d2::Pool<M> {
    // lazily connecting, an unreachable target surfaces on the first `get`
    r2d2::Pool::builder()
        .max_size(config.max_size)
        .min_idle(Some(config.min_idle))
        .connection_timeout(config.connection_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .error_handler(Box::new(TracingErrorHandler))
        .build_unchecked(manager)
}

/// Connection pool of a single target, every target owns its own pool
#[derive(Clone)]
pub enum ConnectionPool {
    Postgres(postgres::PgPool),
    MySql(mysql::MySqlPool),
    SQLite(sqlite::SqlitePool),
}

impl Debug for ConnectionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Postgres(pool) => pool.state(),
            Self::MySql(pool) => pool.state(),
            Self::SQLite(pool) => pool.state(),
        };

        f.debug_struct("ConnectionPool")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl ConnectionPool {
    /// Create the pool for a target. Nothing is connected yet.
    pub fn open(target: &Target, config: &PoolConfig) -> Result<Self, ConnectionError> {
        debug!(target = %target.name, kind = %target.kind, "Creating connection pool");

        Ok(match target.kind {
            BackendKind::PostgreSql => {
                Self::Postgres(build_pool(postgres::manager(target)?, config))
            }
            BackendKind::MySql | BackendKind::MariaDb => {
                Self::MySql(build_pool(mysql::manager(target)?, config))
            }
            BackendKind::Sqlite => Self::SQLite(build_pool(sqlite::manager(target), config)),
        })
    }

    /// Check out one connection, it returns to the pool once dropped
    pub fn acquire(&self) -> Result<Session, ConnectionError> {
        Ok(match self {
            Self::Postgres(pool) => Session::Postgres(pool.get()?),
            Self::MySql(pool) => Session::MySql(pool.get()?),
            Self::SQLite(pool) => Session::SQLite(pool.get()?),
        })
    }
}

/// A pooled connection with the small SQL surface the scenarios use.
/// (this is deliberately not made with dynamic dispatch, like the pool)
pub enum Session {
    Postgres(PooledConnection<PostgresConnectionManager<NoTls>>),
    MySql(PooledConnection<MySqlConnectionManager>),
    SQLite(PooledConnection<SqliteConnectionManager>),
}

impl Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Postgres(_) => "postgres",
            Self::MySql(_) => "mysql",
            Self::SQLite(_) => "sqlite",
        };

        f.debug_tuple("Session").field(&kind).finish()
    }
}

impl Session {
    /// run one or more unparameterized statements
    pub fn execute(&mut self, sql: &str) -> Result<(), ConnectionError> {
        match self {
            Self::Postgres(client) => postgres::execute(client, sql),
            Self::MySql(conn) => mysql::execute(conn, sql),
            Self::SQLite(conn) => sqlite::execute(conn, sql),
        }
    }

    /// run one parameterized statement, returns the affected rows
    pub fn execute_with(&mut self, sql: &str, params: &[Param]) -> Result<u64, ConnectionError> {
        match self {
            Self::Postgres(client) => postgres::execute_with(client, sql, params),
            Self::MySql(conn) => mysql::execute_with(conn, sql, params),
            Self::SQLite(conn) => sqlite::execute_with(conn, sql, params),
        }
    }

    /// submit one prepared statement for every parameter row
    pub fn execute_batch(&mut self, sql: &str, rows: &[Vec<Param>]) -> Result<(), ConnectionError> {
        match self {
            Self::Postgres(client) => postgres::execute_batch(client, sql, rows),
            Self::MySql(conn) => mysql::execute_batch(conn, sql, rows),
            Self::SQLite(conn) => sqlite::execute_batch(conn, sql, rows),
        }
    }

    /// run a query selecting `id, value` and drain every row
    pub fn query_rows(&mut self, sql: &str, params: &[Param]) -> Result<Vec<BenchRow>, ConnectionError> {
        match self {
            Self::Postgres(client) => postgres::query_rows(client, sql, params),
            Self::MySql(conn) => mysql::query_rows(conn, sql, params),
            Self::SQLite(conn) => sqlite::query_rows(conn, sql, params),
        }
    }
}
