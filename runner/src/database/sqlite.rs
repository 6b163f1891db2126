use super::{util::normalize_url, BenchRow, ConnectionError, Param};
use crate::config::Target;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params_from_iter, types::ToSqlOutput, Connection, ToSql};
use tracing::trace;

pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

const IN_MEMORY: &str = ":memory:";

impl From<rusqlite::Error> for ConnectionError {
    fn from(error: rusqlite::Error) -> Self {
        ConnectionError::SQLite(error)
    }
}

impl ToSql for Param {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Param::Int(value) => value.to_sql(),
            Param::Text(value) => value.to_sql(),
        }
    }
}

/// every pooled `:memory:` connection is a database of its own
pub fn manager(target: &Target) -> SqliteConnectionManager {
    match normalize_url(target.kind, &target.url).as_str() {
        IN_MEMORY => SqliteConnectionManager::memory(),
        path => SqliteConnectionManager::file(path),
    }
}

pub fn execute(conn: &mut Connection, sql: &str) -> Result<(), ConnectionError> {
    trace!(sql, "sqlite execute");

    Ok(conn.execute_batch(sql)?)
}

pub fn execute_with(
    conn: &mut Connection,
    sql: &str,
    params: &[Param],
) -> Result<u64, ConnectionError> {
    let affected = conn
        .prepare_cached(sql)?
        .execute(params_from_iter(params.iter()))?;

    Ok(affected as u64)
}

pub fn execute_batch(
    conn: &mut Connection,
    sql: &str,
    rows: &[Vec<Param>],
) -> Result<(), ConnectionError> {
    let mut statement = conn.prepare_cached(sql)?;

    for row in rows {
        statement.execute(params_from_iter(row.iter()))?;
    }

    Ok(())
}

pub fn query_rows(
    conn: &mut Connection,
    sql: &str,
    params: &[Param],
) -> Result<Vec<BenchRow>, ConnectionError> {
    let mut statement = conn.prepare_cached(sql)?;
    let rows = statement
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(BenchRow {
                id: row.get(0)?,
                value: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}
