use super::{
    util::{normalize_url, numbered_placeholders},
    BenchRow, ConnectionError, Param,
};
use crate::config::Target;
use r2d2_postgres::{
    postgres::{self, types::ToSql, Client, Config, NoTls},
    PostgresConnectionManager,
};
use tracing::trace;

pub type PgPool = r2d2::Pool<PostgresConnectionManager<NoTls>>;

impl From<postgres::Error> for ConnectionError {
    fn from(error: postgres::Error) -> Self {
        ConnectionError::Postgres(error)
    }
}

pub fn manager(target: &Target) -> Result<PostgresConnectionManager<NoTls>, ConnectionError> {
    let mut config = normalize_url(target.kind, &target.url)
        .parse::<Config>()
        .map_err(|e| ConnectionError::Url(e.to_string()))?;

    if !target.username.is_empty() {
        config.user(&target.username);
    }
    if !target.password.is_empty() {
        config.password(&target.password);
    }

    Ok(PostgresConnectionManager::new(config, NoTls))
}

fn bind(params: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|param| match param {
            Param::Int(value) => value as &(dyn ToSql + Sync),
            Param::Text(value) => value as &(dyn ToSql + Sync),
        })
        .collect()
}

pub fn execute(client: &mut Client, sql: &str) -> Result<(), ConnectionError> {
    trace!(sql, "postgres execute");

    Ok(client.batch_execute(sql)?)
}

pub fn execute_with(
    client: &mut Client,
    sql: &str,
    params: &[Param],
) -> Result<u64, ConnectionError> {
    Ok(client.execute(&*numbered_placeholders(sql), &bind(params))?)
}

pub fn execute_batch(
    client: &mut Client,
    sql: &str,
    rows: &[Vec<Param>],
) -> Result<(), ConnectionError> {
    let statement = client.prepare(&*numbered_placeholders(sql))?;

    for row in rows {
        client.execute(&statement, &bind(row))?;
    }

    Ok(())
}

pub fn query_rows(
    client: &mut Client,
    sql: &str,
    params: &[Param],
) -> Result<Vec<BenchRow>, ConnectionError> {
    client
        .query(&*numbered_placeholders(sql), &bind(params))?
        .iter()
        .map(|row| -> Result<BenchRow, ConnectionError> {
            Ok(BenchRow {
                id: row.try_get(0)?,
                value: row.try_get(1)?,
            })
        })
        .collect()
}
