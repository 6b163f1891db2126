use super::{util::normalize_url, BenchRow, ConnectionError, Param};
use crate::config::Target;
use r2d2_mysql::{
    mysql::{self, prelude::Queryable, Conn, Opts, OptsBuilder, Value},
    MySqlConnectionManager,
};
use tracing::trace;

/// MySQL and MariaDB share the MySQL wire protocol driver
pub type MySqlPool = r2d2::Pool<MySqlConnectionManager>;

impl From<mysql::Error> for ConnectionError {
    fn from(error: mysql::Error) -> Self {
        ConnectionError::MySql(error)
    }
}

pub fn manager(target: &Target) -> Result<MySqlConnectionManager, ConnectionError> {
    let opts = Opts::from_url(&normalize_url(target.kind, &target.url))
        .map_err(|e| ConnectionError::Url(e.to_string()))?;
    let mut builder = OptsBuilder::from_opts(opts);

    if !target.username.is_empty() {
        builder = builder.user(Some(target.username.as_str()));
    }
    if !target.password.is_empty() {
        builder = builder.pass(Some(target.password.as_str()));
    }

    Ok(MySqlConnectionManager::new(builder))
}

fn bind(params: &[Param]) -> Vec<Value> {
    params
        .iter()
        .map(|param| match param {
            Param::Int(value) => Value::from(*value),
            Param::Text(value) => Value::from(value.as_str()),
        })
        .collect()
}

pub fn execute(conn: &mut Conn, sql: &str) -> Result<(), ConnectionError> {
    trace!(sql, "mysql execute");

    Ok(conn.query_drop(sql)?)
}

pub fn execute_with(conn: &mut Conn, sql: &str, params: &[Param]) -> Result<u64, ConnectionError> {
    conn.exec_drop(sql, bind(params))?;

    Ok(conn.affected_rows())
}

pub fn execute_batch(
    conn: &mut Conn,
    sql: &str,
    rows: &[Vec<Param>],
) -> Result<(), ConnectionError> {
    Ok(conn.exec_batch(sql, rows.iter().map(|row| bind(row)))?)
}

pub fn query_rows(
    conn: &mut Conn,
    sql: &str,
    params: &[Param],
) -> Result<Vec<BenchRow>, ConnectionError> {
    Ok(conn.exec_map(sql, bind(params), |(id, value): (i32, String)| BenchRow {
        id,
        value,
    })?)
}
