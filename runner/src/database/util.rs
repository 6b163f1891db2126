use dbbench_analysis::BackendKind;
use std::borrow::Cow;
use tracing::warn;

const JDBC_PREFIX: &str = "jdbc:";

/// Turn a configured url into one the native driver of `kind` accepts.
///
/// `jdbc:` urls are accepted for configs written for JDBC tooling, their
/// query string holds driver properties that mean nothing here and is dropped.
pub fn normalize_url(kind: BackendKind, url: &str) -> String {
    let url = url.trim();
    let url = match url.strip_prefix(JDBC_PREFIX) {
        Some(stripped) => match stripped.split_once('?') {
            Some((base, properties)) => {
                warn!("Ignoring JDBC driver properties '{properties}'");
                base
            }
            None => stripped,
        },
        None => url,
    };

    match kind {
        BackendKind::MySql | BackendKind::MariaDb => match url.strip_prefix("mariadb://") {
            Some(rest) => format!("mysql://{rest}"),
            None => url.to_owned(),
        },
        BackendKind::Sqlite => url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
            .to_owned(),
        BackendKind::PostgreSql => url.to_owned(),
    }
}

/// Rewrite `?` placeholders into PostgreSQL's `$1, $2, ...`, ignoring
/// question marks inside single quoted literals.
pub fn numbered_placeholders(sql: &str) -> Cow<'_, str> {
    if !sql.contains('?') {
        return Cow::Borrowed(sql);
    }

    let mut rewritten = String::with_capacity(sql.len() + 8);
    let mut in_literal = false;
    let mut counter = 0;

    for c in sql.chars() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                rewritten.push(c);
            }
            '?' if !in_literal => {
                counter += 1;
                rewritten.push('$');
                rewritten.push_str(&counter.to_string());
            }
            _ => rewritten.push(c),
        }
    }

    Cow::Owned(rewritten)
}
