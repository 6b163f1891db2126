use super::util::{normalize_url, numbered_placeholders};
use dbbench_analysis::BackendKind;

#[test]
pub fn placeholders_are_numbered() {
    assert_eq!(
        numbered_placeholders("SELECT id, value FROM t WHERE id >= ? AND id < ?"),
        "SELECT id, value FROM t WHERE id >= $1 AND id < $2"
    );
}

#[test]
pub fn placeholders_in_literals_are_kept() {
    assert_eq!(
        numbered_placeholders("UPDATE t SET value = '?' WHERE id = ?"),
        "UPDATE t SET value = '?' WHERE id = $1"
    );
}

#[test]
pub fn statements_without_placeholders_are_borrowed() {
    assert!(matches!(
        numbered_placeholders("DROP TABLE IF EXISTS t"),
        std::borrow::Cow::Borrowed(_)
    ));
}

#[test]
pub fn jdbc_urls_are_stripped() {
    assert_eq!(
        normalize_url(
            BackendKind::MySql,
            "jdbc:mysql://localhost:3306/benchmark?useSSL=false&allowPublicKeyRetrieval=true"
        ),
        "mysql://localhost:3306/benchmark"
    );
    assert_eq!(
        normalize_url(BackendKind::PostgreSql, "jdbc:postgresql://localhost:5432/benchmark"),
        "postgresql://localhost:5432/benchmark"
    );
}

#[test]
pub fn mariadb_scheme_uses_mysql_driver() {
    assert_eq!(
        normalize_url(BackendKind::MariaDb, "jdbc:mariadb://localhost:3306/benchmark"),
        "mysql://localhost:3306/benchmark"
    );
}

#[test]
pub fn native_query_strings_are_kept() {
    assert_eq!(
        normalize_url(BackendKind::PostgreSql, "postgres://db/bench?sslmode=disable"),
        "postgres://db/bench?sslmode=disable"
    );
}

#[test]
pub fn sqlite_paths() {
    assert_eq!(normalize_url(BackendKind::Sqlite, ":memory:"), ":memory:");
    assert_eq!(
        normalize_url(BackendKind::Sqlite, "sqlite:///tmp/bench.db"),
        "/tmp/bench.db"
    );
    assert_eq!(
        normalize_url(BackendKind::Sqlite, "jdbc:sqlite:bench.db"),
        "bench.db"
    );
}
