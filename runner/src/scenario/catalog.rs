//! The fixed, ordered benchmark catalog.
//!
//! Every scenario works on its own table (see `Namespace`), tables are
//! dropped if they exist before being created.

use super::{Scenario, Workload};
use crate::database::{ConnectionError, Param};

const VALUE_COLUMNS: &str = "(id INT PRIMARY KEY, value VARCHAR(100))";
const CREATE_COLUMNS: &str = "(id INT PRIMARY KEY, name VARCHAR(100), created_at TIMESTAMP)";

const SELECT_RANGE_ROWS: u32 = 1000;
const RANGE_WIDTH: u32 = 10;
const BATCH_SIZE: u32 = 100;
const DELETE_ROWS: u32 = 10;

pub static CATALOG: [Scenario; 8] = [
    Scenario {
        key: "connection",
        name: "Connection Performance",
        table: "connection",
        rounds: 1,
        iterations: 100,
        throughput_iterations: 100,
        setup: None,
        operation: acquire_connection,
        after_each: None,
        teardown: None,
    },
    Scenario {
        key: "simple_select",
        name: "Simple Select",
        table: "test",
        rounds: 1,
        iterations: 1000,
        throughput_iterations: 1000,
        setup: Some(create_single_row),
        operation: select_by_key,
        after_each: None,
        teardown: Some(drop_table),
    },
    Scenario {
        key: "create_table",
        name: "Create Table",
        table: "create",
        rounds: 1,
        iterations: 10,
        throughput_iterations: 10,
        setup: Some(drop_created_tables),
        operation: create_table,
        after_each: Some(drop_created_table),
        teardown: Some(drop_created_tables),
    },
    Scenario {
        key: "insert_single",
        name: "Single Insert",
        table: "insert",
        rounds: 1,
        iterations: 1000,
        throughput_iterations: 1000,
        setup: Some(create_empty),
        operation: insert_row,
        after_each: None,
        teardown: Some(drop_table),
    },
    Scenario {
        key: "insert_batch",
        name: "Batch Insert",
        table: "batch",
        rounds: 1,
        iterations: 10,
        // batches, not rows
        throughput_iterations: 10,
        setup: Some(create_empty),
        operation: insert_batch,
        after_each: None,
        teardown: Some(drop_table),
    },
    Scenario {
        key: "select_range",
        name: "Select Range",
        table: "select",
        rounds: 1,
        iterations: 100,
        throughput_iterations: 100,
        setup: Some(create_range_rows),
        operation: select_range,
        after_each: None,
        teardown: Some(drop_table),
    },
    Scenario {
        key: "update",
        name: "Update",
        table: "update",
        rounds: 1,
        iterations: 100,
        throughput_iterations: 100,
        setup: Some(create_update_rows),
        operation: update_row,
        after_each: None,
        teardown: Some(drop_table),
    },
    Scenario {
        key: "delete",
        name: "Delete",
        table: "delete",
        rounds: 10,
        iterations: DELETE_ROWS,
        throughput_iterations: 100,
        // a fresh table for every round
        setup: Some(create_delete_rows),
        operation: delete_row,
        after_each: None,
        teardown: Some(drop_table),
    },
];

pub fn catalog() -> &'static [Scenario] {
    &CATALOG
}

fn value_row(id: u32, prefix: &str) -> Vec<Param> {
    vec![Param::Int(id as i32), Param::Text(format!("{prefix}_{id}"))]
}

fn recreate(workload: &mut Workload<'_>, columns: &str) -> Result<(), ConnectionError> {
    drop_table(workload)?;

    let sql = format!("CREATE TABLE {} {columns}", workload.table());
    workload.session.execute(&sql)
}

fn seed(workload: &mut Workload<'_>, ids: std::ops::Range<u32>) -> Result<(), ConnectionError> {
    let rows = ids.map(|id| value_row(id, "value")).collect::<Vec<_>>();
    let sql = format!("INSERT INTO {} (id, value) VALUES (?, ?)", workload.table());

    workload.session.execute_batch(&sql, &rows)
}

pub fn drop_table(workload: &mut Workload<'_>) -> Result<(), ConnectionError> {
    let sql = format!("DROP TABLE IF EXISTS {}", workload.table());
    workload.session.execute(&sql)
}

fn acquire_connection(workload: &mut Workload<'_>, _: u32) -> Result<(), ConnectionError> {
    let session = workload.pool.acquire()?;
    drop(session);

    Ok(())
}

fn create_single_row(workload: &mut Workload<'_>) -> Result<(), ConnectionError> {
    recreate(workload, VALUE_COLUMNS)?;

    let sql = format!("INSERT INTO {} (id, value) VALUES (1, 'test')", workload.table());
    workload.session.execute(&sql)
}

fn select_by_key(workload: &mut Workload<'_>, _: u32) -> Result<(), ConnectionError> {
    let sql = format!("SELECT id, value FROM {} WHERE id = ?", workload.table());
    workload.session.query_rows(&sql, &[Param::Int(1)])?;

    Ok(())
}

fn created_table(workload: &Workload<'_>, iteration: u32) -> String {
    format!("{}_{iteration}", workload.table())
}

fn create_table(workload: &mut Workload<'_>, iteration: u32) -> Result<(), ConnectionError> {
    let sql = format!(
        "CREATE TABLE {} {CREATE_COLUMNS}",
        created_table(workload, iteration)
    );
    workload.session.execute(&sql)
}

fn drop_created_table(workload: &mut Workload<'_>, iteration: u32) -> Result<(), ConnectionError> {
    let sql = format!("DROP TABLE IF EXISTS {}", created_table(workload, iteration));
    workload.session.execute(&sql)
}

fn drop_created_tables(workload: &mut Workload<'_>) -> Result<(), ConnectionError> {
    (0..workload.iterations()).try_for_each(|iteration| drop_created_table(workload, iteration))
}

fn create_empty(workload: &mut Workload<'_>) -> Result<(), ConnectionError> {
    recreate(workload, VALUE_COLUMNS)
}

fn insert_row(workload: &mut Workload<'_>, iteration: u32) -> Result<(), ConnectionError> {
    let sql = format!("INSERT INTO {} (id, value) VALUES (?, ?)", workload.table());
    workload
        .session
        .execute_with(&sql, &value_row(iteration, "value"))?;

    Ok(())
}

fn insert_batch(workload: &mut Workload<'_>, batch: u32) -> Result<(), ConnectionError> {
    let first = batch * BATCH_SIZE;
    seed(workload, first..first + BATCH_SIZE)
}

fn create_range_rows(workload: &mut Workload<'_>) -> Result<(), ConnectionError> {
    recreate(workload, VALUE_COLUMNS)?;
    seed(workload, 0..SELECT_RANGE_ROWS)
}

fn select_range(workload: &mut Workload<'_>, iteration: u32) -> Result<(), ConnectionError> {
    let sql = format!(
        "SELECT id, value FROM {} WHERE id >= ? AND id < ?",
        workload.table()
    );
    let low = (iteration * RANGE_WIDTH) as i32;
    let high = ((iteration + 1) * RANGE_WIDTH) as i32;

    workload
        .session
        .query_rows(&sql, &[Param::Int(low), Param::Int(high)])?;

    Ok(())
}

fn create_update_rows(workload: &mut Workload<'_>) -> Result<(), ConnectionError> {
    recreate(workload, VALUE_COLUMNS)?;

    let rows = workload.iterations();
    seed(workload, 0..rows)
}

fn update_row(workload: &mut Workload<'_>, iteration: u32) -> Result<(), ConnectionError> {
    let sql = format!("UPDATE {} SET value = ? WHERE id = ?", workload.table());
    workload.session.execute_with(
        &sql,
        &[
            Param::Text(format!("updated_{iteration}")),
            Param::Int(iteration as i32),
        ],
    )?;

    Ok(())
}

fn create_delete_rows(workload: &mut Workload<'_>) -> Result<(), ConnectionError> {
    recreate(workload, VALUE_COLUMNS)?;
    seed(workload, 0..DELETE_ROWS)
}

fn delete_row(workload: &mut Workload<'_>, iteration: u32) -> Result<(), ConnectionError> {
    let sql = format!("DELETE FROM {} WHERE id = ?", workload.table());
    workload
        .session
        .execute_with(&sql, &[Param::Int(iteration as i32)])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_and_sizes() {
        let keys = catalog().iter().map(|scenario| scenario.key).collect::<Vec<_>>();

        assert_eq!(
            keys,
            vec![
                "connection",
                "simple_select",
                "create_table",
                "insert_single",
                "insert_batch",
                "select_range",
                "update",
                "delete"
            ]
        );

        let samples = catalog()
            .iter()
            .map(|scenario| scenario.rounds * scenario.iterations)
            .collect::<Vec<_>>();
        assert_eq!(samples, vec![100, 1000, 10, 1000, 10, 100, 100, 100]);
    }

    #[test]
    fn throughput_counts_logical_operations() {
        for scenario in catalog() {
            assert_eq!(
                scenario.throughput_iterations,
                u64::from(scenario.rounds * scenario.iterations),
                "{}",
                scenario.key
            );
        }
    }

    #[test]
    fn tables_do_not_collide() {
        let mut tables = catalog().iter().map(|scenario| scenario.table).collect::<Vec<_>>();
        tables.sort_unstable();
        tables.dedup();

        assert_eq!(tables.len(), catalog().len());
    }

    #[test]
    fn select_range_covers_seeded_rows() {
        assert_eq!(CATALOG[5].iterations * RANGE_WIDTH, SELECT_RANGE_ROWS);
    }
}
