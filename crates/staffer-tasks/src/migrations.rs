//! SQL DDL for the `employees` and `tasks` tables.
//!
//! Run once at startup on a pooled connection.

use rusqlite::Connection;
use tracing::debug;

use crate::errors::TaskError;

/// Create the schema if absent.
///
/// Idempotent. Every statement uses `IF NOT EXISTS`.
pub fn run_migrations(conn: &Connection) -> Result<(), TaskError> {
    conn.execute_batch(SCHEMA)?;
    debug!("staffer schema ensured");
    Ok(())
}

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    position TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_employees_name ON employees(name);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    parent_task_id INTEGER REFERENCES tasks(id) ON DELETE SET NULL,
    executor_id INTEGER REFERENCES employees(id) ON DELETE SET NULL,
    deadline TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_name ON tasks(name);
CREATE INDEX IF NOT EXISTS idx_tasks_executor ON tasks(executor_id);
CREATE INDEX IF NOT EXISTS idx_tasks_parent ON tasks(parent_task_id);
";

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn creates_both_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(table_names(&conn), vec!["employees", "tasks"]);
    }

    #[test]
    fn idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(table_names(&conn).len(), 2);
    }

    #[test]
    fn rejects_dangling_executor_with_foreign_keys_on() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO tasks (name, executor_id, deadline, status)
             VALUES ('t', 99, '2026-01-01', 'new')",
            [],
        );
        assert!(result.is_err());
    }
}
