//! SQL data access layer for employees and tasks.
//!
//! All methods take a `&Connection` parameter and are stateless. They
//! translate between Rust types and SQL. Ordering is always
//! explicit so callers see deterministic results.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::TaskError;
use crate::types::{
    Employee, EmployeeCreateParams, STATUS_IN_PROGRESS, Task, TaskCreateParams,
};

const EMPLOYEE_COLUMNS: &str = "e.id, e.name, e.position";
const TASK_COLUMNS: &str = "id, name, parent_task_id, executor_id, deadline, status";

/// Employee repository for SQL CRUD and workload queries.
pub struct EmployeeRepository;

impl EmployeeRepository {
    /// Insert an employee and return the stored row.
    pub fn create(conn: &Connection, params: &EmployeeCreateParams) -> Result<Employee, TaskError> {
        let _ = conn.execute(
            "INSERT INTO employees (name, position) VALUES (?1, ?2)",
            params![params.name, params.position],
        )?;
        let id = conn.last_insert_rowid();
        Self::get(conn, id)?.ok_or_else(|| TaskError::employee_not_found(id))
    }

    /// Get an employee by ID.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Employee>, TaskError> {
        let employee = conn
            .query_row(
                &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees e WHERE e.id = ?1"),
                params![id],
                employee_from_row,
            )
            .optional()?;
        Ok(employee)
    }

    /// All employees in ID order.
    pub fn list(conn: &Connection) -> Result<Vec<Employee>, TaskError> {
        collect_employees(
            conn,
            &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees e ORDER BY e.id"),
            [],
        )
    }

    /// Delete an employee. Returns `true` if a row was removed.
    ///
    /// Tasks they executed keep existing with `executor_id` cleared.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool, TaskError> {
        let changed = conn.execute("DELETE FROM employees WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Delete every employee. Returns the number removed.
    pub fn delete_all(conn: &Connection) -> Result<usize, TaskError> {
        Ok(conn.execute("DELETE FROM employees", [])?)
    }

    /// Employees with at least one task, busiest first.
    ///
    /// Ties on task count are broken by ascending employee ID.
    pub fn busy(conn: &Connection) -> Result<Vec<Employee>, TaskError> {
        collect_employees(
            conn,
            &format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM employees e
                 JOIN tasks t ON t.executor_id = e.id
                 GROUP BY e.id
                 ORDER BY COUNT(t.id) DESC, e.id ASC"
            ),
            [],
        )
    }

    /// The employee executing the fewest tasks, zero included.
    ///
    /// Ties are broken by ascending employee ID. `None` if there are no
    /// employees.
    pub fn least_busy(conn: &Connection) -> Result<Option<Employee>, TaskError> {
        let employee = conn
            .query_row(
                &format!(
                    "SELECT {EMPLOYEE_COLUMNS} FROM employees e
                     LEFT JOIN tasks t ON t.executor_id = e.id
                     GROUP BY e.id
                     ORDER BY COUNT(t.id) ASC, e.id ASC
                     LIMIT 1"
                ),
                [],
                employee_from_row,
            )
            .optional()?;
        Ok(employee)
    }

    /// Number of tasks the employee executes.
    pub fn count_tasks_for(conn: &Connection, employee_id: i64) -> Result<i64, TaskError> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE executor_id = ?1",
            params![employee_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// The executor of the given task, if it has one.
    pub fn executor_of(conn: &Connection, task_id: i64) -> Result<Option<Employee>, TaskError> {
        let employee = conn
            .query_row(
                &format!(
                    "SELECT {EMPLOYEE_COLUMNS} FROM employees e
                     JOIN tasks t ON t.executor_id = e.id
                     WHERE t.id = ?1"
                ),
                params![task_id],
                employee_from_row,
            )
            .optional()?;
        Ok(employee)
    }
}

/// Task repository for SQL CRUD operations.
pub struct TaskRepository;

impl TaskRepository {
    /// Insert a task and return the stored row.
    pub fn create(conn: &Connection, params: &TaskCreateParams) -> Result<Task, TaskError> {
        let _ = conn.execute(
            "INSERT INTO tasks (name, parent_task_id, executor_id, deadline, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                params.name,
                params.parent_task_id,
                params.executor_id,
                params.deadline,
                params.status,
            ],
        )?;
        let id = conn.last_insert_rowid();
        Self::get(conn, id)?.ok_or_else(|| TaskError::task_not_found(id))
    }

    /// Get a task by ID.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Task>, TaskError> {
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    /// All tasks in ID order.
    pub fn list(conn: &Connection) -> Result<Vec<Task>, TaskError> {
        collect_tasks(
            conn,
            &format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"),
            [],
        )
    }

    /// Delete a task. Returns `true` if a row was removed.
    ///
    /// Subtasks keep existing with `parent_task_id` cleared.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool, TaskError> {
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Delete every task with the given status. Returns the number removed.
    pub fn delete_with_status(conn: &Connection, status: &str) -> Result<usize, TaskError> {
        Ok(conn.execute("DELETE FROM tasks WHERE status = ?1", params![status])?)
    }

    /// Delete every task. Returns the number removed.
    pub fn delete_all(conn: &Connection) -> Result<usize, TaskError> {
        Ok(conn.execute("DELETE FROM tasks", [])?)
    }

    /// Subtasks that are neither in progress nor assigned, in ID order.
    pub fn unassigned_subtasks(conn: &Connection) -> Result<Vec<Task>, TaskError> {
        collect_tasks(
            conn,
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE status != ?1
                   AND parent_task_id IS NOT NULL
                   AND executor_id IS NULL
                 ORDER BY id"
            ),
            params![STATUS_IN_PROGRESS],
        )
    }

    /// Set the executor and mark the task in progress, unless it already is.
    ///
    /// Returns `false` when no row matched: the task is missing or was
    /// already in progress.
    pub fn start(conn: &Connection, task_id: i64, employee_id: i64) -> Result<bool, TaskError> {
        let changed = conn.execute(
            "UPDATE tasks SET executor_id = ?1, status = ?2
             WHERE id = ?3 AND status != ?2",
            params![employee_id, STATUS_IN_PROGRESS, task_id],
        )?;
        Ok(changed > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn employee_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
    })
}

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_task_id: row.get(2)?,
        executor_id: row.get(3)?,
        deadline: row.get(4)?,
        status: row.get(5)?,
    })
}

fn collect_employees<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Employee>, TaskError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, employee_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn collect_tasks<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Task>, TaskError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, task_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
