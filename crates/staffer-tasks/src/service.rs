//! Business logic layer for staffing tasks.
//!
//! Wraps the repository with validation, the executor recommendation
//! heuristic, and the one-way assignment transition. Key rules:
//!
//! - **Recommendations are read-only**: every unassigned subtask gets a
//!   proposed executor computed inside one read transaction.
//! - **Parent affinity**: the parent task's executor is preferred unless they
//!   carry more than [`PARENT_EXECUTOR_TOLERANCE`] tasks beyond the
//!   least-busy employee.
//! - **Assignment is one-way**: a task already [`STATUS_IN_PROGRESS`] cannot
//!   be assigned again.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info};

use crate::errors::TaskError;
use crate::repository::{EmployeeRepository, TaskRepository};
use crate::types::{
    AssignedTask, CleanupReport, Employee, EmployeeCreateParams, Recommendation,
    STATUS_COMPLETED, STATUS_IN_PROGRESS, Task, TaskCreateParams,
};

/// Extra tasks the parent's executor may carry over the least-busy employee
/// and still be recommended.
pub const PARENT_EXECUTOR_TOLERANCE: i64 = 2;

/// Employee/task service with validation and assignment rules.
pub struct AssignmentService;

impl AssignmentService {
    // ─────────────────────────────────────────────────────────────────────
    // Creation and deletion
    // ─────────────────────────────────────────────────────────────────────

    /// Create an employee after checking the name is present.
    pub fn create_employee(
        conn: &Connection,
        params: &EmployeeCreateParams,
    ) -> Result<Employee, TaskError> {
        require_text("name", &params.name)?;
        let employee = EmployeeRepository::create(conn, params)?;
        debug!(employee_id = employee.id, "employee created");
        Ok(employee)
    }

    /// Create a task after checking required text and that every
    /// referenced record exists.
    ///
    /// A new task can only point at tasks that already exist, so the parent
    /// relation stays acyclic without a separate walk.
    pub fn create_task(conn: &Connection, params: &TaskCreateParams) -> Result<Task, TaskError> {
        require_text("name", &params.name)?;
        require_text("status", &params.status)?;

        if let Some(parent_id) = params.parent_task_id {
            if TaskRepository::get(conn, parent_id)?.is_none() {
                return Err(TaskError::Validation(format!(
                    "parent task {parent_id} does not exist"
                )));
            }
        }
        if let Some(executor_id) = params.executor_id {
            if EmployeeRepository::get(conn, executor_id)?.is_none() {
                return Err(TaskError::Validation(format!(
                    "executor {executor_id} does not exist"
                )));
            }
        }

        let task = TaskRepository::create(conn, params)?;
        debug!(task_id = task.id, parent_task_id = ?task.parent_task_id, "task created");
        Ok(task)
    }

    /// Delete an employee, failing with `NotFound` if there was none.
    pub fn delete_employee(conn: &Connection, id: i64) -> Result<(), TaskError> {
        if EmployeeRepository::delete(conn, id)? {
            Ok(())
        } else {
            Err(TaskError::employee_not_found(id))
        }
    }

    /// Delete a task, failing with `NotFound` if there was none.
    pub fn delete_task(conn: &Connection, id: i64) -> Result<(), TaskError> {
        if TaskRepository::delete(conn, id)? {
            Ok(())
        } else {
            Err(TaskError::task_not_found(id))
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Recommendations
    // ─────────────────────────────────────────────────────────────────────

    /// Propose an executor for every unassigned subtask that is not in
    /// progress. Never mutates state.
    pub fn important_tasks(conn: &Connection) -> Result<Vec<Recommendation>, TaskError> {
        let tx = conn.unchecked_transaction()?;
        let candidates = TaskRepository::unassigned_subtasks(&tx)?;

        let mut recommendations = Vec::with_capacity(candidates.len());
        for task in candidates {
            let executor = Self::recommend_executor(&tx, &task)?;
            recommendations.push(Recommendation {
                employee_name: executor.map(|e| e.name),
                task_name: task.name,
            });
        }

        tx.commit()?;
        Ok(recommendations)
    }

    /// Pick the executor for one task: the parent's executor when their load
    /// is within tolerance of the least-busy employee, else the least-busy
    /// employee. `None` only when there are no employees.
    pub fn recommend_executor(
        conn: &Connection,
        task: &Task,
    ) -> Result<Option<Employee>, TaskError> {
        let Some(least) = EmployeeRepository::least_busy(conn)? else {
            return Ok(None);
        };

        let parent_executor = match task.parent_task_id {
            Some(parent_id) => EmployeeRepository::executor_of(conn, parent_id)?,
            None => None,
        };

        let Some(parent_executor) = parent_executor else {
            return Ok(Some(least));
        };

        let parent_load = EmployeeRepository::count_tasks_for(conn, parent_executor.id)?;
        let least_load = EmployeeRepository::count_tasks_for(conn, least.id)?;
        debug!(
            task_id = task.id,
            parent_executor = parent_executor.id,
            parent_load,
            least_busy = least.id,
            least_load,
            "comparing executor loads"
        );

        if parent_load <= least_load + PARENT_EXECUTOR_TOLERANCE {
            Ok(Some(parent_executor))
        } else {
            Ok(Some(least))
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Assign a task to an employee and mark it in progress.
    ///
    /// Fails with `NotFound` if either record is missing and with `Conflict`
    /// if the task is already in progress. The status check and the update
    /// happen in one write transaction with a conditional `UPDATE`, so of two
    /// concurrent calls on the same task only one succeeds.
    pub fn assign_task(
        conn: &Connection,
        employee_id: i64,
        task_id: i64,
    ) -> Result<AssignedTask, TaskError> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

        let employee = EmployeeRepository::get(&tx, employee_id)?
            .ok_or_else(|| TaskError::employee_not_found(employee_id))?;
        let task = TaskRepository::get(&tx, task_id)?
            .ok_or_else(|| TaskError::task_not_found(task_id))?;

        if task.is_in_progress() || !TaskRepository::start(&tx, task_id, employee_id)? {
            return Err(TaskError::Conflict(format!(
                "task {task_id} is already {STATUS_IN_PROGRESS}"
            )));
        }

        tx.commit()?;
        info!(employee_id, task_id, "task assigned");

        Ok(AssignedTask {
            employee_name: employee.name,
            task_name: task.name,
        })
    }

    /// Remove completed tasks, then every task, then every employee.
    pub fn cleanup(conn: &Connection) -> Result<CleanupReport, TaskError> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let report = CleanupReport {
            completed_tasks: TaskRepository::delete_with_status(&tx, STATUS_COMPLETED)?,
            tasks: TaskRepository::delete_all(&tx)?,
            employees: EmployeeRepository::delete_all(&tx)?,
        };
        tx.commit()?;

        info!(
            completed_tasks = report.completed_tasks,
            tasks = report.tasks,
            employees = report.employees,
            "cleanup complete"
        );
        Ok(report)
    }
}

fn require_text(field: &str, value: &str) -> Result<(), TaskError> {
    if value.trim().is_empty() {
        return Err(TaskError::Validation(format!("{field} is required")));
    }
    Ok(())
}
