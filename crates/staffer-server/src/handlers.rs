//! Route handlers.
//!
//! Every handler checks a connection out of the pool inside
//! `spawn_blocking`; the connection goes back to the pool when the closure
//! returns, whatever the outcome. Extractor rejections are turned into
//! [`ApiError::Validation`] so malformed input also gets a `{code, message}`
//! body.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use staffer_tasks::{
    AssignedTask, AssignmentService, ConnectionPool, Employee, EmployeeCreateParams,
    EmployeeRepository, Recommendation, Task, TaskCreateParams, TaskError, TaskRepository,
};
use tokio::task;
use tracing::instrument;

use crate::error::ApiError;
use crate::server::AppState;

/// `{message}` body for deletes and cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Query parameters of `POST /assign_task`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignParams {
    /// Employee to assign.
    pub employee_id: i64,
    /// Task to start.
    pub task_id: i64,
}

/// Run `f` against a pooled connection on the blocking thread pool.
pub async fn with_conn<T, F>(pool: &ConnectionPool, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, TaskError> + Send + 'static,
{
    let pool = pool.clone();
    task::spawn_blocking(move || {
        let conn = pool.get()?;
        f(&conn)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
    .map_err(ApiError::from)
}

// ── Employees ───────────────────────────────────────────────────────────────

/// POST /employees/
#[instrument(skip(state))]
pub async fn create_employee(
    State(state): State<AppState>,
    params: Result<Json<EmployeeCreateParams>, JsonRejection>,
) -> Result<Json<Employee>, ApiError> {
    let Json(params) = params?;
    let employee = with_conn(&state.pool, move |conn| {
        AssignmentService::create_employee(conn, &params)
    })
    .await?;
    Ok(Json(employee))
}

/// GET /employees/
pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    Ok(Json(with_conn(&state.pool, EmployeeRepository::list).await?))
}

/// DELETE /employees/{id}
#[instrument(skip(state))]
pub async fn delete_employee(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    with_conn(&state.pool, move |conn| AssignmentService::delete_employee(conn, id)).await?;
    Ok(MessageResponse::new("Employee deleted"))
}

// ── Tasks ───────────────────────────────────────────────────────────────────

/// POST /tasks/
#[instrument(skip(state))]
pub async fn create_task(
    State(state): State<AppState>,
    params: Result<Json<TaskCreateParams>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(params) = params?;
    let task = with_conn(&state.pool, move |conn| {
        AssignmentService::create_task(conn, &params)
    })
    .await?;
    Ok(Json(task))
}

/// GET /tasks/
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(with_conn(&state.pool, TaskRepository::list).await?))
}

/// DELETE /tasks/{id}
#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    with_conn(&state.pool, move |conn| AssignmentService::delete_task(conn, id)).await?;
    Ok(MessageResponse::new("Task deleted"))
}

// ── Derived queries ─────────────────────────────────────────────────────────

/// GET /important_tasks
pub async fn important_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    Ok(Json(
        with_conn(&state.pool, AssignmentService::important_tasks).await?,
    ))
}

/// GET /busy_employees
pub async fn busy_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    Ok(Json(with_conn(&state.pool, EmployeeRepository::busy).await?))
}

// ── Mutations ───────────────────────────────────────────────────────────────

/// POST /assign_task?employee_id=..&task_id=..
#[instrument(skip(state))]
pub async fn assign_task(
    State(state): State<AppState>,
    params: Result<Query<AssignParams>, QueryRejection>,
) -> Result<Json<AssignedTask>, ApiError> {
    let Query(params) = params?;
    let assigned = with_conn(&state.pool, move |conn| {
        AssignmentService::assign_task(conn, params.employee_id, params.task_id)
    })
    .await?;
    Ok(Json(assigned))
}

/// DELETE /cleanup
#[instrument(skip(state))]
pub async fn cleanup(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    let _report = with_conn(&state.pool, AssignmentService::cleanup).await?;
    Ok(MessageResponse::new("All tasks and employees deleted"))
}
