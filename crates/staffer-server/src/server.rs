//! `StafferServer`: the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post};
use staffer_tasks::ConnectionPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers::{self, with_conn};
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store handle; each request checks out its own connection.
    pub pool: ConnectionPool,
    /// When the server started.
    pub start_time: Instant,
}

/// The staffer HTTP server.
pub struct StafferServer {
    config: ServerConfig,
    pool: ConnectionPool,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl StafferServer {
    /// Create a new server over an already-migrated pool.
    pub fn new(config: ServerConfig, pool: ConnectionPool) -> Self {
        Self {
            config,
            pool,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            pool: self.pool.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/employees/",
                post(handlers::create_employee).get(handlers::list_employees),
            )
            .route("/employees/{id}", delete(handlers::delete_employee))
            .route(
                "/tasks/",
                post(handlers::create_task).get(handlers::list_tasks),
            )
            .route("/tasks/{id}", delete(handlers::delete_task))
            .route("/important_tasks", get(handlers::important_tasks))
            .route("/busy_employees", get(handlers::busy_employees))
            .route("/assign_task", post(handlers::assign_task))
            .route("/cleanup", delete(handlers::cleanup))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind the listener and serve until the shutdown token is cancelled.
    ///
    /// Returns the bound address (useful with port `0`) and the server task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await;
            if let Err(e) = result {
                warn!(error = %e, "server stopped with error");
            }
        });

        info!(%addr, "staffer server listening");
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the store handle.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let probe = with_conn(&state.pool, |conn| {
        let _: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(())
    })
    .await
    .map_err(|e| e.to_string());

    let resp = health::health_check(state.start_time, probe);
    let status = if resp.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use staffer_tasks::{ConnectionConfig, new_in_memory, run_migrations};
    use tower::ServiceExt;

    fn make_server() -> StafferServer {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        run_migrations(&pool.get().unwrap()).unwrap();
        StafferServer::new(ServerConfig::default(), pool)
    }

    #[test]
    fn server_with_default_config() {
        let server = make_server();
        assert_eq!(server.config().host, "127.0.0.1");
        assert_eq!(server.config().port, 0);
        assert!(!server.shutdown().is_shutting_down());
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let server = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["database"], "ok");
        assert!(parsed["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let server = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listen_binds_and_shuts_down() {
        let server = make_server();
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);

        server.shutdown().shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
