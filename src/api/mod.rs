//! HTTP API
//!
//! ```text
//! /
//! ├── /schedules/*       - Shift CRUD and schedule views
//! ├── /substitutions/*   - Substitution requests and their lifecycle
//! └── /health            - Liveness
//! ```
//!
//! Identity arrives in the `x-user-id` header from an upstream gateway and
//! is resolved against the directory on every call. Handlers run the role
//! gate before they look at the body or query, so an anonymous caller always
//! sees 401 and a caller with the wrong role always sees 403. Every failure
//! renders as `{"error": CODE, "message": ...}` via [`SchedulerError`]'s
//! `IntoResponse`.

mod schedules;
mod substitutions;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tokio::signal;

use crate::app::{AppServices, AppState};
use crate::auth::{authorize, require_authenticated, Caller, Operation};
use crate::errors::{Result, SchedulerError};
use crate::schemas::Config;
use crate::store::Store;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Build the complete router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(schedule_router())
        .merge(substitution_router())
        .route("/health", get(health))
        .with_state(state)
}

/// Schedule routes
///
/// - `POST   /schedules` - Create one shift (owner)
/// - `POST   /schedules/template` - Generate shifts over a date range (owner)
/// - `GET    /schedules/week` - Every shift in an ISO week (owner)
/// - `GET    /schedules/mine` - Caller's shifts
/// - `GET    /schedules/mine/summary` - Caller's weekly hours and upcoming count
/// - `PUT    /schedules/:id` - Edit date or times (owner)
/// - `DELETE /schedules/:id` - Delete a shift (owner)
fn schedule_router() -> Router<AppState> {
    Router::new()
        .route("/schedules", post(schedules::create_shift))
        .route("/schedules/template", post(schedules::create_from_template))
        .route("/schedules/week", get(schedules::list_week))
        .route("/schedules/mine", get(schedules::list_mine))
        .route("/schedules/mine/summary", get(schedules::personal_summary))
        .route(
            "/schedules/:id",
            put(schedules::update_shift).delete(schedules::delete_shift),
        )
}

/// Substitution routes
///
/// - `GET    /substitutions` - Staff board, or a filtered list with `?mode=`
/// - `POST   /substitutions/:shift_id` - Request a substitute for a shift
/// - `PUT    /substitutions/:id` - Edit the reason (requester)
/// - `DELETE /substitutions/:id` - Cancel (requester)
/// - `PATCH  /substitutions/:id/recruit` - Open for covering staff (owner)
/// - `PATCH  /substitutions/:id/accept` - Volunteer to cover
/// - `PATCH  /substitutions/:id/finalize` - Reassign the shift (owner)
fn substitution_router() -> Router<AppState> {
    Router::new()
        .route("/substitutions", get(substitutions::list))
        .route(
            "/substitutions/:id",
            post(substitutions::request)
                .put(substitutions::edit_reason)
                .delete(substitutions::cancel),
        )
        .route("/substitutions/:id/recruit", patch(substitutions::approve_recruit))
        .route("/substitutions/:id/accept", patch(substitutions::accept))
        .route("/substitutions/:id/finalize", patch(substitutions::finalize))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Resolve the caller from the identity header
pub(crate) fn caller(state: &AppServices, headers: &HeaderMap) -> Result<Caller> {
    let user_id = headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok());
    state.directory.resolve_caller(user_id)
}

/// Resolve the caller and check the role rule for `operation`
pub(crate) fn require(
    state: &AppServices,
    headers: &HeaderMap,
    operation: Operation,
) -> Result<Caller> {
    let caller = caller(state, headers)?;
    authorize(&caller, operation)?;
    Ok(caller)
}

/// Resolve the caller, requiring only that it is authenticated
pub(crate) fn require_caller(state: &AppServices, headers: &HeaderMap) -> Result<Caller> {
    let caller = caller(state, headers)?;
    require_authenticated(&caller)?;
    Ok(caller)
}

/// Run a service call on the blocking pool.
///
/// Store transactions clone the tables and write the snapshot file while
/// holding a std lock; none of that may run on an async worker thread.
pub(crate) async fn blocking<T, F>(state: AppState, f: F) -> Result<T>
where
    F: FnOnce(&AppServices) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| SchedulerError::Storage(format!("spawn_blocking failed: {}", e)))?
}

/// Unwrap a JSON body, turning extractor rejections into validation errors
pub(crate) fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| SchedulerError::Validation(rejection.body_text()))
}

/// Open the store, bind, and serve until SIGINT or SIGTERM
pub async fn serve(config: &Config, data_path: &std::path::Path) -> Result<()> {
    let store = Arc::new(Store::open(data_path)?);
    let services = AppServices::new(config, store)?;
    let app = build_router(Arc::new(services));

    let addr: SocketAddr = config.bind_addr.parse().map_err(|e| {
        SchedulerError::ConfigError(format!("Invalid bind address {}: {}", config.bind_addr, e))
    })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, data_path = %data_path.display(), "shiftswap listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shiftswap stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => tracing::error!("failed to install SIGTERM handler: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
