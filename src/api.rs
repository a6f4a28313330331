//! HTTP API handlers for the intake service.
//!
//! The API drives the single [`Shell`] session. Every mutating endpoint
//! answers with the screen rendered after the change.
//!
//! Narrative text and passwords are never logged.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::error::ShellError;
use crate::gate::GateOutcome;
use crate::model::UserData;
use crate::shell::Shell;
use crate::view::Screen;
use crate::widgets::{FieldEdit, FieldId};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<Shell>,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Alert to show the user, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<&'static str>,
    /// Labels of empty required fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<&'static str>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(err: ShellError) -> ApiError {
    let status = match &err {
        ShellError::NotEditable(_) => StatusCode::CONFLICT,
        ShellError::MissingRequired(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ShellError::Widget(_) => StatusCode::BAD_REQUEST,
        ShellError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ShellError::AdminLocked => StatusCode::FORBIDDEN,
        ShellError::RecordNotFound(_) => StatusCode::NOT_FOUND,
    };
    warn!(status = status.as_u16(), error = %err, "Request rejected");

    let missing = match &err {
        ShellError::MissingRequired(fields) => fields.clone(),
        _ => Vec::new(),
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            alert: None,
            missing,
        }),
    )
}

/// Build the router with all routes and middleware.
pub fn router(shell: Arc<Shell>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/screen", get(get_screen))
        .route("/form/fields/:field", post(post_field))
        .route("/form/submit", post(post_submit))
        .route("/form/reset", post(post_reset))
        .route("/view/admin", post(post_unlock_admin))
        .route("/view/entry", post(post_show_entry))
        .route("/admin/records", get(get_records))
        .route("/admin/records/:id", get(get_record))
        .with_state(AppState { shell })
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /screen - The screen for the current state.
pub async fn get_screen(State(state): State<AppState>) -> Json<Screen> {
    Json(state.shell.screen().await)
}

/// POST /form/fields/:field - Apply one edit to a form field.
///
/// # Request Body
///
/// One of:
///
/// ```json
/// { "input": "15032025" }
/// { "toggle": "BAG" }
/// { "select": "W" }
/// ```
#[instrument(skip(state, edit))]
pub async fn post_field(
    State(state): State<AppState>,
    Path(field): Path<FieldId>,
    Json(edit): Json<FieldEdit>,
) -> Result<Json<Screen>, ApiError> {
    state.shell.edit(field, edit).await.map_err(reject)?;
    Ok(Json(state.shell.screen().await))
}

/// POST /form/submit - Submit the form.
///
/// Responds once enrichment has settled and the record is stored, with the
/// success panel. An enrichment failure still yields the success panel with
/// the fallback summary.
#[instrument(skip(state))]
pub async fn post_submit(State(state): State<AppState>) -> Result<Json<Screen>, ApiError> {
    // Run detached so a dropped connection cannot strand the form in SUBMITTING.
    let shell = state.shell.clone();
    let outcome = tokio::spawn(async move { shell.submit().await })
        .await
        .map_err(|e| {
            warn!(error = %e, "Submission task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "submission task failed".to_string(),
                    alert: None,
                    missing: Vec::new(),
                }),
            )
        })?;

    let analysis = outcome.map_err(reject)?;
    info!(fallback = analysis.is_fallback(), "Submission completed");
    Ok(Json(state.shell.screen().await))
}

/// POST /form/reset - Clear the form and return to the idle entry form.
pub async fn post_reset(State(state): State<AppState>) -> Result<Json<Screen>, ApiError> {
    state.shell.reset().await.map_err(reject)?;
    Ok(Json(state.shell.screen().await))
}

/// Request body for POST /view/admin.
#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}

/// POST /view/admin - Open the admin view.
///
/// A wrong password answers `401` with `{"alert": "Erro"}` and leaves the
/// view unchanged.
pub async fn post_unlock_admin(
    State(state): State<AppState>,
    Json(request): Json<UnlockRequest>,
) -> Result<Json<Screen>, ApiError> {
    match state.shell.unlock_admin(&request.password).await {
        GateOutcome::Granted => Ok(Json(state.shell.screen().await)),
        GateOutcome::Denied { alert } => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "wrong admin password".to_string(),
                alert: Some(alert),
                missing: Vec::new(),
            }),
        )),
    }
}

/// POST /view/entry - Back to the entry form.
pub async fn post_show_entry(State(state): State<AppState>) -> Json<Screen> {
    state.shell.show_entry().await;
    Json(state.shell.screen().await)
}

/// Response for GET /admin/records.
#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub count: usize,
    /// Newest first.
    pub records: Vec<UserData>,
}

/// GET /admin/records - Every stored record. Requires the admin view.
pub async fn get_records(State(state): State<AppState>) -> Result<Json<RecordsResponse>, ApiError> {
    let records = state.shell.records().await.map_err(reject)?;
    Ok(Json(RecordsResponse {
        count: records.len(),
        records,
    }))
}

/// GET /admin/records/:id - One record in full. Requires the admin view.
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserData>, ApiError> {
    let record = state.shell.record(&id).await.map_err(reject)?;
    Ok(Json(record))
}
