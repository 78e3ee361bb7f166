// HTTP request handlers
use crate::application::dashboard_service::{DashboardError, DashboardSnapshot};
use crate::domain::repository::Repository;
use crate::domain::settings::Settings;
use crate::presentation::app_state::AppState;
use crate::presentation::grid::{DashboardView, build_dashboard_view};
use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

type HandlerResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Render model for the whole dashboard
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> HandlerResult<DashboardView> {
    let snapshot = state.dashboard_service.snapshot().await.map_err(error_response)?;
    Ok(Json(render(&state, &snapshot)))
}

/// Settings with group memberships filled in
pub async fn get_settings(State(state): State<Arc<AppState>>) -> HandlerResult<Settings> {
    let snapshot = state.dashboard_service.snapshot().await.map_err(error_response)?;
    Ok(Json(snapshot.settings))
}

/// Every selected repository with its deployments
pub async fn list_repositories(State(state): State<Arc<AppState>>) -> HandlerResult<Vec<Repository>> {
    let snapshot = state.dashboard_service.snapshot().await.map_err(error_response)?;
    Ok(Json(snapshot.repositories.into_values().collect()))
}

/// Drop cached data and rebuild the dashboard
pub async fn refresh_dashboard(State(state): State<Arc<AppState>>) -> HandlerResult<DashboardView> {
    let snapshot = state.dashboard_service.refresh().await.map_err(error_response)?;
    Ok(Json(render(&state, &snapshot)))
}

fn render(state: &AppState, snapshot: &DashboardSnapshot) -> DashboardView {
    tracing::debug!(
        "Rendering dashboard from {:?} data fetched at {}",
        snapshot.status,
        snapshot.fetched_at
    );
    build_dashboard_view(
        &snapshot.settings,
        &snapshot.repositories,
        &state.labels,
        snapshot.fetched_at,
    )
}

// Settings problems are local; hosting API and pool failures are upstream
fn error_response(err: DashboardError) -> (StatusCode, String) {
    let status = match &err {
        DashboardError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DashboardError::Aggregation(_) => StatusCode::BAD_GATEWAY,
    };
    tracing::error!("Error building dashboard ({}): {}", status, err);
    (status, err.to_string())
}
