use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    body::Body,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use common::dashboard_config::DashboardConfig;
use tracing::info;

/// Read the dashboard configuration file, returning both the raw JSON and its parsed form.
pub async fn load_config_json(path: impl AsRef<Path>) -> anyhow::Result<(String, DashboardConfig)> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read dashboard configuration {}", path.display()))?;
    let config = DashboardConfig::from_json(&json)?;
    info!("Loaded dashboard configuration from {}", path.display());
    Ok((json, config))
}

pub fn router(config_json: String) -> Router {
    Router::new()
        .route("/config", get(get_config))
        .with_state(Arc::new(config_json))
}

pub async fn get_config(State(config_json): State<Arc<String>>) -> Response {
    if config_json.trim().is_empty() {
        tracing::error!("get_config: no configuration loaded");
        return (StatusCode::INTERNAL_SERVER_ERROR, Body::from("no configuration loaded")).into_response();
    }
    let headers = [("Content-Type", "application/json; charset=utf-8")];
    (headers, Body::from(config_json.as_str().to_string())).into_response()
}
