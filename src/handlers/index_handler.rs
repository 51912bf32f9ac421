use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::error::AppError;
use crate::models::{AppConfig, AppState};

pub async fn index_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    render_layout(&app_state.config).await
}

/// Reads the landing page from disk on every request.
pub async fn render_layout(config: &AppConfig) -> Result<Html<String>, AppError> {
    tokio::fs::read_to_string(&config.layout_path)
        .await
        .map(Html)
        .map_err(AppError::Layout)
}
