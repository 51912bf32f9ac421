use axum::{
    body::Body,
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::error::AppError;
use crate::models::AppState;
use crate::session::TOKEN_KEY;

const ACTIVITY_LIMIT: &str = "25";

/// Proxies the user's activity feed. The upstream status, content type and
/// body are passed through untouched.
pub async fn stream_handler(
    State(app_state): State<AppState>,
    cookies: Cookies,
) -> Result<Response, AppError> {
    let session = app_state.sessions.get(&cookies);
    let token = session.get(TOKEN_KEY).ok_or(AppError::MissingToken)?;

    let mut url = app_state.config.endpoints.activities_url.clone();
    url.query_pairs_mut()
        .append_pair("limit", ACTIVITY_LIMIT)
        .append_pair("oauth_token", token);

    let upstream = app_state
        .http
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Upstream(e.without_url().to_string()))?;

    let status = upstream.status();
    if !status.is_success() {
        tracing::warn!(%status, "Activities endpoint returned an error status");
    }

    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let body = Body::from_stream(upstream.bytes_stream());

    let mut response = (status, body).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}
