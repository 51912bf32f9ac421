use axum::{
    extract::{Query, State},
    response::Html,
};
use reqwest::header::ACCEPT;
use subtle::ConstantTimeEq;
use tower_cookies::Cookies;
use tower_sessions::Session;

use super::PENDING_LOGIN_KEY;
use crate::error::AppError;
use crate::handlers::index_handler::render_layout;
use crate::models::AppState;
use crate::models::oauth::{CallbackParams, PendingLogin, TokenResponse};
use crate::session::TOKEN_KEY;

pub async fn callback_handler(
    Query(params): Query<CallbackParams>,
    State(app_state): State<AppState>,
    login: Session,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    // Removed before comparing so a state value is only ever accepted once.
    let pending = login
        .remove::<PendingLogin>(PENDING_LOGIN_KEY)
        .await?
        .ok_or(AppError::NoPendingLogin)?;

    let expected = pending.csrf_token_secret.as_bytes();
    if !bool::from(expected.ct_eq(params.state.as_bytes())) {
        return Err(AppError::StateMismatch);
    }

    if let Some(error) = params.error {
        let reason = params.error_description.unwrap_or(error);
        return Err(AppError::AuthorizationDenied(reason));
    }

    let token = exchange_code(&app_state, &params.code, &pending.pkce_verifier_secret).await?;
    if token.refresh_token.is_some() {
        tracing::debug!("Token endpoint returned a refresh token; it is not kept");
    }

    let mut session = app_state.sessions.get(&cookies);
    session.set(TOKEN_KEY, token.access_token);
    app_state.sessions.save(&cookies, &session)?;

    tracing::info!(scope = ?token.scope, expires_in = ?token.expires_in, "SoundCloud login completed");
    render_layout(&app_state.config).await
}

async fn exchange_code(
    app_state: &AppState,
    code: &str,
    pkce_verifier: &str,
) -> Result<TokenResponse, AppError> {
    let config = &app_state.config;
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("code_verifier", pkce_verifier),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_url.as_str()),
    ];

    let response = app_state
        .http
        .post(config.endpoints.token_url.clone())
        .header(ACCEPT, "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| AppError::TokenExchange(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error body".to_string());
        return Err(AppError::TokenExchange(format!("HTTP {status} - {error_text}")));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| AppError::TokenExchange(format!("invalid token response: {e}")))
}
