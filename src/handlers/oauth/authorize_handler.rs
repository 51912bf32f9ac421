use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use oauth2::{CsrfToken, PkceCodeChallenge};
use tower_sessions::Session;

use super::PENDING_LOGIN_KEY;
use crate::error::AppError;
use crate::models::AppState;
use crate::models::oauth::PendingLogin;

pub async fn authorize_handler(
    State(app_state): State<AppState>,
    login: Session,
) -> Result<Response, AppError> {
    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_token = match &app_state.config.callback_token {
        Some(token) => CsrfToken::new(token.clone()),
        None => CsrfToken::new_random(),
    };

    let url = app_state
        .config
        .authorization_url(csrf_token.secret(), pkce_challenge.as_str());

    let pending = PendingLogin {
        csrf_token_secret: csrf_token.secret().to_string(),
        pkce_verifier_secret: pkce_verifier.secret().to_string(),
    };
    login.insert(PENDING_LOGIN_KEY, pending).await?;

    tracing::debug!(session_id = ?login.id(), "Pending login stored, redirecting to SoundCloud");
    Ok((StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode, header};
    use reqwest::Url;

    use crate::handlers::oauth::LOGIN_COOKIE;
    use crate::test_support::{CLIENT_ID, TestApp, cookie_pair};

    fn query(location: &str, key: &str) -> Option<String> {
        Url::parse(location)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn test_redirect_carries_configured_state() {
        let app = TestApp::with_callback_token("http://127.0.0.1:9", Some("testToken")).await;

        let response = app.post("/authorize", None).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("http://127.0.0.1:9/connect?"));
        assert_eq!(query(location, "state").as_deref(), Some("testToken"));
        assert_eq!(query(location, "client_id").as_deref(), Some(CLIENT_ID));
        assert_eq!(
            query(location, "redirect_uri").as_deref(),
            Some("http://localhost:3000/oauth2callback")
        );
        assert!(query(location, "code_challenge").is_some());
        assert!(cookie_pair(&response, LOGIN_COOKIE).is_some());
    }

    #[tokio::test]
    async fn test_fresh_state_per_request() {
        let app = TestApp::new("http://127.0.0.1:9").await;

        let first = app.post("/authorize", None).await;
        let second = app.post("/authorize", None).await;

        let state = |r: &axum::response::Response| {
            query(r.headers()[header::LOCATION].to_str().unwrap(), "state").unwrap()
        };
        let (a, b) = (state(&first), state(&second));
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_get_not_allowed() {
        let app = TestApp::new("http://127.0.0.1:9").await;

        let response = app.request(Method::GET, "/authorize", None).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
