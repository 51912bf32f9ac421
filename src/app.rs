use axum::{
    Router,
    routing::{get, post},
};
use time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::handlers::oauth::LOGIN_COOKIE;
use crate::handlers::{authorize_handler, callback_handler, index_handler, stream_handler};
use crate::models::AppState;
use crate::session::PendingLoginStore;

/// How long a started login may sit idle before its state is forgotten.
const LOGIN_TTL_MINUTES: i64 = 10;

pub fn router(app_state: AppState) -> Router {
    let login_store = PendingLoginStore::new(app_state.config.max_pending_logins);
    let login_layer = SessionManagerLayer::new(login_store)
        .with_name(LOGIN_COOKIE)
        .with_secure(app_state.config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(LOGIN_TTL_MINUTES)));

    let public = ServeDir::new(&app_state.config.public_dir);

    Router::new()
        .route("/", get(index_handler))
        .route("/stream", get(stream_handler))
        .route("/oauth2callback", get(callback_handler))
        .route("/authorize", post(authorize_handler))
        .nest_service("/public", public)
        .layer(CookieManagerLayer::new())
        .layer(login_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(app_state)
}
