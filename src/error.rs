use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::session::SessionError;

/// Errors a request can end with. Each one maps to a single response; the
/// handler returns as soon as it is raised.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Returned state token does not match.")]
    StateMismatch,

    #[error("No login in progress for this browser. Please try logging in again.")]
    NoPendingLogin,

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Failed to exchange token: {0}")]
    TokenExchange(String),

    #[error("No token in session")]
    MissingToken,

    #[error("Failed to fetch activities: {0}")]
    Upstream(String),

    #[error("Failed to load layout.html.")]
    Layout(#[source] std::io::Error),

    #[error("Session error: {0}")]
    Session(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::StateMismatch | AppError::NoPendingLogin | AppError::AuthorizationDenied(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::TokenExchange(_)
            | AppError::MissingToken
            | AppError::Layout(_)
            | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err.to_string())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AppError::Session(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        (status, self.to_string()).into_response()
    }
}
