use serde::{Deserialize, Serialize};

/// Login attempt started by `/authorize`, consumed by the callback.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PendingLogin {
    pub csrf_token_secret: String,
    pub pkce_verifier_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Token endpoint response. Only `access_token` is required; SoundCloud omits
/// `token_type` for non-expiring tokens.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}
