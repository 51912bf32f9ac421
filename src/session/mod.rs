//! Per-browser session state.
//!
//! Handlers only see the [`SessionStore`] capability, so the backend (an
//! encrypted cookie today) can be swapped for a server-side store without
//! touching them.

mod cookie_store;
mod pending_store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

pub use cookie_store::{CookieSessionStore, session_key};
pub use pending_store::PendingLoginStore;

/// Name of the cookie holding the session.
pub const SESSION_COOKIE: &str = "sndcld";

/// Session key the upstream access token is stored under.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid session key: {0}")]
    Key(String),
}

/// String to string mapping carried for one browser.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    values: BTreeMap<String, String>,
}

impl Session {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

pub trait SessionStore: Send + Sync + 'static {
    /// Loads the session attached to the request, or an empty one.
    fn get(&self, cookies: &Cookies) -> Session;

    /// Persists `session` so it travels with the response.
    fn save(&self, cookies: &Cookies, session: &Session) -> Result<(), SessionError>;
}
