use sha2::{Digest, Sha512};
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies, Key};

use super::{SESSION_COOKIE, Session, SessionError, SessionStore};

/// Derives the cookie encryption key from an arbitrary length secret.
pub fn session_key(secret: &[u8]) -> Result<Key, SessionError> {
    let digest = Sha512::digest(secret);
    Key::try_from(digest.as_slice()).map_err(|e| SessionError::Key(e.to_string()))
}

/// Keeps the whole session in one private (encrypted and authenticated) cookie.
#[derive(Clone)]
pub struct CookieSessionStore {
    name: String,
    key: Key,
    secure: bool,
}

impl CookieSessionStore {
    pub fn new(key: Key) -> Self {
        Self {
            name: SESSION_COOKIE.to_string(),
            key,
            secure: false,
        }
    }

    pub fn from_secret(secret: &[u8]) -> Result<Self, SessionError> {
        Ok(Self::new(session_key(secret)?))
    }

    pub fn generate() -> Self {
        Self::new(Key::generate())
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl SessionStore for CookieSessionStore {
    fn get(&self, cookies: &Cookies) -> Session {
        let Some(cookie) = cookies.private(&self.key).get(&self.name) else {
            return Session::default();
        };

        match serde_json::from_str(cookie.value()) {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(error = %e, "Discarding undecodable session cookie");
                Session::default()
            }
        }
    }

    fn save(&self, cookies: &Cookies, session: &Session) -> Result<(), SessionError> {
        let value = serde_json::to_string(session)?;

        let mut cookie = Cookie::new(self.name.clone(), value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.secure);

        cookies.private(&self.key).add(cookie);
        Ok(())
    }
}
