use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use reqwest::Url;

use crate::session::{CookieSessionStore, SessionStore};

pub const DEFAULT_AUTHORIZE_URL: &str = "https://soundcloud.com/connect";
pub const DEFAULT_TOKEN_URL: &str = "https://api.soundcloud.com/oauth2/token";
pub const DEFAULT_ACTIVITIES_URL: &str = "https://api.soundcloud.com/me/activities";
pub const DEFAULT_SCOPE: &str = "non-expiring";

/// Command line flags. Every flag can also be supplied through the environment
/// (or a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SoundCloud client id
    #[arg(long, env = "SOUNDCLOUD_CLIENT_ID")]
    pub client_id: String,

    /// SoundCloud client secret
    #[arg(long, env = "SOUNDCLOUD_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Port to bind the server on
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Fixed OAuth state token. Unlike older releases there is no `testToken`
    /// default: when unset, a fresh random state is issued for every login
    #[arg(long, env = "CALLBACK_TOKEN")]
    pub callback_token: Option<String>,

    /// Public URL of the app, used to build the OAuth redirect URL
    #[arg(long, env = "APP_URL", default_value = "http://localhost:3000")]
    pub app_url: String,

    /// Secret the session cookie key is derived from
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Upper bound on logins in flight; the least recent is dropped beyond it
    #[arg(long, env = "MAX_PENDING_LOGINS", default_value_t = 10_000)]
    pub max_pending_logins: usize,

    /// Landing page served on `/` and after login
    #[arg(long, value_name = "FILE", default_value = "./layout.html")]
    pub layout: PathBuf,

    /// Directory served under `/public`
    #[arg(long, value_name = "DIR", default_value = "./public")]
    pub public_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name} URL {value:?}: {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid session secret: {0}")]
    SessionKey(String),
}

/// Third-party endpoints the server talks to.
#[derive(Clone, Debug)]
pub struct UpstreamEndpoints {
    pub authorize_url: Url,
    pub token_url: Url,
    pub activities_url: Url,
}

impl UpstreamEndpoints {
    pub fn new(authorize_url: &str, token_url: &str, activities_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            authorize_url: parse_url("authorize", authorize_url)?,
            token_url: parse_url("token", token_url)?,
            activities_url: parse_url("activities", activities_url)?,
        })
    }

    pub fn soundcloud() -> Result<Self, ConfigError> {
        Self::new(DEFAULT_AUTHORIZE_URL, DEFAULT_TOKEN_URL, DEFAULT_ACTIVITIES_URL)
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub port: u16,
    pub callback_token: Option<String>,
    pub app_url: Url,
    pub redirect_url: Url,
    pub scope: String,
    pub session_secret: Option<String>,
    pub max_pending_logins: usize,
    pub layout_path: PathBuf,
    pub public_dir: PathBuf,
    pub endpoints: UpstreamEndpoints,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        Self::with_endpoints(cli, UpstreamEndpoints::soundcloud()?)
    }

    pub fn with_endpoints(cli: Cli, endpoints: UpstreamEndpoints) -> Result<Self, ConfigError> {
        let app_url = parse_url("app", &cli.app_url)?;
        let redirect_url = parse_url(
            "redirect",
            &format!("{}/oauth2callback", cli.app_url.trim_end_matches('/')),
        )?;

        Ok(Self {
            client_id: cli.client_id,
            client_secret: cli.client_secret,
            port: cli.port,
            callback_token: cli.callback_token.filter(|t| !t.is_empty()),
            app_url,
            redirect_url,
            scope: DEFAULT_SCOPE.to_string(),
            session_secret: cli.session_secret.filter(|s| !s.is_empty()),
            max_pending_logins: cli.max_pending_logins,
            layout_path: cli.layout,
            public_dir: cli.public_dir,
            endpoints,
        })
    }

    /// Cookies only get the `Secure` attribute when the app is served over TLS.
    pub fn secure_cookies(&self) -> bool {
        self.app_url.scheme() == "https"
    }

    /// Builds the upstream authorization URL for one login attempt.
    pub fn authorization_url(&self, state: &str, code_challenge: &str) -> Url {
        let mut url = self.endpoints.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_url.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scope)
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        url
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn SessionStore>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let sessions = match &config.session_secret {
            Some(secret) => CookieSessionStore::from_secret(secret.as_bytes())
                .map_err(|e| ConfigError::SessionKey(e.to_string()))?,
            None => {
                tracing::warn!(
                    "No session secret configured; using a random key, sessions will not survive a restart"
                );
                CookieSessionStore::generate()
            }
        }
        .with_secure(config.secure_cookies());

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            http: reqwest::Client::new(),
        })
    }
}
