//! Router harness shared by the handler tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, header},
    response::Response,
};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_cookies::cookie::{Cookie, CookieJar};

use crate::models::app_config::{Cli, UpstreamEndpoints};
use crate::models::{AppConfig, AppState};
use crate::session::{SESSION_COOKIE, Session, TOKEN_KEY, session_key};

pub const LAYOUT: &str = "<!DOCTYPE html><title>stream</title>";
pub const SECRET: &str = "test session secret";
pub const CLIENT_ID: &str = "test-client";

pub struct TestApp {
    pub dir: TempDir,
    pub router: Router,
}

impl TestApp {
    /// App whose upstream endpoints all live under `upstream`.
    pub async fn new(upstream: &str) -> Self {
        Self::with_callback_token(upstream, None).await
    }

    pub async fn with_callback_token(upstream: &str, callback_token: Option<&str>) -> Self {
        Self::build(upstream, |cli| cli.callback_token = callback_token.map(str::to_string)).await
    }

    /// App built from the default test flags after `customize` has run on them.
    pub async fn build(upstream: &str, customize: impl FnOnce(&mut Cli)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("layout.html"), LAYOUT).unwrap();
        std::fs::create_dir(dir.path().join("public")).unwrap();

        let mut cli = Cli {
            client_id: CLIENT_ID.to_string(),
            client_secret: "test-secret".to_string(),
            port: 3000,
            callback_token: None,
            app_url: "http://localhost:3000".to_string(),
            session_secret: Some(SECRET.to_string()),
            max_pending_logins: 10_000,
            layout: dir.path().join("layout.html"),
            public_dir: dir.path().join("public"),
        };
        customize(&mut cli);

        let endpoints = UpstreamEndpoints::new(
            &format!("{upstream}/connect"),
            &format!("{upstream}/oauth2/token"),
            &format!("{upstream}/me/activities"),
        )
        .unwrap();

        let config = AppConfig::with_endpoints(cli, endpoints).unwrap();
        let router = crate::app::router(AppState::new(config).unwrap());

        Self { dir, router }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.request(Method::GET, uri, cookie).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.request(Method::POST, uri, cookie).await
    }

    pub async fn request(&self, method: Method, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// `Cookie` header value carrying an encrypted session with `token`.
    pub fn session_cookie(&self, token: &str) -> String {
        let mut session = Session::default();
        session.set(TOKEN_KEY, token);

        let mut jar = CookieJar::new();
        jar.private_mut(&session_key(SECRET.as_bytes()).unwrap())
            .add(Cookie::new(SESSION_COOKIE, serde_json::to_string(&session).unwrap()));

        let sealed = jar.get(SESSION_COOKIE).unwrap();
        format!("{}={}", sealed.name(), sealed.value())
    }

    /// Attributes of the session cookie set by `response`, e.g. `HttpOnly`
    /// or `Path=/`.
    pub fn session_cookie_attributes(&self, response: &Response) -> Vec<String> {
        set_cookies(response)
            .into_iter()
            .find(|c| c.starts_with(&format!("{SESSION_COOKIE}=")))
            .map(|c| c.split(';').skip(1).map(|a| a.trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Decrypts the session cookie set by `response`, if any.
    pub fn decode_session(&self, response: &Response) -> Option<Session> {
        let raw = set_cookies(response)
            .into_iter()
            .find(|c| c.starts_with(&format!("{SESSION_COOKIE}=")))?;

        let mut jar = CookieJar::new();
        jar.add_original(Cookie::parse_encoded(raw).ok()?);
        let opened = jar
            .private(&session_key(SECRET.as_bytes()).unwrap())
            .get(SESSION_COOKIE)?;

        serde_json::from_str(opened.value()).ok()
    }
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// `name=value` part of the cookie named `name` set by `response`.
pub fn cookie_pair(response: &Response, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .and_then(|c| c.split(';').next().map(str::to_string))
}

pub async fn body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
