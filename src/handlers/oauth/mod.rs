pub mod authorize_handler;
pub mod callback_handler;

pub use authorize_handler::authorize_handler;
pub use callback_handler::callback_handler;

/// Key the pending login record is stored under in the login session.
pub const PENDING_LOGIN_KEY: &str = "pending_login";

/// Cookie identifying the server-side login session.
pub const LOGIN_COOKIE: &str = "sndcld_login";
