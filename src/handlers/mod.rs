pub mod index_handler;
pub mod oauth;
pub mod stream_handler;

pub use index_handler::index_handler;
pub use oauth::{authorize_handler, callback_handler};
pub use stream_handler::stream_handler;
