//! HTTP middleware and extractors.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    RequireAuth, SESSION_COOKIE_NAME, clear_session_cookie_header, session_cookie_header,
    session_token,
};
pub use request_id::request_id_middleware;
pub use session::sliding_refresh;
