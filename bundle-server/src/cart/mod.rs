//! Storefront carts

mod session;

pub(crate) use session::line_not_found;
pub use session::{CartSessions, DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS, SessionCart};
