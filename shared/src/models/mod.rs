//! Data models
//!
//! Shared between bundle-server and the admin/storefront front-ends (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod bundle_rule;
pub mod category;
pub mod product;

// Re-exports
pub use bundle_rule::*;
pub use category::*;
pub use product::*;
