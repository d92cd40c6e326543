//! Shared types for the bundle pricing service
//!
//! Common types used by the server and its clients including error types,
//! response structures, catalog and rule models, and cart types.

pub mod cart;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
