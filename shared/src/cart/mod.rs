//! Cart Module
//!
//! Types exchanged between the storefront and the pricing engine:
//! - Line items with their memoized original price
//! - Add-to-cart input and line key derivation
//! - Totals and applied bundle records

pub mod applied_bundle;
pub mod types;

// Re-exports
pub use applied_bundle::AppliedBundle;
pub use types::*;
