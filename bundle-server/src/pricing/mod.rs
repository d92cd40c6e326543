//! Bundle Pricing Module
//!
//! "Buy N from these categories for a fixed price". Rules are applied on the
//! backend every time a cart's totals are computed.

mod calculator;
mod cart;
mod engine;
mod error;
pub mod matcher;
mod source;

pub use calculator::*;
pub use cart::Cart;
pub use engine::BundlePricingEngine;
pub use error::PricingError;
pub use matcher::{CategoryResolver, is_eligible};
pub use source::{RuleSnapshot, RuleSource};
