//! Pricing errors
//!
//! These never leave the engine's public entry point; they are logged and the
//! cart keeps its original prices.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    /// Rule lookup failed (treated as "no rules")
    #[error("Rule store unavailable: {0}")]
    RuleStoreUnavailable(String),

    /// The cart has no line with this key
    #[error("Unknown cart line: {0}")]
    UnknownLine(String),

    /// Stored rule can't be applied (bad quantity, bad price)
    #[error("Rule {rule_id} can't be applied: {reason}")]
    InvalidRule { rule_id: i64, reason: String },

    /// Eligible unit count doesn't fit
    #[error("Unit count overflow for rule {0}")]
    Overflow(i64),
}
