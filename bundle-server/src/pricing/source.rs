//! Rule source
//!
//! Where the engine gets its rules. One fetch per request: handlers load a
//! `RuleSnapshot` and every pricing pass in that request reuses it.

use super::PricingError;
use crate::db::repository::BundleRuleRepository;
use async_trait::async_trait;
use shared::models::BundleRule;

#[async_trait]
pub trait RuleSource: Send + Sync {
    /// All active rules in a stable order, soft-deleted rules excluded
    async fn list_active_rules(&self) -> Result<Vec<BundleRule>, PricingError>;
}

#[async_trait]
impl RuleSource for BundleRuleRepository {
    async fn list_active_rules(&self) -> Result<Vec<BundleRule>, PricingError> {
        self.find_active()
            .await
            .map_err(|e| PricingError::RuleStoreUnavailable(e.to_string()))
    }
}

/// Active rules fetched once for the current request
#[derive(Debug, Clone, Default)]
pub struct RuleSnapshot {
    rules: Vec<BundleRule>,
}

impl RuleSnapshot {
    /// Fetch rules; a failing store yields an empty snapshot
    pub async fn load(source: &dyn RuleSource) -> Self {
        match source.list_active_rules().await {
            Ok(rules) => Self { rules },
            Err(e) => {
                tracing::error!(error = %e, "Failed to load bundle rules, pricing without bundles");
                Self::default()
            }
        }
    }

    pub fn from_rules(rules: Vec<BundleRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[BundleRule] {
        &self.rules
    }
}
