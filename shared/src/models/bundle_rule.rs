//! Bundle Rule Model
//!
//! "Buy `quantity` items from any of `categories` for `discount_price`".

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest bundle size a rule may declare
pub const MIN_BUNDLE_QUANTITY: u32 = 2;

/// Rule lifecycle status (soft delete flips `Active` to `Deleted`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    #[default]
    Active,
    Deleted,
}

impl RuleStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Active => "active",
            RuleStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RuleStatus::Active),
            "deleted" => Ok(RuleStatus::Deleted),
            other => Err(format!("unknown rule status: {other}")),
        }
    }
}

/// Bundle pricing rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleRule {
    pub id: i64,
    pub name: String,
    /// Category IDs the rule targets (a product in a child category also matches)
    pub categories: Vec<i64>,
    /// Product IDs never counted, even when their category matches
    pub excluded_products: Vec<i64>,
    /// Units per bundle
    pub quantity: u32,
    /// Total price of one complete bundle
    pub discount_price: Decimal,
    pub status: RuleStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl BundleRule {
    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active
    }

    /// Bundle price spread over each unit of a set.
    ///
    /// Returns `None` for a zero quantity, which save-time validation never
    /// lets through but a hand-edited row could still carry.
    pub fn per_unit_price(&self) -> Option<Decimal> {
        if self.quantity == 0 {
            return None;
        }
        self.discount_price.checked_div(Decimal::from(self.quantity))
    }

    pub fn excludes(&self, product_id: i64) -> bool {
        self.excluded_products.contains(&product_id)
    }
}

/// Create/update rule payload (admin rule editor)
///
/// Fields are optional so that missing values surface as a rejected save
/// with a readable message instead of a body-parse failure. `categories` and
/// `excluded_products` accept either a JSON array of IDs or a string holding
/// a JSON array (the rule editor posts the latter).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleRuleSave {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub categories: Option<serde_json::Value>,
    #[serde(default)]
    pub excluded_products: Option<serde_json::Value>,
}

/// Validated rule fields, ready to persist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleRuleDraft {
    pub name: String,
    pub quantity: u32,
    pub discount_price: Decimal,
    pub categories: Vec<i64>,
    pub excluded_products: Vec<i64>,
}
