//! Applied Bundle - records what a bundle rule did during one pricing pass

use crate::models::BundleRule;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Applied bundle record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedBundle {
    // === Rule Identity ===
    pub rule_id: i64,
    pub name: String,

    // === Set Math ===
    /// Eligible units found in the cart
    pub eligible_units: u32,
    /// Complete sets formed
    pub sets: u32,
    /// Units that fell into complete sets
    pub units_in_sets: u32,
    /// Price assigned to each unit of a complete set
    pub per_unit_price: Decimal,

    // === Effect ===
    /// Line item keys whose effective price this rule set
    pub line_keys: Vec<String>,
}

impl AppliedBundle {
    pub fn from_rule(rule: &BundleRule, eligible_units: u32, per_unit_price: Decimal) -> Self {
        let sets = eligible_units / rule.quantity.max(1);
        Self {
            rule_id: rule.id,
            name: rule.name.clone(),
            eligible_units,
            sets,
            units_in_sets: sets * rule.quantity,
            per_unit_price,
            line_keys: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleStatus;

    #[test]
    fn test_from_rule_floors_sets() {
        let rule = BundleRule {
            id: 3,
            name: "Buy 2 T-shirts for 999".to_string(),
            categories: vec![1],
            excluded_products: vec![],
            quantity: 2,
            discount_price: Decimal::from(999),
            status: RuleStatus::Active,
            created_at: 0,
            updated_at: 0,
        };

        let applied = AppliedBundle::from_rule(&rule, 5, Decimal::new(4995, 1));
        assert_eq!(applied.sets, 2);
        assert_eq!(applied.units_in_sets, 4);
        assert!(applied.line_keys.is_empty());
    }
}
