//! Bundle Rule Matcher
//!
//! Decides which cart lines a bundle rule counts.

use shared::models::BundleRule;
use std::collections::HashSet;

/// Resolves a product's category set, ancestors included
pub trait CategoryResolver: Send + Sync {
    /// Directly assigned categories plus every ancestor of each.
    /// `None` when the product is unknown.
    fn categories_with_ancestors(&self, product_id: i64) -> Option<HashSet<i64>>;
}

/// A product counts toward a rule when it isn't excluded and one of its
/// categories (or their ancestors) is targeted by the rule.
pub fn is_eligible(rule: &BundleRule, product_id: i64, categories: &HashSet<i64>) -> bool {
    if rule.excludes(product_id) {
        return false;
    }
    rule.categories.iter().any(|c| categories.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::RuleStatus;

    fn rule(categories: Vec<i64>, excluded: Vec<i64>) -> BundleRule {
        BundleRule {
            id: 1,
            name: "Tees".to_string(),
            categories,
            excluded_products: excluded,
            quantity: 2,
            discount_price: Decimal::from(900),
            status: RuleStatus::Active,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_category_intersection() {
        let cats: HashSet<i64> = [3, 10].into_iter().collect();
        assert!(is_eligible(&rule(vec![10], vec![]), 1, &cats));
        assert!(!is_eligible(&rule(vec![11], vec![]), 1, &cats));
    }

    #[test]
    fn test_excluded_product_never_eligible() {
        let cats: HashSet<i64> = [10].into_iter().collect();
        assert!(!is_eligible(&rule(vec![10], vec![1]), 1, &cats));
        assert!(is_eligible(&rule(vec![10], vec![1]), 2, &cats));
    }

    #[test]
    fn test_no_categories_never_eligible() {
        let cats: HashSet<i64> = HashSet::new();
        assert!(!is_eligible(&rule(vec![10], vec![]), 1, &cats));
    }
}
