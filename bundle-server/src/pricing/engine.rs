//! Bundle Pricing Engine
//!
//! Rewrites cart line prices so every complete set of eligible units is
//! charged at the bundle rate. Each pass starts from the memoized original
//! prices, so running it any number of times gives the same cart.

use super::calculator::{LineSnapshot, allocate_sets, collect_eligible_units};
use super::matcher::{CategoryResolver, is_eligible};
use super::{Cart, PricingError};
use shared::cart::AppliedBundle;
use shared::models::{BundleRule, MIN_BUNDLE_QUANTITY};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Clone)]
pub struct BundlePricingEngine {
    resolver: Arc<dyn CategoryResolver>,
}

impl std::fmt::Debug for BundlePricingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundlePricingEngine")
            .field("resolver", &"<CategoryResolver>")
            .finish()
    }
}

impl BundlePricingEngine {
    pub fn new(resolver: Arc<dyn CategoryResolver>) -> Self {
        Self { resolver }
    }

    /// Run one pricing pass. Never fails: on error the pass is logged and the
    /// cart is left at its original prices.
    pub fn recalculate(&self, cart: &mut dyn Cart, rules: &[BundleRule]) -> Vec<AppliedBundle> {
        match self.reprice(cart, rules) {
            Ok(applied) => applied,
            Err(e) => {
                tracing::error!(error = %e, "Bundle pricing pass failed, keeping original prices");
                restore_original_prices(cart);
                Vec::new()
            }
        }
    }

    /// One pricing pass.
    ///
    /// 1. Lines with a memo go back to it; lines without one record it.
    /// 2. Each rule, in list order, prices the lines whose units land in a
    ///    complete set at `discount_price / quantity`. A later rule touching
    ///    the same line overwrites the earlier one.
    pub fn reprice(
        &self,
        cart: &mut dyn Cart,
        rules: &[BundleRule],
    ) -> Result<Vec<AppliedBundle>, PricingError> {
        let lines = reset_and_capture(cart)?;
        if rules.is_empty() || lines.is_empty() {
            return Ok(Vec::new());
        }

        let categories = self.resolve_categories(&lines);
        let quantities: HashMap<&str, u32> =
            lines.iter().map(|l| (l.key.as_str(), l.quantity)).collect();

        let mut applied = Vec::new();
        for rule in rules {
            if !rule.is_active() {
                continue;
            }
            if rule.quantity < MIN_BUNDLE_QUANTITY {
                tracing::warn!(rule_id = rule.id, quantity = rule.quantity, "Skipping bundle rule with quantity below minimum");
                continue;
            }
            let Some(per_unit_price) = rule.per_unit_price() else {
                tracing::warn!(rule_id = rule.id, "Skipping bundle rule without a per-unit price");
                continue;
            };

            let units = collect_eligible_units(&lines, |line| {
                categories
                    .get(&line.product_id)
                    .is_some_and(|cats| is_eligible(rule, line.product_id, cats))
            });
            let allocation = allocate_sets(rule.id, &units, rule.quantity, &quantities)?;
            if allocation.sets == 0 {
                continue;
            }

            for key in &allocation.bundled_keys {
                cart.set_effective_price(key, per_unit_price)?;
            }

            tracing::debug!(
                rule_id = rule.id,
                sets = allocation.sets,
                units_in_sets = allocation.units_in_sets,
                lines = allocation.bundled_keys.len(),
                "Bundle rule applied"
            );

            let mut record = AppliedBundle::from_rule(rule, allocation.eligible_units, per_unit_price);
            record.line_keys = allocation.bundled_keys;
            applied.push(record);
        }

        Ok(applied)
    }

    /// Expanded categories per distinct product in the cart
    fn resolve_categories(&self, lines: &[LineSnapshot]) -> HashMap<i64, HashSet<i64>> {
        let mut resolved = HashMap::new();
        for line in lines {
            if resolved.contains_key(&line.product_id) {
                continue;
            }
            match self.resolver.categories_with_ancestors(line.product_id) {
                Some(cats) => {
                    resolved.insert(line.product_id, cats);
                }
                None => {
                    tracing::warn!(product_id = line.product_id, "Product not in catalog, not eligible for bundles");
                }
            }
        }
        resolved
    }
}

/// Reset every memoized line to its memo, capture a memo for the rest.
/// Returns the lines as the rules will see them.
fn reset_and_capture(cart: &mut dyn Cart) -> Result<Vec<LineSnapshot>, PricingError> {
    let current: Vec<(String, i64, u32, rust_decimal::Decimal)> = cart
        .items()
        .iter()
        .map(|i| (i.key.clone(), i.product_id, i.quantity, i.price))
        .collect();

    let mut lines = Vec::with_capacity(current.len());
    for (key, product_id, quantity, price) in current {
        let original_price = match cart.memoized_original_price(&key) {
            Some(memo) => {
                cart.set_effective_price(&key, memo)?;
                memo
            }
            None => {
                cart.set_memoized_original_price(&key, price)?;
                price
            }
        };
        lines.push(LineSnapshot {
            key,
            product_id,
            quantity,
            original_price,
        });
    }
    Ok(lines)
}

fn restore_original_prices(cart: &mut dyn Cart) {
    let memos: Vec<(String, rust_decimal::Decimal)> = cart
        .items()
        .iter()
        .filter_map(|i| cart.memoized_original_price(&i.key).map(|m| (i.key.clone(), m)))
        .collect();
    for (key, memo) in memos {
        if let Err(e) = cart.set_effective_price(&key, memo) {
            tracing::warn!(key = %key, error = %e, "Failed to restore original price");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::cart::CartLineItem;
    use shared::models::RuleStatus;
    use std::collections::BTreeMap;

    /// Category tree + product assignments without a database
    #[derive(Default)]
    struct TreeCatalog {
        parents: HashMap<i64, i64>,
        products: HashMap<i64, Vec<i64>>,
    }

    impl CategoryResolver for TreeCatalog {
        fn categories_with_ancestors(&self, product_id: i64) -> Option<HashSet<i64>> {
            let mut result = HashSet::new();
            for &cat in self.products.get(&product_id)? {
                let mut current = Some(cat);
                while let Some(c) = current {
                    if !result.insert(c) {
                        break;
                    }
                    current = self.parents.get(&c).copied();
                }
            }
            Some(result)
        }
    }

    fn engine(products: &[(i64, i64)], parents: &[(i64, i64)]) -> BundlePricingEngine {
        let mut catalog = TreeCatalog::default();
        for &(product, cat) in products {
            catalog.products.entry(product).or_default().push(cat);
        }
        catalog.parents.extend(parents.iter().copied());
        BundlePricingEngine::new(Arc::new(catalog))
    }

    fn item(key: &str, product_id: i64, quantity: u32, price: Decimal) -> CartLineItem {
        CartLineItem {
            key: key.to_string(),
            product_id,
            variation_id: None,
            variation: BTreeMap::new(),
            name: format!("Product {product_id}"),
            quantity,
            price,
            original_price: None,
        }
    }

    fn rule(id: i64, quantity: u32, price: Decimal, categories: Vec<i64>) -> BundleRule {
        BundleRule {
            id,
            name: format!("Rule {id}"),
            categories,
            excluded_products: vec![],
            quantity,
            discount_price: price,
            status: RuleStatus::Active,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn prices(cart: &[CartLineItem]) -> Vec<Decimal> {
        cart.iter().map(|i| i.price).collect()
    }

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_end_to_end_three_units_one_line() {
        let engine = engine(&[(1, 10)], &[]);
        let mut cart = vec![item("A", 1, 3, d(500))];
        let rules = vec![rule(1, 2, d(900), vec![10])];

        let applied = engine.recalculate(&mut cart, &rules);

        assert_eq!(cart[0].price, d(450));
        assert_eq!(cart[0].original_price, Some(d(500)));
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].sets, 1);
        assert_eq!(applied[0].eligible_units, 3);
        assert_eq!(applied[0].line_keys, vec!["A".to_string()]);
    }

    #[test]
    fn test_set_floor_leaves_remainder_at_original() {
        let engine = engine(&[(1, 10), (2, 10), (3, 10)], &[]);
        let mut cart = vec![
            item("a", 1, 2, d(600)),
            item("b", 2, 2, d(600)),
            item("c", 3, 1, d(600)),
        ];
        let rules = vec![rule(1, 2, d(999), vec![10])];

        engine.recalculate(&mut cart, &rules);

        let half = Decimal::new(4995, 1);
        assert_eq!(prices(&cart), vec![half, half, d(600)]);
    }

    #[test]
    fn test_two_passes_equal_one() {
        let engine = engine(&[(1, 10), (2, 10)], &[]);
        let mut cart = vec![item("a", 1, 3, d(500)), item("b", 2, 1, d(300))];
        let rules = vec![rule(1, 2, d(900), vec![10])];

        let first = engine.recalculate(&mut cart, &rules);
        let after_first = cart.clone();
        let second = engine.recalculate(&mut cart, &rules);

        assert_eq!(first, second);
        assert_eq!(cart, after_first);
        assert_eq!(cart[0].original_price, Some(d(500)));
    }

    #[test]
    fn test_excluded_product_not_counted() {
        let engine = engine(&[(1, 10), (2, 10)], &[]);
        let mut cart = vec![item("a", 1, 1, d(500)), item("b", 2, 1, d(500))];
        let mut r = rule(1, 2, d(800), vec![10]);
        r.excluded_products = vec![2];

        let applied = engine.recalculate(&mut cart, &[r]);

        assert!(applied.is_empty());
        assert_eq!(prices(&cart), vec![d(500), d(500)]);
    }

    #[test]
    fn test_ancestor_category_matches() {
        // product 1 sits in 12 (T-Shirts) under 11 (Shirts) under 10 (Clothing)
        let engine = engine(&[(1, 12)], &[(12, 11), (11, 10)]);
        let mut cart = vec![item("a", 1, 2, d(500))];
        let rules = vec![rule(1, 2, d(800), vec![10])];

        engine.recalculate(&mut cart, &rules);
        assert_eq!(cart[0].price, d(400));
    }

    #[test]
    fn test_no_rules_is_noop() {
        let engine = engine(&[(1, 10)], &[]);
        let mut cart = vec![item("a", 1, 4, d(500))];

        let applied = engine.recalculate(&mut cart, &[]);

        assert!(applied.is_empty());
        assert_eq!(cart[0].price, d(500));
    }

    #[test]
    fn test_disjoint_rules_independent() {
        let engine = engine(&[(1, 10), (2, 20)], &[]);
        let mut cart = vec![item("tee", 1, 2, d(500)), item("mug", 2, 3, d(200))];
        let rules = vec![rule(1, 2, d(900), vec![10]), rule(2, 3, d(450), vec![20])];

        let applied = engine.recalculate(&mut cart, &rules);

        assert_eq!(prices(&cart), vec![d(450), d(150)]);
        assert_eq!(applied.len(), 2);
    }

    #[test]
    fn test_later_rule_overwrites_earlier() {
        let engine = engine(&[(1, 10)], &[]);
        let mut cart = vec![item("a", 1, 2, d(500))];
        let rules = vec![rule(1, 2, d(900), vec![10]), rule(2, 2, d(800), vec![10])];

        engine.recalculate(&mut cart, &rules);
        assert_eq!(cart[0].price, d(400));
    }

    #[test]
    fn test_rules_see_original_not_discounted_price() {
        // second rule needs 3 units; the first rule's rewrite must not feed it
        let engine = engine(&[(1, 10)], &[]);
        let mut cart = vec![item("a", 1, 2, d(500))];
        let rules = vec![rule(1, 2, d(900), vec![10]), rule(2, 3, d(100), vec![10])];

        let applied = engine.recalculate(&mut cart, &rules);
        assert_eq!(cart[0].price, d(450));
        assert_eq!(applied.len(), 1);
    }

    #[test]
    fn test_quantity_drop_restores_original() {
        let engine = engine(&[(1, 10)], &[]);
        let mut cart = vec![item("a", 1, 2, d(500))];
        let rules = vec![rule(1, 2, d(900), vec![10])];

        engine.recalculate(&mut cart, &rules);
        assert_eq!(cart[0].price, d(450));

        cart[0].quantity = 1;
        engine.recalculate(&mut cart, &rules);
        assert_eq!(cart[0].price, d(500));
    }

    #[test]
    fn test_undersized_rule_skipped() {
        let engine = engine(&[(1, 10)], &[]);
        let mut cart = vec![item("a", 1, 4, d(500))];
        let rules = vec![rule(1, 1, d(100), vec![10]), rule(2, 0, d(100), vec![10])];

        let applied = engine.recalculate(&mut cart, &rules);
        assert!(applied.is_empty());
        assert_eq!(cart[0].price, d(500));
    }

    #[test]
    fn test_unknown_product_not_eligible() {
        let engine = engine(&[(1, 10)], &[]);
        let mut cart = vec![item("a", 1, 1, d(500)), item("ghost", 99, 1, d(500))];
        let rules = vec![rule(1, 2, d(900), vec![10])];

        assert!(engine.recalculate(&mut cart, &rules).is_empty());
    }

    /// Rejects any price other than the memo for one key
    struct FailingCart {
        inner: Vec<CartLineItem>,
        poisoned: String,
    }

    impl Cart for FailingCart {
        fn items(&self) -> &[CartLineItem] {
            &self.inner
        }

        fn set_effective_price(&mut self, key: &str, price: Decimal) -> Result<(), PricingError> {
            if key == self.poisoned && self.inner.memoized_original_price(key) != Some(price) {
                return Err(PricingError::UnknownLine(key.to_string()));
            }
            self.inner.set_effective_price(key, price)
        }

        fn memoized_original_price(&self, key: &str) -> Option<Decimal> {
            self.inner.memoized_original_price(key)
        }

        fn set_memoized_original_price(
            &mut self,
            key: &str,
            price: Decimal,
        ) -> Result<(), PricingError> {
            self.inner.set_memoized_original_price(key, price)
        }
    }

    #[test]
    fn test_failed_pass_keeps_original_prices() {
        let engine = engine(&[(1, 10), (2, 10)], &[]);
        let mut cart = FailingCart {
            inner: vec![item("a", 1, 1, d(500)), item("b", 2, 1, d(500))],
            poisoned: "b".to_string(),
        };
        let rules = vec![rule(1, 2, d(800), vec![10])];

        let applied = engine.recalculate(&mut cart, &rules);

        assert!(applied.is_empty());
        assert_eq!(prices(&cart.inner), vec![d(500), d(500)]);
    }
}
