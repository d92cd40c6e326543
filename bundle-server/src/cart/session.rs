//! Session cart
//!
//! A storefront cart kept in memory per session id.

use std::sync::Arc;
use std::time::Duration;

use crate::pricing::{BundlePricingEngine, Cart, PricingError};
use crate::utils::{AppError, AppResult};
use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use rust_decimal::Decimal;
use shared::ErrorCode;
use shared::util::now_millis;
use tokio::task::JoinHandle;
use shared::cart::{
    AppliedBundle, CartItemInput, CartLineItem, CartTotals, CartView, MAX_LINE_QUANTITY, line_key,
};
use shared::models::{BundleRule, Product};

#[derive(Debug, Default)]
pub struct SessionCart {
    items: Vec<CartLineItem>,
    /// Pricing passes run on this cart
    passes: u64,
    /// Last request that read or wrote this cart (Unix millis)
    last_touched: i64,
}

impl SessionCart {
    /// Add a product; an existing line with the same key grows instead.
    /// Returns the line key.
    pub fn add_item(&mut self, product: &Product, input: &CartItemInput) -> AppResult<String> {
        validate_quantity(input.quantity, false)?;
        let key = line_key(input.product_id, input.variation_id, &input.variation);

        if let Some(line) = self.items.iter_mut().find(|i| i.key == key) {
            let quantity = line.quantity.saturating_add(input.quantity);
            validate_quantity(quantity, false)?;
            line.quantity = quantity;
            return Ok(key);
        }

        self.items.push(CartLineItem {
            key: key.clone(),
            product_id: product.id,
            variation_id: input.variation_id,
            variation: input.variation.clone(),
            name: product.name.clone(),
            quantity: input.quantity,
            price: product.price,
            original_price: None,
        });
        Ok(key)
    }

    /// Change a line's quantity; 0 removes the line
    pub fn update_quantity(&mut self, key: &str, quantity: u32) -> AppResult<()> {
        validate_quantity(quantity, true)?;
        if quantity == 0 {
            return self.remove_item(key);
        }
        let line = self
            .items
            .iter_mut()
            .find(|i| i.key == key)
            .ok_or_else(|| line_not_found(key))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line together with its price memo
    pub fn remove_item(&mut self, key: &str) -> AppResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.key != key);
        if self.items.len() == before {
            return Err(line_not_found(key));
        }
        Ok(())
    }

    /// Run a pricing pass with the request's rules
    pub fn reprice(&mut self, engine: &BundlePricingEngine, rules: &[BundleRule]) -> Vec<AppliedBundle> {
        self.passes += 1;
        tracing::debug!(passes = self.passes, lines = self.items.len(), "Repricing cart");
        engine.recalculate(self, rules)
    }

    fn touch(&mut self, now: i64) {
        self.last_touched = now;
    }

    pub fn view(&self, session_id: &str, applied_bundles: Vec<AppliedBundle>) -> CartView {
        CartView {
            session_id: session_id.to_string(),
            items: self.items.clone(),
            totals: CartTotals::from_items(&self.items),
            applied_bundles,
        }
    }
}

impl Cart for SessionCart {
    fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    fn set_effective_price(&mut self, key: &str, price: Decimal) -> Result<(), PricingError> {
        self.items.set_effective_price(key, price)
    }

    fn memoized_original_price(&self, key: &str) -> Option<Decimal> {
        self.items.memoized_original_price(key)
    }

    fn set_memoized_original_price(
        &mut self,
        key: &str,
        price: Decimal,
    ) -> Result<(), PricingError> {
        self.items.set_memoized_original_price(key, price)
    }
}

fn validate_quantity(quantity: u32, allow_zero: bool) -> AppResult<()> {
    if (quantity == 0 && !allow_zero) || quantity > MAX_LINE_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::CartQuantityInvalid,
            format!("Quantity must be between 1 and {MAX_LINE_QUANTITY}"),
        ));
    }
    Ok(())
}

pub(crate) fn line_not_found(key: &str) -> AppError {
    AppError::with_message(ErrorCode::CartItemNotFound, format!("Cart item {key} not found"))
        .with_detail("key", key)
}

/// Carts idle longer than this are dropped by the sweeper (48 小时)
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(48 * 60 * 60);
/// Upper bound on live carts
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// All live carts, keyed by session id
///
/// Each request locks only its own cart's shard entry, and only for the
/// synchronous part of the request (after rules have been fetched).
/// Carts are created on the first write; reads never insert. Idle or empty
/// carts are swept periodically, and a full map evicts its stalest cart.
#[derive(Debug)]
pub struct CartSessions {
    carts: DashMap<String, SessionCart>,
    idle_ttl_ms: i64,
    max_sessions: usize,
}

impl Default for CartSessions {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl CartSessions {
    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            carts: DashMap::new(),
            idle_ttl_ms: i64::try_from(idle_ttl.as_millis()).unwrap_or(i64::MAX),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Exclusive access to an existing cart, None when the session has none
    pub fn existing(&self, session_id: &str) -> Option<RefMut<'_, String, SessionCart>> {
        let mut cart = self.carts.get_mut(session_id)?;
        cart.touch(now_millis());
        Some(cart)
    }

    /// Exclusive access to a session's cart, created empty on first write
    pub fn cart_for_write(&self, session_id: &str) -> RefMut<'_, String, SessionCart> {
        if !self.carts.contains_key(session_id) && self.carts.len() >= self.max_sessions {
            self.make_room(now_millis());
        }
        let mut cart = self.carts.entry(session_id.to_string()).or_default();
        cart.touch(now_millis());
        cart
    }

    /// Drop carts that are empty or idle past the TTL; returns how many went
    pub fn sweep_idle(&self, now: i64) -> usize {
        let before = self.carts.len();
        let ttl = self.idle_ttl_ms;
        self.carts.retain(|_, cart| {
            !cart.items.is_empty() && now.saturating_sub(cart.last_touched) < ttl
        });
        before.saturating_sub(self.carts.len())
    }

    fn make_room(&self, now: i64) {
        if self.sweep_idle(now) > 0 && self.carts.len() < self.max_sessions {
            return;
        }
        let stalest = self
            .carts
            .iter()
            .min_by_key(|entry| entry.last_touched)
            .map(|entry| entry.key().clone());
        if let Some(session_id) = stalest {
            self.carts.remove(&session_id);
            tracing::warn!(
                session = %session_id,
                max_sessions = self.max_sessions,
                "Cart limit reached, evicted stalest cart"
            );
        }
    }

    /// Sweep idle carts every `every` until the task is aborted
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = self.sweep_idle(now_millis());
                if removed > 0 {
                    tracing::info!(removed, remaining = self.len(), "Swept idle carts");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn product(id: i64, price: i64) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            price: Decimal::from(price),
            category_ids: vec![1],
        }
    }

    fn input(product_id: i64, quantity: u32) -> CartItemInput {
        CartItemInput {
            product_id,
            quantity,
            variation_id: None,
            variation: BTreeMap::new(),
        }
    }

    #[test]
    fn test_same_product_merges_into_one_line() {
        let mut cart = SessionCart::default();
        let k1 = cart.add_item(&product(1, 500), &input(1, 2)).unwrap();
        let k2 = cart.add_item(&product(1, 500), &input(1, 1)).unwrap();

        assert_eq!(k1, k2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_variations_get_separate_lines() {
        let mut cart = SessionCart::default();
        let mut red = input(1, 1);
        red.variation_id = Some(11);
        red.variation.insert("color".into(), "red".into());
        let mut blue = input(1, 1);
        blue.variation_id = Some(12);
        blue.variation.insert("color".into(), "blue".into());

        cart.add_item(&product(1, 500), &red).unwrap();
        cart.add_item(&product(1, 500), &blue).unwrap();
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let mut cart = SessionCart::default();
        let key = cart.add_item(&product(1, 500), &input(1, 2)).unwrap();

        cart.update_quantity(&key, 0).unwrap();
        assert!(cart.items().is_empty());
        assert!(cart.remove_item(&key).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        let mut cart = SessionCart::default();
        let err = cart.add_item(&product(1, 500), &input(1, 0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartQuantityInvalid);

        let key = cart.add_item(&product(1, 500), &input(1, 1)).unwrap();
        let err = cart.update_quantity(&key, MAX_LINE_QUANTITY + 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartQuantityInvalid);
    }

    #[test]
    fn test_unknown_line_update_fails() {
        let mut cart = SessionCart::default();
        let err = cart.update_quantity("nope", 2).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartItemNotFound);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let sessions = CartSessions::default();
        sessions
            .cart_for_write("alice")
            .add_item(&product(1, 500), &input(1, 1))
            .unwrap();

        assert_eq!(sessions.existing("alice").unwrap().items().len(), 1);
        assert!(sessions.existing("bob").is_none());
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_sweep_drops_idle_and_empty_carts() {
        let sessions = CartSessions::with_limits(Duration::from_secs(60), 100);
        sessions
            .cart_for_write("fresh")
            .add_item(&product(1, 500), &input(1, 1))
            .unwrap();
        sessions
            .cart_for_write("stale")
            .add_item(&product(1, 500), &input(1, 1))
            .unwrap();
        sessions.cart_for_write("emptied");

        sessions.carts.get_mut("stale").unwrap().last_touched -= 61_000;

        assert_eq!(sessions.sweep_idle(now_millis()), 2);
        assert!(sessions.existing("fresh").is_some());
        assert!(sessions.existing("stale").is_none());
        assert!(sessions.existing("emptied").is_none());
    }

    #[test]
    fn test_full_map_evicts_stalest_cart() {
        let sessions = CartSessions::with_limits(Duration::from_secs(3600), 2);
        for id in ["a", "b"] {
            sessions
                .cart_for_write(id)
                .add_item(&product(1, 500), &input(1, 1))
                .unwrap();
        }
        sessions.carts.get_mut("a").unwrap().last_touched -= 1_000;

        sessions
            .cart_for_write("c")
            .add_item(&product(1, 500), &input(1, 1))
            .unwrap();

        assert_eq!(sessions.len(), 2);
        assert!(sessions.existing("a").is_none());
        assert!(sessions.existing("b").is_some());
        assert!(sessions.existing("c").is_some());
    }
}
