//! Cart seam
//!
//! What the engine needs from a cart. Session carts implement it; the host
//! platform can plug in its own.

use super::PricingError;
use rust_decimal::Decimal;
use shared::cart::CartLineItem;

pub trait Cart {
    /// Line items in cart order
    fn items(&self) -> &[CartLineItem];

    /// Set the effective unit price of a line
    fn set_effective_price(&mut self, key: &str, price: Decimal) -> Result<(), PricingError>;

    fn memoized_original_price(&self, key: &str) -> Option<Decimal>;

    /// Record the original price. Only called for lines without a memo.
    fn set_memoized_original_price(&mut self, key: &str, price: Decimal)
    -> Result<(), PricingError>;
}

/// Plain `Vec` of line items as a cart (used by tests and one-off pricing)
impl Cart for Vec<CartLineItem> {
    fn items(&self) -> &[CartLineItem] {
        self
    }

    fn set_effective_price(&mut self, key: &str, price: Decimal) -> Result<(), PricingError> {
        let item = self
            .iter_mut()
            .find(|i| i.key == key)
            .ok_or_else(|| PricingError::UnknownLine(key.to_string()))?;
        item.price = price;
        Ok(())
    }

    fn memoized_original_price(&self, key: &str) -> Option<Decimal> {
        self.iter().find(|i| i.key == key)?.original_price
    }

    fn set_memoized_original_price(
        &mut self,
        key: &str,
        price: Decimal,
    ) -> Result<(), PricingError> {
        let item = self
            .iter_mut()
            .find(|i| i.key == key)
            .ok_or_else(|| PricingError::UnknownLine(key.to_string()))?;
        item.original_price = Some(price);
        Ok(())
    }
}
