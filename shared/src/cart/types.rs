//! Cart types

use super::AppliedBundle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Maximum units per line item
pub const MAX_LINE_QUANTITY: u32 = 9999;

/// One line of a cart: a product/variation combination and its quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    /// Identity of this product/variation combination within the cart
    pub key: String,
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variation: BTreeMap<String, String>,
    pub name: String,
    pub quantity: u32,
    /// Effective unit price (what checkout charges)
    pub price: Decimal,
    /// Price captured before the first bundle rewrite; the reset basis for
    /// every later pass. Never holds a discounted price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
}

impl CartLineItem {
    /// Effective price times quantity (saturates at `Decimal::MAX`)
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    /// Original (memo, falling back to effective) price times quantity
    pub fn original_line_total(&self) -> Decimal {
        self.original_price
            .unwrap_or(self.price)
            .saturating_mul(Decimal::from(self.quantity))
    }
}

/// Add-to-cart input (storefront)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemInput {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub variation_id: Option<i64>,
    #[serde(default)]
    pub variation: BTreeMap<String, String>,
}

fn default_quantity() -> u32 {
    1
}

/// Quantity change for an existing line (0 removes it)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartQuantityUpdate {
    pub quantity: u32,
}

/// Derive the line key for a product/variation combination.
///
/// Same product, variation and attributes always map to the same key, so a
/// repeated add merges into the existing line.
pub fn line_key(
    product_id: i64,
    variation_id: Option<i64>,
    variation: &BTreeMap<String, String>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(product_id.to_le_bytes());
    hasher.update(variation_id.unwrap_or(0).to_le_bytes());
    for (attr, value) in variation {
        hasher.update(attr.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

/// Cart totals after a pricing pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Units across all lines
    pub item_count: u32,
    /// Sum of effective line totals
    pub subtotal: Decimal,
    /// Sum of line totals at original prices
    pub original_subtotal: Decimal,
    /// `original_subtotal - subtotal`
    pub discount_total: Decimal,
}

impl CartTotals {
    pub fn from_items(items: &[CartLineItem]) -> Self {
        let mut totals = CartTotals::default();
        for item in items {
            totals.item_count = totals.item_count.saturating_add(item.quantity);
            totals.subtotal = totals.subtotal.saturating_add(item.line_total());
            totals.original_subtotal = totals
                .original_subtotal
                .saturating_add(item.original_line_total());
        }
        if totals.subtotal == Decimal::MAX || totals.original_subtotal == Decimal::MAX {
            tracing::warn!(
                lines = items.len(),
                "Cart totals saturated, a line price is out of range"
            );
        }
        totals.discount_total = totals.original_subtotal.saturating_sub(totals.subtotal);
        totals
    }
}

/// Cart as returned to the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub session_id: String,
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
    #[serde(default)]
    pub applied_bundles: Vec<AppliedBundle>,
}
