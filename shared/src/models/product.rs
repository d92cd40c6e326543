//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Regular unit price
    pub price: Decimal,
    /// Directly assigned categories (leaf level, no ancestors)
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}
