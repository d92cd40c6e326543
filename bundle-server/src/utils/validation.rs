//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits live here.

use crate::utils::{AppError, ErrorCode};
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::{BundleRuleDraft, BundleRuleSave, CategoryCreate, MIN_BUNDLE_QUANTITY, ProductCreate};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: rule, product, category
pub const MAX_NAME_LEN: usize = 200;

// ── Money limits ────────────────────────────────────────────────────

/// Upper bound for product prices and bundle prices (1,000,000)
pub const MAX_PRICE: i64 = 1_000_000;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

// ── Bundle rules ────────────────────────────────────────────────────

/// Parse an ID list posted by the rule editor.
///
/// Accepts a JSON array or a string holding one; entries may be numbers or
/// numeric strings. Duplicates collapse, first occurrence wins.
pub fn parse_id_list(value: Option<&Value>) -> Result<Vec<i64>, String> {
    let array = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(Vec::new()),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items,
            _ => return Err(format!("not a JSON array: {raw}")),
        },
        Some(other) => return Err(format!("unexpected value: {other}")),
    };

    let mut ids = Vec::with_capacity(array.len());
    for item in array {
        let id = match &item {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .filter(|id| *id > 0)
        .ok_or_else(|| format!("invalid id: {item}"))?;

        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Validate a rule save request into a draft ready for the repository
pub fn validate_bundle_rule(payload: BundleRuleSave) -> Result<BundleRuleDraft, AppError> {
    let categories = parse_id_list(payload.categories.as_ref()).map_err(|e| {
        AppError::invalid_rule(ErrorCode::RuleInvalidData, "Invalid categories data")
            .with_detail("reason", e)
    })?;
    let excluded_products = parse_id_list(payload.excluded_products.as_ref()).map_err(|e| {
        AppError::invalid_rule(ErrorCode::RuleInvalidData, "Invalid excluded products data")
            .with_detail("reason", e)
    })?;

    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    let (Some(quantity), Some(discount_price)) = (payload.quantity, payload.discount_price) else {
        return Err(AppError::invalid_rule(
            ErrorCode::RuleInvalidData,
            "Please fill in all required fields",
        ));
    };
    if name.is_empty() {
        return Err(AppError::invalid_rule(
            ErrorCode::RuleInvalidData,
            "Please fill in all required fields",
        ));
    }
    validate_required_text(name, "name", MAX_NAME_LEN)?;

    let quantity = u32::try_from(quantity)
        .ok()
        .filter(|q| *q >= MIN_BUNDLE_QUANTITY)
        .ok_or_else(|| {
            AppError::invalid_rule(
                ErrorCode::RuleQuantityTooSmall,
                format!("Quantity must be at least {MIN_BUNDLE_QUANTITY}"),
            )
        })?;

    if discount_price < Decimal::ZERO {
        return Err(AppError::invalid_rule(
            ErrorCode::RulePriceInvalid,
            "Discount price must not be negative",
        ));
    }
    if discount_price > Decimal::from(MAX_PRICE) {
        return Err(AppError::invalid_rule(
            ErrorCode::RulePriceInvalid,
            format!("Discount price exceeds maximum allowed ({MAX_PRICE})"),
        ));
    }

    if categories.is_empty() {
        return Err(AppError::invalid_rule(
            ErrorCode::RuleCategoriesEmpty,
            "Please select at least one category",
        ));
    }

    Ok(BundleRuleDraft {
        name: name.to_string(),
        quantity,
        discount_price: discount_price.normalize(),
        categories,
        excluded_products,
    })
}

// ── Catalog ─────────────────────────────────────────────────────────

pub fn validate_category(data: &CategoryCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)
}

pub fn validate_product(data: &ProductCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    if data.price < Decimal::ZERO {
        return Err(AppError::with_message(
            ErrorCode::ProductPriceInvalid,
            "price must not be negative",
        ));
    }
    if data.price > Decimal::from(MAX_PRICE) {
        return Err(AppError::with_message(
            ErrorCode::ProductPriceInvalid,
            format!("price exceeds maximum allowed ({MAX_PRICE})"),
        ));
    }
    Ok(())
}
