//! Bundle Set Calculator
//!
//! Pure set math for one rule: eligible units in cart order, how many fall
//! into complete sets, and which lines those units belong to.

use super::PricingError;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// One unit of an eligible line item
#[derive(Debug, Clone, PartialEq)]
pub struct EligibleUnit<'a> {
    pub key: &'a str,
    pub original_price: Decimal,
}

/// Line data the calculator works on (snapshot taken after the reset step)
#[derive(Debug, Clone)]
pub struct LineSnapshot {
    pub key: String,
    pub product_id: i64,
    pub quantity: u32,
    pub original_price: Decimal,
}

/// Complete-set outcome for one rule
#[derive(Debug, Clone, PartialEq)]
pub struct SetAllocation {
    pub eligible_units: u32,
    pub sets: u32,
    pub units_in_sets: u32,
    /// Keys of lines with at least one unit inside a complete set, cart order
    pub bundled_keys: Vec<String>,
}

/// Expand eligible lines into units, `quantity` copies per line, in cart order
pub fn collect_eligible_units<'a>(
    lines: &'a [LineSnapshot],
    is_eligible: impl Fn(&LineSnapshot) -> bool,
) -> Vec<EligibleUnit<'a>> {
    lines
        .iter()
        .filter(|line| is_eligible(line))
        .flat_map(|line| {
            (0..line.quantity).map(move |_| EligibleUnit {
                key: &line.key,
                original_price: line.original_price,
            })
        })
        .collect()
}

/// Split units into complete sets of `set_size`; the remainder stays unbundled.
///
/// A line counts as bundled once any of its units is inside a set. The
/// per-key counter never passes the line's quantity.
pub fn allocate_sets(
    rule_id: i64,
    units: &[EligibleUnit<'_>],
    set_size: u32,
    line_quantities: &HashMap<&str, u32>,
) -> Result<SetAllocation, PricingError> {
    if set_size == 0 {
        return Err(PricingError::InvalidRule {
            rule_id,
            reason: "quantity is zero".to_string(),
        });
    }

    let eligible_units = u32::try_from(units.len()).map_err(|_| PricingError::Overflow(rule_id))?;
    let sets = eligible_units / set_size;
    let units_in_sets = sets
        .checked_mul(set_size)
        .ok_or(PricingError::Overflow(rule_id))?;

    let mut processed: HashMap<&str, u32> = HashMap::new();
    let mut bundled_keys: Vec<String> = Vec::new();

    for unit in units.iter().take(units_in_sets as usize) {
        let count = processed.entry(unit.key).or_insert(0);
        *count += 1;
        let limit = line_quantities.get(unit.key).copied().unwrap_or(0);
        if *count <= limit && !bundled_keys.iter().any(|k| k == unit.key) {
            bundled_keys.push(unit.key.to_string());
        }
    }

    Ok(SetAllocation {
        eligible_units,
        sets,
        units_in_sets,
        bundled_keys,
    })
}
