//! Decimal helpers for order totals
//!
//! Line items carry f64 prices on the wire; arithmetic goes through
//! `rust_decimal` so repeated additions cannot drift.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use shared::order::OrderItem;

/// Convert an f64 amount to Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert a Decimal back to f64, rounded to cents
pub fn to_f64(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or(0.0)
}

/// Order total from captured line items
pub fn order_total(items: &[OrderItem]) -> f64 {
    let total: Decimal = items
        .iter()
        .map(|item| to_decimal(item.unit_price) * Decimal::from(item.quantity))
        .sum();
    to_f64(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(unit_price: f64, quantity: u32) -> OrderItem {
        OrderItem {
            menu_item_id: "dish-1".to_string(),
            name: "Grilled octopus".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_order_total() {
        let items = vec![item(9.99, 3), item(4.5, 1)];
        assert_eq!(order_total(&items), 34.47);
    }

    #[test]
    fn test_order_total_avoids_float_drift() {
        // 0.1 * 10 accumulates error in plain f64 summation
        let items = vec![item(0.1, 10)];
        assert_eq!(order_total(&items), 1.0);
    }

    #[test]
    fn test_empty_items_total_zero() {
        assert_eq!(order_total(&[]), 0.0);
    }
}
