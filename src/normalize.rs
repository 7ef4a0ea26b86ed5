//! Amount, phone, and cart payload normalization.
//!
//! The provider bills in Rials and expects payer mobile numbers in the
//! international form. Everything here is pure: inputs are never mutated
//! and the same input always produces the same output.

use crate::config::CurrencyUnit;
use serde_json::{Map, Value};

const COUNTRY_CALLING_CODE: &str = "+98";

/// Cart fields that carry a monetary value at the cart level.
const CART_AMOUNT_FIELDS: [&str; 3] = ["shippingAmount", "taxAmount", "totalAmount"];

/// Converts an amount from the merchant's stated unit into Rials.
pub fn normalize_amount(amount: u64, unit: CurrencyUnit) -> u64 {
    match unit {
        CurrencyUnit::Toman => amount * 10,
        CurrencyUnit::Rial => amount,
    }
}

/// Rewrites a number with the domestic trunk prefix into the international
/// form. Numbers already carrying a calling code pass through unchanged.
pub fn normalize_phone(raw: &str) -> String {
    match raw.strip_prefix('0') {
        Some(rest) => format!("{}{}", COUNTRY_CALLING_CODE, rest),
        None => raw.to_string(),
    }
}

/// Resolves the payer phone from invoice details, trying `phone`,
/// `cellphone`, and `mobile` in that order, and normalizes the match.
pub(crate) fn resolve_phone(details: &Map<String, Value>) -> Option<String> {
    ["phone", "cellphone", "mobile"]
        .iter()
        .find_map(|key| details.get(*key).and_then(Value::as_str))
        .map(normalize_phone)
}

/// Canonicalizes a raw `cartList` payload and converts every monetary field
/// in it to Rials.
///
/// A single cart object (recognized by a top-level `shippingAmount` field)
/// is wrapped into a one-element list before per-field normalization runs.
/// An empty list stays empty; payloads of any other shape pass through
/// untouched.
pub fn normalize_cart_list(raw: &Value, unit: CurrencyUnit) -> Value {
    let carts: Vec<&Value> = match raw {
        Value::Object(map) if map.contains_key("shippingAmount") => vec![raw],
        Value::Array(list) => list.iter().collect(),
        other => return other.clone(),
    };

    Value::Array(carts.into_iter().map(|cart| normalize_cart(cart, unit)).collect())
}

fn normalize_cart(cart: &Value, unit: CurrencyUnit) -> Value {
    let mut cart = cart.clone();

    for field in CART_AMOUNT_FIELDS {
        normalize_field(&mut cart, field, unit);
    }

    if let Some(items) = cart.get_mut("cartItems").and_then(Value::as_array_mut) {
        for item in items {
            normalize_field(item, "amount", unit);

            // Line items nested inside a cart item carry their own amounts.
            if let Some(lines) = item.get_mut("items").and_then(Value::as_array_mut) {
                for line in lines {
                    normalize_field(line, "amount", unit);
                }
            }
        }
    }

    cart
}

fn normalize_field(value: &mut Value, field: &str, unit: CurrencyUnit) {
    if let Some(amount) = value.get(field).and_then(Value::as_u64) {
        value[field] = Value::from(normalize_amount(amount, unit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_amount_toman_is_times_ten() {
        assert_eq!(normalize_amount(0, CurrencyUnit::Toman), 0);
        assert_eq!(normalize_amount(12_500, CurrencyUnit::Toman), 125_000);
    }

    #[test]
    fn test_normalize_amount_rial_is_identity() {
        assert_eq!(normalize_amount(0, CurrencyUnit::Rial), 0);
        assert_eq!(normalize_amount(12_500, CurrencyUnit::Rial), 12_500);
    }

    #[test]
    fn test_normalize_phone_rewrites_trunk_prefix() {
        assert_eq!(normalize_phone("09012345678"), "+989012345678");
    }

    #[test]
    fn test_normalize_phone_keeps_international_form() {
        assert_eq!(normalize_phone("+989012345678"), "+989012345678");
    }

    #[test]
    fn test_resolve_phone_prefers_phone_then_cellphone_then_mobile() {
        let mut details = Map::new();
        details.insert("mobile".to_string(), json!("09030000000"));
        details.insert("cellphone".to_string(), json!("09020000000"));
        assert_eq!(resolve_phone(&details), Some("+989020000000".to_string()));

        details.insert("phone".to_string(), json!("09010000000"));
        assert_eq!(resolve_phone(&details), Some("+989010000000".to_string()));

        assert_eq!(resolve_phone(&Map::new()), None);
    }

    #[test]
    fn test_single_cart_object_is_wrapped_into_list() {
        let cart = json!({
            "shippingAmount": 50,
            "taxAmount": 9,
            "totalAmount": 559,
            "cartItems": [{ "amount": 500, "name": "book" }]
        });

        let normalized = normalize_cart_list(&cart, CurrencyUnit::Toman);

        assert_eq!(
            normalized,
            json!([{
                "shippingAmount": 500,
                "taxAmount": 90,
                "totalAmount": 5590,
                "cartItems": [{ "amount": 5000, "name": "book" }]
            }])
        );
    }

    #[test]
    fn test_cart_list_normalizes_every_level() {
        let carts = json!([{
            "shippingAmount": 10,
            "totalAmount": 100,
            "cartItems": [{
                "amount": 90,
                "items": [{ "amount": 45 }, { "amount": 45 }]
            }]
        }]);

        let normalized = normalize_cart_list(&carts, CurrencyUnit::Toman);

        assert_eq!(
            normalized,
            json!([{
                "shippingAmount": 100,
                "totalAmount": 1000,
                "cartItems": [{
                    "amount": 900,
                    "items": [{ "amount": 450 }, { "amount": 450 }]
                }]
            }])
        );
    }

    #[test]
    fn test_rial_cart_passes_through_numerically_unchanged() {
        let carts = json!([{ "shippingAmount": 10, "cartItems": [{ "amount": 90 }] }]);
        let normalized = normalize_cart_list(&carts, CurrencyUnit::Rial);
        assert_eq!(normalized, carts);
    }

    #[test]
    fn test_empty_cart_list_is_noop() {
        let empty = json!([]);
        assert_eq!(normalize_cart_list(&empty, CurrencyUnit::Toman), json!([]));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let cart = json!({ "shippingAmount": 50, "cartItems": [{ "amount": 500 }] });
        let before = cart.clone();
        let _ = normalize_cart_list(&cart, CurrencyUnit::Toman);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_item_without_amount_is_left_alone() {
        let carts = json!([{ "shippingAmount": 10, "cartItems": [{ "name": "gift" }] }]);
        let normalized = normalize_cart_list(&carts, CurrencyUnit::Toman);
        assert_eq!(
            normalized,
            json!([{ "shippingAmount": 100, "cartItems": [{ "name": "gift" }] }])
        );
    }

    #[test]
    fn test_non_cart_payload_passes_through() {
        let raw = json!("not a cart");
        assert_eq!(normalize_cart_list(&raw, CurrencyUnit::Toman), raw);
    }
}
