//! # Discount Policy
//!
//! One order-level discount at a time, plus an optional discount per line.
//!
//! ## Rules
//! ```text
//! ┌──────────────────────┬───────────────────────┬──────────────────────────┐
//! │ Kind                 │ Valid value           │ Resulting amount         │
//! ├──────────────────────┼───────────────────────┼──────────────────────────┤
//! │ Percentage (order)   │ 0 < bps ≤ 10000       │ subtotal × bps (½ even)  │
//! │ Amount (order)       │ 0 < amount ≤ subtotal │ amount                   │
//! │ Percentage (line)    │ 0 < bps ≤ 10000       │ line gross × bps         │
//! │ Amount (line)        │ 0 < amount ≤ gross    │ amount                   │
//! └──────────────────────┴───────────────────────┴──────────────────────────┘
//! ```
//!
//! A successful call overwrites whatever discount was there before; it never
//! stacks. A failed call leaves the cart exactly as it was.

use std::str::FromStr;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, BPS_SCALE};
use crate::pricing;
use crate::types::{Discount, DiscountReason};

/// Applies an order-level discount, replacing any previous one.
///
/// Returns the discount amount now stored on the cart.
///
/// ```rust
/// use pathway_core::discount::apply_order_discount;
/// use pathway_core::{Cart, Discount, DiscountReason, Money, Product, TaxRate};
///
/// let mut cart = Cart::new(TaxRate::from_bps(1250));
/// let product = Product {
///     id: "p".into(),
///     sku: "SKU".into(),
///     barcode: None,
///     name: "Vitamin C".into(),
///     unit_price: Money::from_minor(1000),
///     generic_name: None,
///     strength: None,
///     requires_prescription: false,
/// };
/// cart.add_product(&product, 2).unwrap();
///
/// let applied = apply_order_discount(
///     &mut cart,
///     Discount::Percentage { bps: 1000 },
///     Some(DiscountReason::Loyalty),
/// )
/// .unwrap();
/// assert_eq!(applied, Money::from_minor(200));
/// ```
pub fn apply_order_discount(
    cart: &mut Cart,
    discount: Discount,
    reason: Option<DiscountReason>,
) -> CoreResult<Money> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let subtotal = pricing::subtotal(cart);
    let amount = resolve_amount(discount, subtotal, "subtotal")?;

    cart.set_order_discount(amount, reason);
    Ok(amount)
}

/// Drops the order discount and its reason.
pub fn remove_order_discount(cart: &mut Cart) {
    cart.set_order_discount(Money::zero(), None);
}

/// Applies a discount to a single line, replacing any previous line discount.
///
/// The bound is the line's gross value (quantity × unit price). Because the
/// subtotal shrinks, the order discount is re-clamped afterwards.
pub fn apply_line_discount(
    cart: &mut Cart,
    product_id: &str,
    discount: Discount,
) -> CoreResult<Money> {
    let gross = cart
        .get(product_id)
        .map(|line| line.gross())
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let amount = resolve_amount(discount, gross, "line value")?;
    cart.set_line_discount(product_id, amount)?;
    Ok(amount)
}

/// Turns a discount into a concrete amount against `base`.
///
/// A percentage that rounds to 0.00 is refused rather than recorded as an
/// empty discount with a reason attached.
fn resolve_amount(discount: Discount, base: Money, base_label: &str) -> CoreResult<Money> {
    match discount {
        Discount::Percentage { bps } => {
            if bps == 0 {
                return Err(CoreError::invalid_discount("percentage must be above 0%"));
            }
            if i64::from(bps) > BPS_SCALE {
                return Err(CoreError::invalid_discount("percentage cannot exceed 100%"));
            }
            let amount = base.portion_bps(bps);
            if amount.is_zero() {
                return Err(CoreError::invalid_discount(format!(
                    "percentage takes nothing off {} {}",
                    base_label, base
                )));
            }
            Ok(amount)
        }
        Discount::Amount { amount } => {
            if !amount.is_positive() {
                return Err(CoreError::invalid_discount("amount must be above 0"));
            }
            if amount > base {
                return Err(CoreError::invalid_discount(format!(
                    "amount {} exceeds {} {}",
                    amount, base_label, base
                )));
            }
            Ok(amount)
        }
    }
}

/// Parses cashier input: `"10%"` / `"12.5%"` is a percentage, anything else
/// is a fixed amount (`"5"`, `"2.50"`).
///
/// ```rust
/// use pathway_core::discount::parse_discount;
/// use pathway_core::{Discount, Money};
///
/// assert_eq!(parse_discount("10%").unwrap(), Discount::Percentage { bps: 1000 });
/// assert_eq!(parse_discount("12.5%").unwrap(), Discount::Percentage { bps: 1250 });
/// assert_eq!(
///     parse_discount("2.50").unwrap(),
///     Discount::Amount { amount: Money::from_minor(250) }
/// );
/// ```
pub fn parse_discount(raw: &str) -> CoreResult<Discount> {
    let raw = raw.trim();

    if let Some(percent) = raw.strip_suffix('%') {
        // "12.5" parsed as a two-decimal amount is 1250 hundredths of a
        // percent, which is exactly basis points.
        let hundredths = Money::from_str(percent.trim())
            .map_err(|_| CoreError::invalid_discount(format!("'{}' is not a percentage", raw)))?
            .minor_units();
        let bps = u32::try_from(hundredths)
            .map_err(|_| CoreError::invalid_discount(format!("'{}' is out of range", raw)))?;
        return Ok(Discount::Percentage { bps });
    }

    let amount = Money::from_str(raw)
        .map_err(|_| CoreError::invalid_discount(format!("'{}' is not an amount", raw)))?;
    Ok(Discount::Amount { amount })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::product;
    use crate::types::TaxRate;

    fn reference_cart() -> Cart {
        let mut cart = Cart::new(TaxRate::from_bps(1250));
        cart.add_product(&product("p", 1000), 2).unwrap();
        cart
    }

    #[test]
    fn test_percentage_discount_scenario() {
        let mut cart = reference_cart();
        apply_order_discount(&mut cart, Discount::Percentage { bps: 1000 }, None).unwrap();

        assert_eq!(cart.order_discount(), Money::from_minor(200));
        assert_eq!(pricing::taxable_base(&cart), Money::from_minor(1800));
        assert_eq!(pricing::tax_amount(&cart), Money::from_minor(225));
        assert_eq!(pricing::grand_total(&cart), Money::from_minor(2025));
    }

    #[test]
    fn test_amount_over_subtotal_rejected_and_unchanged() {
        let mut cart = reference_cart();
        apply_order_discount(
            &mut cart,
            Discount::Amount {
                amount: Money::from_minor(300),
            },
            Some(DiscountReason::Staff),
        )
        .unwrap();

        let result = apply_order_discount(
            &mut cart,
            Discount::Amount {
                amount: Money::from_minor(5000),
            },
            Some(DiscountReason::Promotion),
        );

        assert!(matches!(result, Err(CoreError::InvalidDiscount { .. })));
        assert_eq!(cart.order_discount(), Money::from_minor(300));
        assert_eq!(cart.discount_reason(), Some(DiscountReason::Staff));
    }

    #[test]
    fn test_out_of_range_values() {
        let mut cart = reference_cart();
        let before = cart.clone();

        for bad in [
            Discount::Percentage { bps: 0 },
            Discount::Percentage { bps: 10_001 },
            Discount::Amount {
                amount: Money::zero(),
            },
            Discount::Amount {
                amount: Money::from_minor(-100),
            },
        ] {
            assert!(apply_order_discount(&mut cart, bad, None).is_err());
        }
        assert_eq!(cart, before);
    }

    #[test]
    fn test_percentage_rounding_to_zero_rejected() {
        let mut cart = Cart::new(TaxRate::from_bps(1250));
        cart.add_product(&product("p", 100), 1).unwrap();
        apply_order_discount(
            &mut cart,
            Discount::Amount {
                amount: Money::from_minor(10),
            },
            Some(DiscountReason::Staff),
        )
        .unwrap();
        let before = cart.clone();

        // 0.01% of 1.00 is 0.0001
        let result = apply_order_discount(
            &mut cart,
            Discount::Percentage { bps: 1 },
            Some(DiscountReason::Loyalty),
        );
        assert!(matches!(result, Err(CoreError::InvalidDiscount { .. })));
        assert!(matches!(
            apply_line_discount(&mut cart, "p", Discount::Percentage { bps: 1 }),
            Err(CoreError::InvalidDiscount { .. })
        ));
        assert_eq!(cart, before);
        assert_eq!(cart.discount_reason(), Some(DiscountReason::Staff));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let mut cart = reference_cart();
        apply_order_discount(&mut cart, Discount::Percentage { bps: 10_000 }, None).unwrap();
        assert_eq!(pricing::grand_total(&cart), Money::zero());

        apply_order_discount(
            &mut cart,
            Discount::Amount {
                amount: Money::from_minor(2000),
            },
            None,
        )
        .unwrap();
        assert_eq!(pricing::taxable_base(&cart), Money::zero());
    }

    #[test]
    fn test_discount_overwrites_not_stacks() {
        let mut cart = reference_cart();
        apply_order_discount(&mut cart, Discount::Percentage { bps: 1000 }, None).unwrap();
        apply_order_discount(
            &mut cart,
            Discount::Amount {
                amount: Money::from_minor(50),
            },
            Some(DiscountReason::PriceMatch),
        )
        .unwrap();

        assert_eq!(cart.order_discount(), Money::from_minor(50));
        assert_eq!(cart.discount_reason(), Some(DiscountReason::PriceMatch));
    }

    #[test]
    fn test_discount_on_empty_cart() {
        let mut cart = Cart::new(TaxRate::from_bps(1250));
        assert_eq!(
            apply_order_discount(&mut cart, Discount::Percentage { bps: 500 }, None),
            Err(CoreError::EmptyCart)
        );
    }

    #[test]
    fn test_remove_order_discount() {
        let mut cart = reference_cart();
        apply_order_discount(
            &mut cart,
            Discount::Percentage { bps: 500 },
            Some(DiscountReason::SeniorCitizen),
        )
        .unwrap();

        remove_order_discount(&mut cart);
        assert!(cart.order_discount().is_zero());
        assert_eq!(cart.discount_reason(), None);
    }

    #[test]
    fn test_line_discount() {
        let mut cart = reference_cart();
        let applied =
            apply_line_discount(&mut cart, "p", Discount::Percentage { bps: 2500 }).unwrap();

        assert_eq!(applied, Money::from_minor(500));
        assert_eq!(pricing::subtotal(&cart), Money::from_minor(1500));
        assert_eq!(pricing::line_discount_total(&cart), Money::from_minor(500));

        assert!(matches!(
            apply_line_discount(
                &mut cart,
                "p",
                Discount::Amount {
                    amount: Money::from_minor(2001)
                }
            ),
            Err(CoreError::InvalidDiscount { .. })
        ));
        assert!(matches!(
            apply_line_discount(&mut cart, "zzz", Discount::Percentage { bps: 100 }),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_line_discount_reclamps_order_discount() {
        let mut cart = reference_cart();
        apply_order_discount(
            &mut cart,
            Discount::Amount {
                amount: Money::from_minor(1800),
            },
            Some(DiscountReason::Damaged),
        )
        .unwrap();

        apply_line_discount(
            &mut cart,
            "p",
            Discount::Amount {
                amount: Money::from_minor(500),
            },
        )
        .unwrap();

        assert_eq!(pricing::subtotal(&cart), Money::from_minor(1500));
        assert_eq!(cart.order_discount(), Money::from_minor(1500));
        assert!(pricing::taxable_base(&cart) >= Money::zero());
    }

    #[test]
    fn test_parse_discount() {
        assert_eq!(
            parse_discount(" 5 % ").unwrap(),
            Discount::Percentage { bps: 500 }
        );
        assert_eq!(
            parse_discount("50").unwrap(),
            Discount::Amount {
                amount: Money::from_minor(5000)
            }
        );
        assert!(parse_discount("ten%").is_err());
        assert!(parse_discount("-5%").is_err());
        assert!(parse_discount("abc").is_err());
    }
}
