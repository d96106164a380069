//! # Pricing
//!
//! Totals are derived from the cart on every read; nothing here is cached.
//!
//! ```text
//!   line_total   = quantity × unit_price − line_discount
//!   subtotal     = Σ line_total
//!   taxable_base = subtotal − order_discount
//!   tax          = taxable_base × rate   (half to even, minor units)
//!   grand_total  = taxable_base + tax
//!   change       = tendered − grand_total
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::TaxRate;

/// quantity × unit_price − line_discount, checked.
///
/// ```rust
/// use pathway_core::{pricing, Money};
///
/// let total = pricing::line_total(3, Money::from_minor(450), Money::from_minor(50)).unwrap();
/// assert_eq!(total, Money::from_minor(1300));
///
/// assert!(pricing::line_total(1, Money::from_minor(450), Money::from_minor(451)).is_err());
/// ```
pub fn line_total(quantity: i64, unit_price: Money, line_discount: Money) -> CoreResult<Money> {
    if quantity < 1 {
        return Err(CoreError::invalid_line("quantity must be at least 1"));
    }
    if unit_price.is_negative() {
        return Err(CoreError::invalid_line("unit price cannot be negative"));
    }
    if line_discount.is_negative() {
        return Err(CoreError::invalid_line("line discount cannot be negative"));
    }

    let gross = unit_price
        .checked_times(quantity)
        .ok_or_else(|| CoreError::invalid_line("line value too large"))?;

    if line_discount > gross {
        return Err(CoreError::invalid_line(format!(
            "line discount {} exceeds line value {}",
            line_discount, gross
        )));
    }

    Ok(gross - line_discount)
}

/// Σ line totals.
pub fn subtotal(cart: &Cart) -> Money {
    cart.items().iter().map(|item| item.line_total()).sum()
}

/// Σ line discounts, shown separately on the receipt.
pub fn line_discount_total(cart: &Cart) -> Money {
    cart.items().iter().map(|item| item.line_discount()).sum()
}

/// Subtotal minus the order discount.
///
/// The cart keeps `order_discount ≤ subtotal`, so this is never negative.
pub fn taxable_base(cart: &Cart) -> Money {
    subtotal(cart) - cart.order_discount()
}

pub fn tax_amount(cart: &Cart) -> Money {
    taxable_base(cart).calculate_tax(cart.tax_rate())
}

pub fn grand_total(cart: &Cart) -> Money {
    let base = taxable_base(cart);
    base + base.calculate_tax(cart.tax_rate())
}

/// Change due to the customer.
///
/// A short payment is an error, never a floored zero.
pub fn change(tendered: Money, total: Money) -> CoreResult<Money> {
    if tendered < total {
        return Err(CoreError::InsufficientPayment { total, tendered });
    }
    Ok(tendered - total)
}

// =============================================================================
// Totals Snapshot
// =============================================================================

/// Every derived amount of a cart, computed in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Money,
    pub line_discount_total: Money,
    pub order_discount: Money,
    pub taxable_base: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub grand_total: Money,
}

impl Totals {
    pub fn of(cart: &Cart) -> Self {
        let subtotal = subtotal(cart);
        let taxable_base = subtotal - cart.order_discount();
        let tax = taxable_base.calculate_tax(cart.tax_rate());

        Totals {
            subtotal,
            line_discount_total: line_discount_total(cart),
            order_discount: cart.order_discount(),
            taxable_base,
            tax_rate: cart.tax_rate(),
            tax,
            grand_total: taxable_base + tax,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
