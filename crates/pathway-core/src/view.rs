//! # Render Model
//!
//! What the display surface draws after every cart mutation. Built fresh from
//! the cart each time; it carries no state of its own.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, LineItem};
use crate::money::Money;
use crate::pricing::Totals;
use crate::types::{DiscountReason, TaxRate};

/// One cart row with its computed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_discount: Money,
    pub line_total: Money,
    pub requires_prescription: bool,
    /// Prescription-only line without prescription details yet.
    pub prescription_missing: bool,
}

impl From<&LineItem> for LineView {
    fn from(item: &LineItem) -> Self {
        LineView {
            product_id: item.product_id().to_string(),
            name: item.name().to_string(),
            sku: item.sku().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            line_discount: item.line_discount(),
            line_total: item.line_total(),
            requires_prescription: item.requires_prescription(),
            prescription_missing: item.requires_prescription() && item.prescription().is_none(),
        }
    }
}

/// The whole cart as the display surface sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<LineView>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub customer_id: Option<String>,
    pub subtotal: Money,
    pub order_discount: Money,
    pub discount_reason: Option<DiscountReason>,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub grand_total: Money,
    /// True when there is something to check out.
    pub checkout_enabled: bool,
}

impl CartView {
    pub fn of(cart: &Cart) -> Self {
        let totals = Totals::of(cart);

        CartView {
            lines: cart.items().iter().map(LineView::from).collect(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            customer_id: cart.customer_id().map(str::to_string),
            subtotal: totals.subtotal,
            order_discount: totals.order_discount,
            discount_reason: cart.discount_reason(),
            tax_rate: totals.tax_rate,
            tax: totals.tax,
            grand_total: totals.grand_total,
            checkout_enabled: !cart.is_empty(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView::of(cart)
    }
}
