//! # Receipt Record Builder
//!
//! Turns the cart snapshot and an accepted payment into a [`SaleRecord`],
//! the immutable value handed to the print/export surface.
//!
//! ```text
//!   Cart (borrowed) ──┐
//!   AcceptedPayment ──┼──► SaleRecord::build() ──► SaleRecord (owned copy)
//!   cashier, number ──┤                                   │
//!   now ──────────────┘                                   ▼
//!                                                  ReceiptPrinter / JSON
//! ```
//!
//! The builder only reads the cart. Clearing it afterwards is the caller's
//! last step, so a failed build leaves the sale intact for another try.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, LineItem};
use crate::checkout::AcceptedPayment;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::Totals;
use crate::types::{
    DiscountReason, MobileMoneyProvider, PaymentMethod, Prescription, TaxRate, Tender,
};

// =============================================================================
// Record Types
// =============================================================================

/// A line as it was sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_discount: Money,
    pub line_total: Money,
    pub generic_name: Option<String>,
    pub strength: Option<String>,
    pub prescription: Option<Prescription>,
}

impl From<&LineItem> for ReceiptLine {
    fn from(item: &LineItem) -> Self {
        ReceiptLine {
            product_id: item.product_id().to_string(),
            name: item.name().to_string(),
            sku: item.sku().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            line_discount: item.line_discount(),
            line_total: item.line_total(),
            generic_name: item.generic_name().map(str::to_string),
            strength: item.strength().map(str::to_string),
            prescription: item.prescription().cloned(),
        }
    }
}

/// How the sale was paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub method: PaymentMethod,
    pub provider: Option<MobileMoneyProvider>,
    pub phone: Option<String>,
    pub reference: Option<String>,
    pub tendered: Money,
    pub change: Money,
}

impl From<&AcceptedPayment> for PaymentSummary {
    fn from(payment: &AcceptedPayment) -> Self {
        let (provider, phone) = match &payment.tender {
            Tender::MobileMoney { provider, phone } => (*provider, Some(phone.trim().to_string())),
            _ => (None, None),
        };

        PaymentSummary {
            method: payment.tender.method(),
            provider,
            phone,
            reference: payment.tender.reference().map(str::to_string),
            tendered: payment.tendered,
            change: payment.change,
        }
    }
}

/// A completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub sale_number: String,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub line_discount_total: Money,
    pub order_discount: Money,
    pub discount_reason: Option<DiscountReason>,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub grand_total: Money,
    pub payment: PaymentSummary,
    pub cashier: String,
    pub customer_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleRecord {
    /// Builds the record from the cart as it stands.
    ///
    /// ## Errors
    /// - `EmptyCart` if there is nothing to sell
    /// - `SaleRecordInconsistent` if the payment was accepted against a
    ///   total other than the cart's current grand total, or its change
    ///   does not add up
    /// - `Validation` if the cashier name is blank
    pub fn build(
        cart: &Cart,
        payment: &AcceptedPayment,
        cashier: &str,
        sale_number: String,
        now: DateTime<Utc>,
    ) -> CoreResult<SaleRecord> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let cashier = cashier.trim();
        if cashier.is_empty() {
            return Err(ValidationError::Required {
                field: "cashier".to_string(),
            }
            .into());
        }

        let totals = Totals::of(cart);
        if payment.total != totals.grand_total {
            return Err(CoreError::SaleRecordInconsistent {
                reason: format!(
                    "payment accepted against {} but cart total is {}",
                    payment.total, totals.grand_total
                ),
            });
        }
        if payment.tendered - payment.total != payment.change {
            return Err(CoreError::SaleRecordInconsistent {
                reason: format!(
                    "change {} does not match tendered {} minus total {}",
                    payment.change, payment.tendered, payment.total
                ),
            });
        }

        Ok(SaleRecord {
            sale_number,
            lines: cart.items().iter().map(ReceiptLine::from).collect(),
            subtotal: totals.subtotal,
            line_discount_total: totals.line_discount_total,
            order_discount: totals.order_discount,
            discount_reason: cart.discount_reason(),
            tax_rate: totals.tax_rate,
            tax: totals.tax,
            grand_total: totals.grand_total,
            payment: PaymentSummary::from(payment),
            cashier: cashier.to_string(),
            customer_id: cart.customer_id().map(str::to_string),
            created_at: now,
        })
    }

    /// Total units sold across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// JSON export for the print/export surface.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// =============================================================================
// Sale Numbers
// =============================================================================

/// Issues `POS<yyyymmdd>-<hhmmss>-<seq>` sale numbers.
///
/// Unique within a session; the sequence restarts with the process.
#[derive(Debug, Default)]
pub struct SaleNumberGenerator {
    sequence: u32,
}

impl SaleNumberGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, now: DateTime<Utc>) -> String {
        self.sequence += 1;
        format!("POS{}-{:04}", now.format("%Y%m%d-%H%M%S"), self.sequence)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::product;
    use crate::discount::apply_order_discount;
    use crate::types::Discount;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap()
    }

    fn reference_cart() -> Cart {
        let mut cart = Cart::new(TaxRate::from_bps(1250));
        cart.add_product(&product("p", 1000), 2).unwrap();
        cart
    }

    fn cash(tendered: i64, total: i64) -> AcceptedPayment {
        AcceptedPayment {
            tender: Tender::Cash,
            tendered: Money::from_minor(tendered),
            total: Money::from_minor(total),
            change: Money::from_minor(tendered - total),
        }
    }

    #[test]
    fn test_build_reference_sale() {
        let cart = reference_cart();
        let record =
            SaleRecord::build(&cart, &cash(2500, 2250), "Ama", "POS-1".into(), now()).unwrap();

        assert_eq!(record.lines.len(), 1);
        assert_eq!(record.lines[0].line_total, Money::from_minor(2000));
        assert_eq!(record.subtotal, Money::from_minor(2000));
        assert_eq!(record.tax, Money::from_minor(250));
        assert_eq!(record.grand_total, Money::from_minor(2250));
        assert_eq!(record.payment.method, PaymentMethod::Cash);
        assert_eq!(record.payment.change, Money::from_minor(250));
        assert_eq!(record.cashier, "Ama");
        assert_eq!(record.total_quantity(), 2);
    }

    #[test]
    fn test_record_is_a_copy() {
        let mut cart = reference_cart();
        let record =
            SaleRecord::build(&cart, &cash(2250, 2250), "Ama", "POS-1".into(), now()).unwrap();

        cart.clear();
        assert_eq!(record.lines.len(), 1);
    }

    #[test]
    fn test_stale_total_rejected() {
        let mut cart = reference_cart();
        let payment = cash(2500, 2250);
        apply_order_discount(&mut cart, Discount::Percentage { bps: 1000 }, None).unwrap();

        assert!(matches!(
            SaleRecord::build(&cart, &payment, "Ama", "POS-1".into(), now()),
            Err(CoreError::SaleRecordInconsistent { .. })
        ));
    }

    #[test]
    fn test_bad_change_rejected() {
        let cart = reference_cart();
        let mut payment = cash(2500, 2250);
        payment.change = Money::from_minor(300);

        assert!(matches!(
            SaleRecord::build(&cart, &payment, "Ama", "POS-1".into(), now()),
            Err(CoreError::SaleRecordInconsistent { .. })
        ));
    }

    #[test]
    fn test_empty_cart_and_blank_cashier() {
        let empty = Cart::new(TaxRate::from_bps(1250));
        assert_eq!(
            SaleRecord::build(&empty, &cash(0, 0), "Ama", "POS-1".into(), now()),
            Err(CoreError::EmptyCart)
        );

        let cart = reference_cart();
        assert!(matches!(
            SaleRecord::build(&cart, &cash(2250, 2250), "  ", "POS-1".into(), now()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_mobile_money_payment_summary() {
        let cart = reference_cart();
        let payment = AcceptedPayment {
            tender: Tender::MobileMoney {
                provider: Some(MobileMoneyProvider::Mtn),
                phone: " 0241234567 ".into(),
            },
            tendered: Money::from_minor(2250),
            total: Money::from_minor(2250),
            change: Money::zero(),
        };

        let record = SaleRecord::build(&cart, &payment, "Kofi", "POS-2".into(), now()).unwrap();
        assert_eq!(record.payment.method, PaymentMethod::MobileMoney);
        assert_eq!(record.payment.provider, Some(MobileMoneyProvider::Mtn));
        assert_eq!(record.payment.phone.as_deref(), Some("0241234567"));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let cart = reference_cart();
        let record =
            SaleRecord::build(&cart, &cash(2500, 2250), "Ama", "POS-1".into(), now()).unwrap();
        let json = record.to_json().unwrap();

        assert!(json.contains("\"saleNumber\""));
        assert!(json.contains("\"grandTotal\""));
        assert!(json.contains("\"lineTotal\""));

        let back: SaleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_sale_numbers_unique_within_second() {
        let mut numbers = SaleNumberGenerator::new();
        let first = numbers.next(now());
        let second = numbers.next(now());

        assert_eq!(first, "POS20261016-093005-0001");
        assert_eq!(second, "POS20261016-093005-0002");
    }
}
