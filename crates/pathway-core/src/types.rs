//! # Domain Types
//!
//! Value types shared by every part of the engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Tender      │   │    Discount     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (opaque)    │   │  Cash           │   │  Percentage     │       │
//! │  │  sku, barcode   │   │  MobileMoney{…} │   │  Amount         │       │
//! │  │  unit_price     │   │  Card{…}        │   └─────────────────┘       │
//! │  │  generic_name   │   │  BankTransfer{…}│                             │
//! │  │  strength       │   │  Insurance{…}   │   ┌─────────────────┐       │
//! │  │  requires_rx    │   │  StoreCredit    │   │ DiscountReason  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │ PaymentMethod   │   │ NotificationLvl │       │
//! │  │  bps (u32)      │   │ (Tender's tag)  │   │ info … danger   │       │
//! │  │  1250 = 12.5%   │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every closed set (payment methods, providers, discount kinds and reasons,
//! notification levels) is an enum so an invalid value cannot be represented.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1250 bps = 12.5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Renders `1250` as `12.5%` and `825` as `8.25%`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as resolved by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Opaque catalog identifier. Identity key of a cart line.
    pub id: String,

    /// Stock Keeping Unit.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, ...).
    #[serde(default)]
    pub barcode: Option<String>,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Price per unit in minor units.
    pub unit_price: Money,

    /// International non-proprietary name, e.g. "Paracetamol".
    #[serde(default)]
    pub generic_name: Option<String>,

    /// Dosage strength, e.g. "500mg".
    #[serde(default)]
    pub strength: Option<String>,

    /// Prescription-only medicine.
    #[serde(default)]
    pub requires_prescription: bool,
}

/// A search result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub generic_name: Option<String>,
    pub strength: Option<String>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        ProductSummary {
            id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            generic_name: product.generic_name.clone(),
            strength: product.strength.clone(),
        }
    }
}

/// Prescription details captured against a dispensed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub prescription_number: String,
    pub prescriber_name: String,
    pub days_supply: Option<u32>,
}

// =============================================================================
// Payment
// =============================================================================

/// The payment methods the till accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    Card,
    BankTransfer,
    Insurance,
    StoreCredit,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::MobileMoney => "Mobile Money",
            PaymentMethod::Card => "Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Insurance => "Insurance",
            PaymentMethod::StoreCredit => "Store Credit",
        };
        f.write_str(label)
    }
}

/// Mobile money networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MobileMoneyProvider {
    Mtn,
    Vodafone,
    AirtelTigo,
}

impl fmt::Display for MobileMoneyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MobileMoneyProvider::Mtn => f.write_str("MTN MoMo"),
            MobileMoneyProvider::Vodafone => f.write_str("Vodafone Cash"),
            MobileMoneyProvider::AirtelTigo => f.write_str("AirtelTigo Money"),
        }
    }
}

impl FromStr for MobileMoneyProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mtn" | "momo" => Ok(MobileMoneyProvider::Mtn),
            "vodafone" | "telecel" => Ok(MobileMoneyProvider::Vodafone),
            "airteltigo" | "airtel" | "tigo" => Ok(MobileMoneyProvider::AirtelTigo),
            _ => Err(ValidationError::NotAllowed {
                field: "provider".to_string(),
                allowed: vec!["mtn".into(), "vodafone".into(), "airteltigo".into()],
            }),
        }
    }
}

/// How the customer is paying, with the details each method needs.
///
/// The mobile money fields are optional here because the cashier fills them
/// in on the checkout surface; completeness is enforced when the amount is
/// entered, not when the method is picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Tender {
    Cash,
    MobileMoney {
        provider: Option<MobileMoneyProvider>,
        phone: String,
    },
    Card {
        reference: Option<String>,
    },
    BankTransfer {
        reference: Option<String>,
    },
    Insurance {
        claim_number: Option<String>,
    },
    StoreCredit,
}

impl Tender {
    /// The method tag of this tender.
    pub fn method(&self) -> PaymentMethod {
        match self {
            Tender::Cash => PaymentMethod::Cash,
            Tender::MobileMoney { .. } => PaymentMethod::MobileMoney,
            Tender::Card { .. } => PaymentMethod::Card,
            Tender::BankTransfer { .. } => PaymentMethod::BankTransfer,
            Tender::Insurance { .. } => PaymentMethod::Insurance,
            Tender::StoreCredit => PaymentMethod::StoreCredit,
        }
    }

    /// External reference printed on the receipt (card auth code, transfer
    /// reference, insurance claim number).
    pub fn reference(&self) -> Option<&str> {
        match self {
            Tender::Card { reference } | Tender::BankTransfer { reference } => reference.as_deref(),
            Tender::Insurance { claim_number } => claim_number.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// A discount as entered by the cashier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage off, in basis points (1000 = 10%).
    Percentage { bps: u32 },
    /// Fixed amount off.
    Amount { amount: Money },
}

/// Why an order discount was given. Printed on the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountReason {
    SeniorCitizen,
    Staff,
    Loyalty,
    Promotion,
    PriceMatch,
    Damaged,
    ManagerOverride,
}

impl fmt::Display for DiscountReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiscountReason::SeniorCitizen => "Senior citizen",
            DiscountReason::Staff => "Staff",
            DiscountReason::Loyalty => "Loyalty",
            DiscountReason::Promotion => "Promotion",
            DiscountReason::PriceMatch => "Price match",
            DiscountReason::Damaged => "Damaged packaging",
            DiscountReason::ManagerOverride => "Manager override",
        };
        f.write_str(label)
    }
}

impl FromStr for DiscountReason {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "senior" | "senior_citizen" => Ok(DiscountReason::SeniorCitizen),
            "staff" => Ok(DiscountReason::Staff),
            "loyalty" => Ok(DiscountReason::Loyalty),
            "promo" | "promotion" => Ok(DiscountReason::Promotion),
            "price_match" => Ok(DiscountReason::PriceMatch),
            "damaged" => Ok(DiscountReason::Damaged),
            "manager" | "manager_override" => Ok(DiscountReason::ManagerOverride),
            _ => Err(ValidationError::NotAllowed {
                field: "reason".to_string(),
                allowed: [
                    "senior_citizen",
                    "staff",
                    "loyalty",
                    "promotion",
                    "price_match",
                    "damaged",
                    "manager_override",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            }),
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Severity of a transient notification on the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Info => f.write_str("info"),
            NotificationLevel::Success => f.write_str("success"),
            NotificationLevel::Warning => f.write_str("warning"),
            NotificationLevel::Danger => f.write_str("danger"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_display() {
        assert_eq!(TaxRate::from_bps(1250).to_string(), "12.5%");
        assert_eq!(TaxRate::from_bps(825).to_string(), "8.25%");
        assert_eq!(TaxRate::from_bps(1500).to_string(), "15%");
        assert_eq!(TaxRate::zero().to_string(), "0%");
    }

    #[test]
    fn test_tender_method_and_reference() {
        let card = Tender::Card {
            reference: Some("AUTH-991".into()),
        };
        assert_eq!(card.method(), PaymentMethod::Card);
        assert_eq!(card.reference(), Some("AUTH-991"));

        let momo = Tender::MobileMoney {
            provider: Some(MobileMoneyProvider::Mtn),
            phone: "0241234567".into(),
        };
        assert_eq!(momo.method(), PaymentMethod::MobileMoney);
        assert_eq!(momo.reference(), None);
    }

    #[test]
    fn test_tender_serializes_with_method_tag() {
        let json = serde_json::to_value(Tender::MobileMoney {
            provider: Some(MobileMoneyProvider::AirtelTigo),
            phone: "0271112222".into(),
        })
        .unwrap();
        assert_eq!(json["method"], "mobile_money");
        assert_eq!(json["provider"], "airtel_tigo");
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("MTN".parse::<MobileMoneyProvider>().unwrap(), MobileMoneyProvider::Mtn);
        assert_eq!(
            "airtel".parse::<MobileMoneyProvider>().unwrap(),
            MobileMoneyProvider::AirtelTigo
        );
        assert!("paypal".parse::<MobileMoneyProvider>().is_err());
    }

    #[test]
    fn test_discount_reason_parsing() {
        assert_eq!(
            "senior-citizen".parse::<DiscountReason>().unwrap(),
            DiscountReason::SeniorCitizen
        );
        assert_eq!("promo".parse::<DiscountReason>().unwrap(), DiscountReason::Promotion);
        assert!("birthday".parse::<DiscountReason>().is_err());
    }

    #[test]
    fn test_summary_from_product() {
        let product = Product {
            id: "p-1".into(),
            sku: "PARA-500".into(),
            barcode: Some("6001234567890".into()),
            name: "Paracetamol 500mg x24".into(),
            unit_price: Money::from_minor(1250),
            generic_name: Some("Paracetamol".into()),
            strength: Some("500mg".into()),
            requires_prescription: false,
        };
        let summary = ProductSummary::from(&product);
        assert_eq!(summary.id, "p-1");
        assert_eq!(summary.unit_price, Money::from_minor(1250));
        assert_eq!(summary.strength.as_deref(), Some("500mg"));
    }
}
