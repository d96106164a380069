//! # Validation Module
//!
//! Input validation for cashier-entered values.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Display surface                                              │
//! │  ├── Numeric keypads, provider pickers                                 │
//! │  └── Immediate cashier feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Register command                                             │
//! │  ├── Parsing (quantities, amounts)                                     │
//! │  └── THIS MODULE: range and format rules                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart / Discount / Checkout invariants                        │
//! │  └── Rules that depend on cart state (discount ≤ subtotal, ...)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::{Money, BPS_SCALE};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an opaque product identifier or barcode.
pub fn validate_product_ref(product_ref: &str) -> ValidationResult<()> {
    let product_ref = product_ref.trim();

    if product_ref.is_empty() {
        return Err(ValidationError::Required {
            field: "product".to_string(),
        });
    }

    if product_ref.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "product".to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (the catalog returns its default listing)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a mobile money phone number.
///
/// ## Rules
/// - Must not be empty
/// - Digits, `+`, spaces and dashes only, with 9 to 15 digits
///
/// ```rust
/// use pathway_core::validation::validate_phone;
///
/// assert!(validate_phone("024 123 4567").is_ok());
/// assert!(validate_phone("+233241234567").is_ok());
/// assert!(validate_phone("").is_err());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == ' ' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, dashes and a leading +".to_string(),
        });
    }

    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(9..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have between 9 and 15 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// Zero is allowed (free samples); negative prices and anything above
/// [`MAX_UNIT_PRICE`] are not.
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "unit price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE.minor_units(),
        });
    }

    Ok(())
}

/// Validates a tendered amount. Zero is accepted (a fully discounted sale).
pub fn validate_tendered(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "tendered amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if i64::from(bps) > BPS_SCALE {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: BPS_SCALE,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits in the cart.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Quantity Editing
// =============================================================================

/// What a free-text quantity edit means for a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityEdit {
    /// Set the line to this quantity.
    Set(i64),
    /// Remove the line.
    Remove,
}

/// Interprets the quantity field of a cart line.
///
/// Anything that is not a positive integer removes the line, the same as
/// typing `0`. The line disappears from the display at once, so the cashier
/// sees the effect immediately.
///
/// ```rust
/// use pathway_core::validation::{parse_quantity_input, QuantityEdit};
///
/// assert_eq!(parse_quantity_input("3"), QuantityEdit::Set(3));
/// assert_eq!(parse_quantity_input("0"), QuantityEdit::Remove);
/// assert_eq!(parse_quantity_input("two"), QuantityEdit::Remove);
/// ```
pub fn parse_quantity_input(raw: &str) -> QuantityEdit {
    match raw.trim().parse::<i64>() {
        Ok(qty) if qty > 0 => QuantityEdit::Set(qty),
        _ => QuantityEdit::Remove,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
