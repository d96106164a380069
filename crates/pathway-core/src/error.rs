//! # Error Types
//!
//! Domain-specific error types for pathway-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pathway-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  register errors (app crate)                                           │
//! │  ├── CatalogError     - Catalog collaborator failures                  │
//! │  └── RegisterError    - Config / I/O failures                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → Notification (level + message)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, amounts, ticket id)
//! 3. Errors are enum variants, never String
//! 4. Every variant is recoverable and maps to a notification level
//! 5. A failed operation is a no-op: no variant is ever returned after a
//!    partial mutation

use thiserror::Error;

use crate::money::Money;
use crate::types::NotificationLevel;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The catalog could not resolve a product id or barcode.
    ///
    /// ```text
    /// Scan "6001234567890"
    ///      │
    ///      ▼
    /// Catalog: no match
    ///      │
    ///      ▼
    /// ProductNotFound("6001234567890") → warning toast, cart unchanged
    /// ```
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A line item's quantity, price or line discount is out of range.
    #[error("Invalid line item: {reason}")]
    InvalidLineItem { reason: String },

    /// A discount value is out of range for the current cart.
    #[error("Invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    /// The operation needs at least one line in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The operation needs an empty active cart (recalling a held ticket).
    #[error("Active cart is in use; hold or clear it first")]
    CartNotEmpty,

    /// The tendered amount does not cover the grand total.
    #[error("Insufficient payment: total {total}, tendered {tendered}")]
    InsufficientPayment { total: Money, tendered: Money },

    /// A catalog call failed or timed out.
    #[error("Catalog unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// A lookup for the same identifier is already in flight.
    #[error("Lookup for {0} is already in progress")]
    LookupPending(String),

    /// A newer search was issued before this one returned.
    #[error("Search superseded by a newer query")]
    SearchSuperseded,

    /// No held transaction carries this ticket id.
    #[error("Held ticket not found: {0}")]
    HeldTicketNotFound(String),

    /// The checkout step was attempted from the wrong state.
    #[error("Cannot {action} while checkout is {state}")]
    InvalidCheckoutState { state: String, action: String },

    /// The sale record could not be built from the cart and payment given.
    #[error("Sale record inconsistent: {reason}")]
    SaleRecordInconsistent { reason: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// The notification level the display surface uses for this error.
    ///
    /// ```text
    /// warning : lookup misses, empty/non-empty cart, short payment
    /// danger  : out-of-range input, catalog outage, inconsistent record
    /// info    : de-duplicated or superseded lookups (nothing went wrong)
    /// ```
    pub fn level(&self) -> NotificationLevel {
        match self {
            CoreError::ProductNotFound(_)
            | CoreError::EmptyCart
            | CoreError::CartNotEmpty
            | CoreError::HeldTicketNotFound(_)
            | CoreError::InsufficientPayment { .. }
            | CoreError::InvalidCheckoutState { .. } => NotificationLevel::Warning,

            CoreError::InvalidLineItem { .. }
            | CoreError::InvalidDiscount { .. }
            | CoreError::CollaboratorUnavailable(_)
            | CoreError::SaleRecordInconsistent { .. }
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => NotificationLevel::Danger,

            CoreError::LookupPending(_) | CoreError::SearchSuperseded => NotificationLevel::Info,
        }
    }

    pub(crate) fn invalid_line(reason: impl Into<String>) -> Self {
        CoreError::InvalidLineItem {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_discount(reason: impl Into<String>) -> Self {
        CoreError::InvalidDiscount {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when cashier input doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a phone number with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientPayment {
            total: Money::from_minor(2250),
            tendered: Money::from_minor(1000),
        };
        assert_eq!(err.to_string(), "Insufficient payment: total 22.50, tendered 10.00");

        let err = CoreError::InvalidCheckoutState {
            state: "idle".into(),
            action: "enter an amount".into(),
        };
        assert_eq!(err.to_string(), "Cannot enter an amount while checkout is idle");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "phone".to_string(),
        };
        assert_eq!(err.to_string(), "phone is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phone".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.level(), NotificationLevel::Danger);
    }

    #[test]
    fn test_levels_follow_taxonomy() {
        assert_eq!(
            CoreError::ProductNotFound("x".into()).level(),
            NotificationLevel::Warning
        );
        assert_eq!(CoreError::EmptyCart.level(), NotificationLevel::Warning);
        assert_eq!(
            CoreError::invalid_discount("too much").level(),
            NotificationLevel::Danger
        );
        assert_eq!(
            CoreError::CollaboratorUnavailable("timeout".into()).level(),
            NotificationLevel::Danger
        );
        assert_eq!(CoreError::SearchSuperseded.level(), NotificationLevel::Info);
    }
}
