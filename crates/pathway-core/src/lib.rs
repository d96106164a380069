//! # pathway-core: Cart & Checkout Engine for Pathway POS
//!
//! Everything that decides what a sale costs and whether it can be paid for
//! lives here, as plain data and pure functions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pathway POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Display / Notification / Print surfaces             │   │
//! │  │      Cart view ──► Toasts ──► Tender screen ──► Receipt         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartView, Notification, SaleRecord     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   register (session context)                    │   │
//! │  │     Catalog client (timeouts, dedup) ── NotificationCenter      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ pathway-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   money ─► pricing ─► cart ─► discount ─► held                  │   │
//! │  │                         │                                       │   │
//! │  │                         └──► checkout ─► receipt ─► view        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO LOGGING • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer minor-unit Money and half-even percentage maths
//! - [`types`] - Products, tenders, discounts, notification levels
//! - [`pricing`] - Line totals, subtotal, tax, grand total, change
//! - [`cart`] - The active sale and its mutations
//! - [`discount`] - Order and line discount policy
//! - [`held`] - Parked carts
//! - [`checkout`] - Payment state machine
//! - [`receipt`] - Immutable sale records and sale numbers
//! - [`view`] - Render model handed to the display surface
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pathway_core::{pricing, Cart, Money, Product, TaxRate};
//!
//! let mut cart = Cart::new(TaxRate::from_bps(1250));
//! let paracetamol = Product {
//!     id: "p-001".into(),
//!     sku: "PARA-500".into(),
//!     barcode: None,
//!     name: "Paracetamol 500mg".into(),
//!     unit_price: Money::from_minor(1000),
//!     generic_name: Some("Paracetamol".into()),
//!     strength: Some("500mg".into()),
//!     requires_prescription: false,
//! };
//!
//! cart.add_product(&paracetamol, 2).unwrap();
//!
//! assert_eq!(pricing::subtotal(&cart), Money::from_minor(2000));
//! assert_eq!(pricing::tax_amount(&cart), Money::from_minor(250));
//! assert_eq!(pricing::grand_total(&cart), Money::from_minor(2250));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod discount;
pub mod error;
pub mod held;
pub mod money;
pub mod pricing;
pub mod receipt;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::{Cart, LineItem};
pub use checkout::{AcceptedPayment, CheckoutFlow, CheckoutState, PaymentAttempt};
pub use error::{CoreError, CoreResult, ValidationError};
pub use held::{HeldStore, HeldTransaction};
pub use money::Money;
pub use pricing::Totals;
pub use receipt::{PaymentSummary, ReceiptLine, SaleNumberGenerator, SaleRecord};
pub use types::*;
pub use view::{CartView, LineView};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Catches a slipped finger (1000 typed for 10) before it reaches the tender
/// screen.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price a product may carry (10,000,000.00).
///
/// With at most 100 lines of at most 999 units, every cart total stays far
/// inside `i64`.
pub const MAX_UNIT_PRICE: Money = Money::from_minor(1_000_000_000);
