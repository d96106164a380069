//! # Cart Model
//!
//! The single in-progress sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           Register                Cart Change           │
//! │  ──────────────           ────────                ───────────           │
//! │                                                                         │
//! │  Scan / click product ───► add_item() ──────────► merge or push line    │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ───► line.qty = n          │
//! │                            (n ≤ 0 removes)                              │
//! │                                                                         │
//! │  Click remove ───────────► remove_item() ───────► line dropped (or no-op)│
//! │                                                                         │
//! │  Cancel sale ────────────► clear() ─────────────► empty, tax rate kept  │
//! │                                                                         │
//! │  Totals are NEVER stored: every read of subtotal/tax/total re-derives   │
//! │  them from the lines (see `pricing`).                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discount clamp
//! An order discount is fixed when it is applied. If a later quantity
//! change, removal or line discount shrinks the subtotal below it, the
//! discount is clamped down to the new subtotal so the taxable base can
//! never go negative.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountReason, Prescription, Product, TaxRate};
use crate::validation::{self, parse_quantity_input, QuantityEdit};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart.
///
/// ## Price Freezing
/// Name, SKU and unit price are copied from the catalog when the line is
/// created. Re-adding the same product merges quantities and keeps the
/// original price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    product_id: String,
    name: String,
    sku: String,
    quantity: i64,
    unit_price: Money,
    line_discount: Money,
    generic_name: Option<String>,
    strength: Option<String>,
    requires_prescription: bool,
    prescription: Option<Prescription>,
}

impl LineItem {
    /// Creates a line from a resolved product.
    pub fn from_product(product: &Product, quantity: i64) -> CoreResult<Self> {
        validation::validate_unit_price(product.unit_price)
            .map_err(|e| CoreError::invalid_line(e.to_string()))?;
        validate_line_quantity(quantity)?;
        gross_for(product.unit_price, quantity)?;

        Ok(LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            quantity,
            unit_price: product.unit_price,
            line_discount: Money::zero(),
            generic_name: product.generic_name.clone(),
            strength: product.strength.clone(),
            requires_prescription: product.requires_prescription,
            prescription: None,
        })
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn line_discount(&self) -> Money {
        self.line_discount
    }

    pub fn generic_name(&self) -> Option<&str> {
        self.generic_name.as_deref()
    }

    pub fn strength(&self) -> Option<&str> {
        self.strength.as_deref()
    }

    pub fn requires_prescription(&self) -> bool {
        self.requires_prescription
    }

    pub fn prescription(&self) -> Option<&Prescription> {
        self.prescription.as_ref()
    }

    /// quantity × unit price, before the line discount.
    pub fn gross(&self) -> Money {
        self.unit_price * self.quantity
    }

    /// quantity × unit price − line discount.
    ///
    /// Infallible because every constructor and mutator keeps
    /// `line_discount ≤ gross`.
    pub fn line_total(&self) -> Money {
        self.gross() - self.line_discount
    }

    fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        validate_line_quantity(quantity)?;
        gross_for(self.unit_price, quantity)?;
        self.quantity = quantity;
        if self.line_discount > self.gross() {
            self.line_discount = self.gross();
        }
        Ok(())
    }

    pub(crate) fn set_line_discount(&mut self, amount: Money) -> CoreResult<()> {
        if amount.is_negative() {
            return Err(CoreError::invalid_line("line discount cannot be negative"));
        }
        if amount > self.gross() {
            return Err(CoreError::invalid_line(format!(
                "line discount {} exceeds line value {}",
                amount,
                self.gross()
            )));
        }
        self.line_discount = amount;
        Ok(())
    }
}

/// Checks a quantity being added to or set on a line.
///
/// Above the cap is `QuantityTooLarge`; zero or negative is a validation
/// error. Callers that must look a product up first can run this before
/// the lookup.
pub fn validate_line_quantity(quantity: i64) -> CoreResult<()> {
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    validation::validate_quantity(quantity)?;
    Ok(())
}

fn gross_for(unit_price: Money, quantity: i64) -> CoreResult<Money> {
    unit_price
        .checked_times(quantity)
        .ok_or_else(|| CoreError::invalid_line("line value too large"))
}

// =============================================================================
// Cart
// =============================================================================

/// The active sale.
///
/// ## Invariants
/// - Lines are unique by `product_id` (re-adding merges quantities)
/// - Every line quantity is in 1..=999
/// - At most 100 lines
/// - `order_discount ≤ subtotal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
    customer_id: Option<String>,
    order_discount: Money,
    discount_reason: Option<DiscountReason>,
    tax_rate: TaxRate,
}

impl Cart {
    /// Creates an empty cart taxed at the session's rate.
    pub fn new(tax_rate: TaxRate) -> Self {
        Cart {
            items: Vec::new(),
            customer_id: None,
            order_discount: Money::zero(),
            discount_reason: None,
            tax_rate,
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Lines in insertion (display) order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, product_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.get(product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn order_discount(&self) -> Money {
        self.order_discount
    }

    pub fn discount_reason(&self) -> Option<DiscountReason> {
        self.discount_reason
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds a resolved product, merging into an existing line if present.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity increases, price stays frozen
    /// - Product not in cart: appended with a zero line discount
    /// - Any failure leaves the cart untouched
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if self.increment(&product.id, quantity)? {
            return Ok(());
        }

        validation::validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        })?;

        let line = LineItem::from_product(product, quantity)?;
        self.items.push(line);
        Ok(())
    }

    /// Increases the quantity of an existing line.
    ///
    /// Returns `Ok(false)` when the product is not in the cart, so the caller
    /// knows a catalog lookup is needed.
    pub fn increment(&mut self, product_id: &str, quantity: i64) -> CoreResult<bool> {
        validate_line_quantity(quantity)?;

        let Some(line) = self.line_mut(product_id) else {
            return Ok(false);
        };

        let merged = line.quantity.saturating_add(quantity);
        line.set_quantity(merged)?;
        Ok(true)
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity ≤ 0`: same as [`Cart::remove_item`]
    /// - Product absent: no-op, `Ok(false)`
    /// - `quantity > 999`: `QuantityTooLarge`, line unchanged
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<bool> {
        if quantity <= 0 {
            return Ok(self.remove_item(product_id));
        }

        let Some(line) = self.line_mut(product_id) else {
            return Ok(false);
        };
        line.set_quantity(quantity)?;
        self.reconcile_order_discount();
        Ok(true)
    }

    /// Applies a free-text quantity edit (see [`parse_quantity_input`]).
    pub fn edit_quantity(&mut self, product_id: &str, raw: &str) -> CoreResult<bool> {
        match parse_quantity_input(raw) {
            QuantityEdit::Set(qty) => self.update_quantity(product_id, qty),
            QuantityEdit::Remove => Ok(self.remove_item(product_id)),
        }
    }

    /// Removes a line. Returns `false` (not an error) if it was absent.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        let removed = self.items.len() != before;
        if removed {
            self.reconcile_order_discount();
        }
        removed
    }

    /// Empties the cart. The tax rate is session configuration and survives.
    pub fn clear(&mut self) {
        self.items.clear();
        self.customer_id = None;
        self.order_discount = Money::zero();
        self.discount_reason = None;
    }

    pub fn set_customer(&mut self, customer_id: Option<String>) {
        self.customer_id = customer_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
    }

    /// Records prescription details against a prescription-only line.
    pub fn attach_prescription(
        &mut self,
        product_id: &str,
        prescription: Prescription,
    ) -> CoreResult<()> {
        if prescription.prescription_number.trim().is_empty() {
            return Err(crate::error::ValidationError::Required {
                field: "prescription number".to_string(),
            }
            .into());
        }

        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        line.prescription = Some(prescription);
        Ok(())
    }

    pub(crate) fn set_order_discount(&mut self, amount: Money, reason: Option<DiscountReason>) {
        self.order_discount = amount;
        self.discount_reason = reason;
    }

    pub(crate) fn set_line_discount(&mut self, product_id: &str, amount: Money) -> CoreResult<()> {
        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        line.set_line_discount(amount)?;
        self.reconcile_order_discount();
        Ok(())
    }

    /// Clamps the order discount to the current subtotal.
    fn reconcile_order_discount(&mut self) {
        let subtotal = crate::pricing::subtotal(self);
        if self.order_discount > subtotal {
            self.order_discount = subtotal;
        }
        if self.order_discount.is_zero() {
            self.discount_reason = None;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
