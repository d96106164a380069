//! # Held-Transaction Store
//!
//! Parks the active cart under a ticket so the cashier can serve the next
//! customer, then brings it back later.
//!
//! ```text
//!   active cart ──hold()──► [HOLD-261016-101500-001, HOLD-261016-101742-002, ...]
//!        ▲                              │
//!        └──────────recall(ticket)──────┘   (active cart must be empty)
//! ```
//!
//! Session scoped: held carts live as long as the store and are lost on
//! restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing;

/// A parked cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldTransaction {
    pub ticket_id: String,
    /// Deep copy of the cart at hold time.
    pub cart: Cart,
    pub held_at: DateTime<Utc>,
}

impl HeldTransaction {
    pub fn summary(&self) -> HeldSummary {
        HeldSummary {
            ticket_id: self.ticket_id.clone(),
            held_at: self.held_at,
            item_count: self.cart.item_count(),
            customer_id: self.cart.customer_id().map(str::to_string),
            grand_total: pricing::grand_total(&self.cart),
        }
    }
}

/// One row of the held-tickets list on the display surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HeldSummary {
    pub ticket_id: String,
    #[ts(as = "String")]
    pub held_at: DateTime<Utc>,
    pub item_count: usize,
    pub customer_id: Option<String>,
    pub grand_total: Money,
}

/// In-memory store of held carts, oldest first.
#[derive(Debug, Default)]
pub struct HeldStore {
    tickets: Vec<HeldTransaction>,
    sequence: u32,
}

impl HeldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a copy of `cart` and clears it.
    ///
    /// ## Returns
    /// The ticket id, `HOLD-<yymmdd>-<hhmmss>-<seq>`.
    pub fn hold(&mut self, cart: &mut Cart, now: DateTime<Utc>) -> CoreResult<String> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        self.sequence += 1;
        let ticket_id = format!("HOLD-{}-{:03}", now.format("%y%m%d-%H%M%S"), self.sequence);

        self.tickets.push(HeldTransaction {
            ticket_id: ticket_id.clone(),
            cart: cart.clone(),
            held_at: now,
        });
        cart.clear();

        Ok(ticket_id)
    }

    /// Held carts in hold order (oldest first).
    pub fn list(&self) -> &[HeldTransaction] {
        &self.tickets
    }

    pub fn summaries(&self) -> Vec<HeldSummary> {
        self.tickets.iter().map(HeldTransaction::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Restores a held cart as the active cart and removes the ticket.
    ///
    /// ## Errors
    /// - `HeldTicketNotFound` if no ticket has this id
    /// - `CartNotEmpty` if `active` still has lines or a customer; held
    ///   carts are never merged into a live sale
    pub fn recall(&mut self, ticket_id: &str, active: &mut Cart) -> CoreResult<()> {
        let index = self.position(ticket_id)?;
        if !active.is_empty() || active.customer_id().is_some() {
            return Err(CoreError::CartNotEmpty);
        }

        let held = self.tickets.remove(index);
        *active = held.cart;
        Ok(())
    }

    /// Drops a held cart without restoring it.
    pub fn discard(&mut self, ticket_id: &str) -> CoreResult<HeldTransaction> {
        let index = self.position(ticket_id)?;
        Ok(self.tickets.remove(index))
    }

    fn position(&self, ticket_id: &str) -> CoreResult<usize> {
        self.tickets
            .iter()
            .position(|t| t.ticket_id == ticket_id)
            .ok_or_else(|| CoreError::HeldTicketNotFound(ticket_id.to_string()))
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
    use crate::types::{Discount, DiscountReason, TaxRate};
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, h, m, s).unwrap()
    }

    fn busy_cart() -> Cart {
        let mut cart = Cart::new(TaxRate::from_bps(1250));
        cart.add_product(&product("a", 1000), 2).unwrap();
        cart.add_product(&product("b", 350), 1).unwrap();
        cart.set_customer(Some("cust-42".into()));
        apply_order_discount(
            &mut cart,
            Discount::Percentage { bps: 1000 },
            Some(DiscountReason::Loyalty),
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_hold_empty_cart_fails() {
        let mut store = HeldStore::new();
        let mut cart = Cart::new(TaxRate::from_bps(1250));
        assert_eq!(store.hold(&mut cart, at(9, 0, 0)), Err(CoreError::EmptyCart));
        assert!(store.is_empty());
    }

    #[test]
    fn test_hold_clears_and_recall_round_trips() {
        let mut store = HeldStore::new();
        let mut cart = busy_cart();
        let original = cart.clone();

        let ticket = store.hold(&mut cart, at(10, 15, 0)).unwrap();
        assert_eq!(ticket, "HOLD-261016-101500-001");
        assert!(cart.is_empty());
        assert_eq!(cart.tax_rate(), TaxRate::from_bps(1250));

        store.recall(&ticket, &mut cart).unwrap();
        assert_eq!(cart, original);
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_independent_of_live_cart() {
        let mut store = HeldStore::new();
        let mut cart = busy_cart();
        let original = cart.clone();
        store.hold(&mut cart, at(10, 0, 0)).unwrap();

        cart.add_product(&product("z", 99), 5).unwrap();

        assert_eq!(store.list()[0].cart, original);
    }

    #[test]
    fn test_list_is_oldest_first_and_ids_unique() {
        let mut store = HeldStore::new();
        let mut tickets = Vec::new();
        for i in 0..3 {
            let mut cart = busy_cart();
            // same second on purpose; the sequence keeps ids apart
            tickets.push(store.hold(&mut cart, at(11, 0, 0)).unwrap());
            assert_eq!(store.len(), i + 1);
        }

        let listed: Vec<&str> = store.list().iter().map(|t| t.ticket_id.as_str()).collect();
        assert_eq!(listed, tickets.iter().map(String::as_str).collect::<Vec<_>>());
        assert_ne!(tickets[0], tickets[1]);
        assert_ne!(tickets[1], tickets[2]);
    }

    #[test]
    fn test_recall_refuses_non_empty_active_cart() {
        let mut store = HeldStore::new();
        let mut cart = busy_cart();
        let ticket = store.hold(&mut cart, at(12, 0, 0)).unwrap();

        cart.add_product(&product("walk-in", 500), 1).unwrap();
        let live = cart.clone();

        assert_eq!(store.recall(&ticket, &mut cart), Err(CoreError::CartNotEmpty));
        assert_eq!(cart, live);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_recall_refuses_cart_with_only_a_customer() {
        let mut store = HeldStore::new();
        let mut cart = busy_cart();
        let ticket = store.hold(&mut cart, at(12, 30, 0)).unwrap();

        cart.set_customer(Some("cust-77".into()));
        let live = cart.clone();

        assert_eq!(store.recall(&ticket, &mut cart), Err(CoreError::CartNotEmpty));
        assert_eq!(cart, live);
        assert_eq!(cart.customer_id(), Some("cust-77"));
        assert_eq!(store.len(), 1);

        cart.set_customer(None);
        store.recall(&ticket, &mut cart).unwrap();
        assert_eq!(cart.customer_id(), Some("cust-42"));
    }

    #[test]
    fn test_recall_unknown_ticket() {
        let mut store = HeldStore::new();
        let mut cart = Cart::new(TaxRate::from_bps(1250));
        assert!(matches!(
            store.recall("HOLD-nope", &mut cart),
            Err(CoreError::HeldTicketNotFound(_))
        ));
    }

    #[test]
    fn test_recall_any_ticket_not_just_latest() {
        let mut store = HeldStore::new();
        let mut first = busy_cart();
        let first_copy = first.clone();
        let t1 = store.hold(&mut first, at(13, 0, 0)).unwrap();

        let mut second = Cart::new(TaxRate::from_bps(1250));
        second.add_product(&product("c", 700), 1).unwrap();
        store.hold(&mut second, at(13, 5, 0)).unwrap();

        let mut active = Cart::new(TaxRate::from_bps(1250));
        store.recall(&t1, &mut active).unwrap();
        assert_eq!(active, first_copy);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_discard_and_summary() {
        let mut store = HeldStore::new();
        let mut cart = busy_cart();
        let ticket = store.hold(&mut cart, at(14, 0, 0)).unwrap();

        let summary = &store.summaries()[0];
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.customer_id.as_deref(), Some("cust-42"));
        // (2000 + 350) − 235 = 2115, tax 264.375 → 264, total 2379
        assert_eq!(summary.grand_total, Money::from_minor(2379));

        let dropped = store.discard(&ticket).unwrap();
        assert_eq!(dropped.ticket_id, ticket);
        assert!(store.is_empty());
        assert!(store.discard(&ticket).is_err());
    }
}
