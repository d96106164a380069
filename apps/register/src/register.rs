//! # Register Session
//!
//! One till session: the active cart, parked tickets, the checkout flow and
//! the services around them. There is no global cart; whoever owns the
//! `Register` owns the sale.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Register<C>                                  │
//! │                                                                         │
//! │  ┌──────────┐ ┌───────────┐ ┌──────────────┐ ┌───────────────────────┐ │
//! │  │   Cart   │ │ HeldStore │ │ CheckoutFlow │ │ SaleNumberGenerator   │ │
//! │  └──────────┘ └───────────┘ └──────────────┘ └───────────────────────┘ │
//! │  ┌──────────────────┐ ┌────────────────────┐ ┌──────────────────────┐  │
//! │  │ CatalogClient<C> │ │ NotificationCenter │ │ dyn DisplaySurface   │  │
//! │  └──────────────────┘ └────────────────────┘ └──────────────────────┘  │
//! │                                                                         │
//! │  Every cart mutation returns the fresh CartView and pushes it to the    │
//! │  display. Every failure raises a notification and leaves state as is.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Completing a Sale
//! ```text
//!   select_payment ─► enter_tendered ─► complete_sale
//!                                          │
//!                                          ├─ submit(grand_total)   (may reject)
//!                                          ├─ SaleRecord::build     (may fail, cart kept)
//!                                          ├─ cart.clear()          (last)
//!                                          └─ checkout reset to Idle
//! ```

use std::sync::Arc;

use chrono::Utc;
use pathway_core::cart::validate_line_quantity;
use pathway_core::discount::{self, parse_discount};
use pathway_core::held::HeldSummary;
use pathway_core::{
    pricing, Cart, CartView, CheckoutFlow, CheckoutState, CoreError, CoreResult, Discount,
    DiscountReason, HeldStore, Money, NotificationLevel, Prescription, Product, ProductSummary,
    SaleNumberGenerator, SaleRecord, Tender,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogClient};
use crate::config::RegisterConfig;
use crate::notify::{DisplaySurface, NoOpDisplay, Notification, NotificationCenter};

pub struct Register<C> {
    config: RegisterConfig,
    catalog: CatalogClient<C>,
    cart: Cart,
    held: HeldStore,
    checkout: CheckoutFlow,
    sale_numbers: SaleNumberGenerator,
    notifications: NotificationCenter,
    display: Arc<dyn DisplaySurface>,
}

impl<C: Catalog> Register<C> {
    pub fn new(config: RegisterConfig, catalog: C) -> Self {
        let client = CatalogClient::new(catalog, config.catalog_timeout());
        Register {
            cart: Cart::new(config.tax_rate()),
            held: HeldStore::new(),
            checkout: CheckoutFlow::new(),
            sale_numbers: SaleNumberGenerator::new(),
            notifications: NotificationCenter::new(config.notification_ttl()),
            display: Arc::new(NoOpDisplay),
            catalog: client,
            config,
        }
    }

    pub fn with_display(mut self, display: Arc<dyn DisplaySurface>) -> Self {
        self.display = display;
        self
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn config(&self) -> &RegisterConfig {
        &self.config
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// A clone of the catalog client, for lookups that run alongside the
    /// session (search-as-you-type).
    pub fn catalog(&self) -> CatalogClient<C> {
        self.catalog.clone()
    }

    pub fn view(&self) -> CartView {
        CartView::of(&self.cart)
    }

    pub fn checkout_state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    pub fn held(&self) -> Vec<HeldSummary> {
        self.held.summaries()
    }

    /// Notifications still showing.
    pub fn notifications(&mut self) -> Vec<Notification> {
        self.notifications.active(Utc::now())
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        self.notifications.dismiss(id)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds a product by id. A product already in the cart is merged without
    /// asking the catalog again.
    pub async fn add_item(&mut self, product_id: &str, quantity: i64) -> CoreResult<CartView> {
        debug!(product_id, quantity, "add_item");
        if let Err(err) = validate_line_quantity(quantity) {
            return self.finish("add item", Err(err));
        }

        let result = if self.cart.contains(product_id.trim()) {
            self.cart.increment(product_id.trim(), quantity).map(|_| ())
        } else {
            match self.catalog.resolve(product_id).await {
                Ok(product) => self.add_resolved(&product, quantity),
                Err(err) => Err(err),
            }
        };

        self.finish("add item", result)
    }

    /// Adds a product by scanned barcode.
    pub async fn scan_barcode(&mut self, code: &str, quantity: i64) -> CoreResult<CartView> {
        debug!(barcode = code, quantity, "scan_barcode");
        if let Err(err) = validate_line_quantity(quantity) {
            return self.finish("scan barcode", Err(err));
        }

        let result = match self.catalog.resolve_by_barcode(code).await {
            Ok(product) => self.add_resolved(&product, quantity),
            Err(err) => Err(err),
        };

        self.finish("scan barcode", result)
    }

    fn add_resolved(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        let is_new = !self.cart.contains(&product.id);
        self.cart.add_product(product, quantity)?;

        if is_new && product.requires_prescription {
            self.notify(
                NotificationLevel::Info,
                format!("{} is prescription-only; record the prescription", product.name),
            );
        }
        Ok(())
    }

    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<CartView> {
        debug!(product_id, quantity, "update_quantity");
        let before = self.cart.order_discount();
        let result = self.cart.update_quantity(product_id, quantity).map(|_| ());
        self.warn_if_clamped(before);
        self.reset_checkout_if_empty();
        self.finish("update quantity", result)
    }

    /// Quantity edit from free text; anything but a positive number removes
    /// the line.
    pub fn edit_quantity(&mut self, product_id: &str, raw: &str) -> CoreResult<CartView> {
        debug!(product_id, raw, "edit_quantity");
        let before = self.cart.order_discount();
        let result = self.cart.edit_quantity(product_id, raw).map(|_| ());
        self.warn_if_clamped(before);
        self.reset_checkout_if_empty();
        self.finish("edit quantity", result)
    }

    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<CartView> {
        debug!(product_id, "remove_item");
        let before = self.cart.order_discount();
        if !self.cart.remove_item(product_id) {
            debug!(product_id, "remove_item: not in cart");
        }
        self.warn_if_clamped(before);
        self.reset_checkout_if_empty();
        Ok(self.publish())
    }

    pub fn clear(&mut self) -> CoreResult<CartView> {
        debug!("clear");
        self.cart.clear();
        self.checkout.cancel();
        Ok(self.publish())
    }

    pub fn set_customer(&mut self, customer_id: Option<String>) -> CoreResult<CartView> {
        debug!(?customer_id, "set_customer");
        self.cart.set_customer(customer_id);
        Ok(self.publish())
    }

    pub fn attach_prescription(
        &mut self,
        product_id: &str,
        prescription: Prescription,
    ) -> CoreResult<CartView> {
        debug!(product_id, rx = %prescription.prescription_number, "attach_prescription");
        let result = self.cart.attach_prescription(product_id, prescription);
        self.finish("attach prescription", result)
    }

    // =========================================================================
    // Discounts
    // =========================================================================

    pub fn apply_discount(
        &mut self,
        discount: Discount,
        reason: Option<DiscountReason>,
    ) -> CoreResult<CartView> {
        debug!(?discount, ?reason, "apply_discount");
        let result = discount::apply_order_discount(&mut self.cart, discount, reason);
        if let Ok(amount) = &result {
            info!(amount = %amount, ?reason, "Order discount applied");
        }
        self.finish("apply discount", result.map(|_| ()))
    }

    /// Parses cashier input (`"10%"`, `"5.00"`) and applies it.
    pub fn apply_discount_input(
        &mut self,
        raw: &str,
        reason: Option<DiscountReason>,
    ) -> CoreResult<CartView> {
        match parse_discount(raw) {
            Ok(discount) => self.apply_discount(discount, reason),
            Err(err) => self.finish("apply discount", Err(err)),
        }
    }

    pub fn remove_discount(&mut self) -> CoreResult<CartView> {
        debug!("remove_discount");
        discount::remove_order_discount(&mut self.cart);
        Ok(self.publish())
    }

    pub fn apply_line_discount(
        &mut self,
        product_id: &str,
        discount: Discount,
    ) -> CoreResult<CartView> {
        debug!(product_id, ?discount, "apply_line_discount");
        let before = self.cart.order_discount();
        let result = discount::apply_line_discount(&mut self.cart, product_id, discount);
        self.warn_if_clamped(before);
        self.finish("apply line discount", result.map(|_| ()))
    }

    /// Parses cashier input for one line and applies it.
    pub fn apply_line_discount_input(
        &mut self,
        product_id: &str,
        raw: &str,
    ) -> CoreResult<CartView> {
        match parse_discount(raw) {
            Ok(discount) => self.apply_line_discount(product_id, discount),
            Err(err) => self.finish("apply line discount", Err(err)),
        }
    }

    // =========================================================================
    // Held Tickets
    // =========================================================================

    /// Parks the active cart. Returns the ticket id.
    pub fn hold(&mut self) -> CoreResult<String> {
        debug!("hold");
        match self.held.hold(&mut self.cart, Utc::now()) {
            Ok(ticket) => {
                info!(ticket = %ticket, parked = self.held.len(), "Cart held");
                self.checkout.cancel();
                self.notify(NotificationLevel::Info, format!("Sale held as {}", ticket));
                self.publish();
                Ok(ticket)
            }
            Err(err) => {
                self.reject("hold", &err);
                Err(err)
            }
        }
    }

    /// Restores a parked cart. The active cart must be empty and have no
    /// customer. Any tender picked before the recall is dropped.
    pub fn recall(&mut self, ticket_id: &str) -> CoreResult<CartView> {
        debug!(ticket = ticket_id, "recall");
        let result = self.held.recall(ticket_id.trim(), &mut self.cart);
        if result.is_ok() {
            self.checkout.cancel();
            info!(ticket = ticket_id, "Held cart recalled");
        }
        self.finish("recall", result)
    }

    pub fn discard_held(&mut self, ticket_id: &str) -> CoreResult<()> {
        debug!(ticket = ticket_id, "discard_held");
        match self.held.discard(ticket_id.trim()) {
            Ok(dropped) => {
                info!(ticket = %dropped.ticket_id, "Held cart discarded");
                Ok(())
            }
            Err(err) => {
                self.reject("discard held ticket", &err);
                Err(err)
            }
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub async fn search(&mut self, query: &str) -> CoreResult<Vec<ProductSummary>> {
        let result = self.catalog.search(query).await;
        match result {
            Ok(rows) => Ok(rows),
            // a newer query owns the display; nothing to tell the cashier
            Err(CoreError::SearchSuperseded) => Err(CoreError::SearchSuperseded),
            Err(err) => {
                self.reject("search", &err);
                Err(err)
            }
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    pub fn select_payment(&mut self, tender: Tender) -> CoreResult<()> {
        debug!(method = %tender.method(), "select_payment");
        let result = self.checkout.select_method(tender, &self.cart);
        self.finish_checkout("select payment", result)
    }

    pub fn enter_tendered(&mut self, tendered: Money) -> CoreResult<()> {
        debug!(tendered = %tendered, "enter_tendered");
        let result = self.checkout.enter_amount(tendered);
        self.finish_checkout("enter amount", result)
    }

    pub fn cancel_checkout(&mut self) {
        debug!(state = self.checkout.state().name(), "cancel_checkout");
        self.checkout.cancel();
    }

    /// Submits the entered payment against the current grand total and, if
    /// accepted, finalizes the sale.
    ///
    /// The cart is cleared only after the record has been built.
    pub fn complete_sale(&mut self) -> CoreResult<SaleRecord> {
        let total = pricing::grand_total(&self.cart);
        debug!(total = %total, "complete_sale");

        let payment = match self.checkout.submit(total) {
            Ok(payment) => payment,
            Err(err) => {
                self.reject("complete sale", &err);
                return Err(err);
            }
        };

        let now = Utc::now();
        let sale_number = self.sale_numbers.next(now);
        let record = match SaleRecord::build(
            &self.cart,
            &payment,
            &self.config.till.cashier,
            sale_number,
            now,
        ) {
            Ok(record) => record,
            Err(err) => {
                self.checkout.cancel();
                self.reject("build sale record", &err);
                return Err(err);
            }
        };

        self.cart.clear();
        self.checkout.cancel();

        info!(
            sale_number = %record.sale_number,
            total = %record.grand_total,
            method = %record.payment.method,
            lines = record.lines.len(),
            "Sale completed"
        );
        let change = self.config.format_currency(record.payment.change);
        self.notify(
            NotificationLevel::Success,
            format!("Sale {} complete. Change due {}", record.sale_number, change),
        );
        self.publish();

        Ok(record)
    }

    /// Selects the tender, enters the amount and completes the sale in one go.
    pub fn pay(&mut self, tender: Tender, tendered: Money) -> CoreResult<SaleRecord> {
        self.select_payment(tender)?;
        self.enter_tendered(tendered)?;
        self.complete_sale()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn publish(&self) -> CartView {
        let view = CartView::of(&self.cart);
        self.display.cart_changed(&view);
        view
    }

    fn finish(&mut self, action: &str, result: CoreResult<()>) -> CoreResult<CartView> {
        match result {
            Ok(()) => Ok(self.publish()),
            Err(err) => {
                self.reject(action, &err);
                Err(err)
            }
        }
    }

    fn finish_checkout(&mut self, action: &str, result: CoreResult<()>) -> CoreResult<()> {
        if let Err(err) = &result {
            self.reject(action, err);
        }
        result
    }

    fn reject(&mut self, action: &str, err: &CoreError) {
        warn!(action, error = %err, level = %err.level(), "Operation rejected");
        let notification = self.notifications.push_error(err, Utc::now());
        self.display.notified(&notification);
    }

    fn notify(&mut self, level: NotificationLevel, message: String) {
        let notification = self.notifications.push(level, message, Utc::now());
        self.display.notified(&notification);
    }

    fn warn_if_clamped(&self, before: Money) {
        let after = self.cart.order_discount();
        if after < before {
            warn!(
                from = %before,
                to = %after,
                "Order discount clamped to the new subtotal"
            );
        }
    }

    /// A checkout left open on an emptied cart would carry its tender into
    /// whatever sale comes next.
    fn reset_checkout_if_empty(&mut self) {
        if self.cart.is_empty() && !self.checkout.is_idle() {
            debug!(state = self.checkout.state().name(), "Cart emptied; checkout reset");
            self.checkout.cancel();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{product, ScriptedCatalog};
    use pathway_core::{MobileMoneyProvider, PaymentMethod, MAX_UNIT_PRICE};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingDisplay {
        views: Mutex<Vec<CartView>>,
        notices: Mutex<Vec<Notification>>,
    }

    impl DisplaySurface for RecordingDisplay {
        fn cart_changed(&self, view: &CartView) {
            self.views.lock().unwrap().push(view.clone());
        }

        fn notified(&self, notification: &Notification) {
            self.notices.lock().unwrap().push(notification.clone());
        }
    }

    fn catalog() -> ScriptedCatalog {
        let mut amox = product("amox", "Amoxicillin 250mg", 4500);
        amox.requires_prescription = true;
        ScriptedCatalog::with_products(vec![
            product("para", "Paracetamol 500mg", 1000),
            product("vitc", "Vitamin C 1000mg", 350),
            amox,
        ])
    }

    fn register() -> Register<ScriptedCatalog> {
        Register::new(RegisterConfig::default(), catalog())
    }

    fn register_with_display() -> (Register<ScriptedCatalog>, Arc<RecordingDisplay>) {
        let display = Arc::new(RecordingDisplay::default());
        let register = register().with_display(display.clone());
        (register, display)
    }

    #[tokio::test]
    async fn test_reference_sale_end_to_end() {
        let mut register = register();

        let view = register.add_item("para", 2).await.unwrap();
        assert_eq!(view.subtotal, Money::from_minor(2000));
        assert_eq!(view.tax, Money::from_minor(250));
        assert_eq!(view.grand_total, Money::from_minor(2250));
        assert!(view.checkout_enabled);

        let record = register
            .pay(Tender::Cash, Money::from_minor(2500))
            .unwrap();

        assert_eq!(record.grand_total, Money::from_minor(2250));
        assert_eq!(record.payment.change, Money::from_minor(250));
        assert_eq!(record.cashier, "Front Counter");
        assert!(record.sale_number.starts_with("POS"));
        assert!(register.cart().is_empty());
        assert!(matches!(register.checkout_state(), CheckoutState::Idle));
    }

    #[tokio::test]
    async fn test_insufficient_payment_keeps_cart_and_notifies() {
        let (mut register, display) = register_with_display();
        register.add_item("para", 2).await.unwrap();

        let err = register
            .pay(Tender::Cash, Money::from_minor(1000))
            .unwrap_err();

        assert!(matches!(err, CoreError::InsufficientPayment { .. }));
        assert_eq!(register.cart().item_count(), 1);
        assert!(matches!(
            register.checkout_state(),
            CheckoutState::Rejected { .. }
        ));

        let notices = display.notices.lock().unwrap();
        let last = notices.last().unwrap();
        assert_eq!(last.level, NotificationLevel::Warning);
        assert!(last.message.starts_with("Insufficient payment"));
        drop(notices);

        // corrected amount on the same checkout
        register.enter_tendered(Money::from_minor(3000)).unwrap();
        let record = register.complete_sale().unwrap();
        assert_eq!(record.payment.change, Money::from_minor(750));
    }

    #[tokio::test]
    async fn test_discount_scenarios() {
        let mut register = register();
        register.add_item("para", 2).await.unwrap();

        let view = register
            .apply_discount_input("10%", Some(DiscountReason::Loyalty))
            .unwrap();
        assert_eq!(view.order_discount, Money::from_minor(200));
        assert_eq!(view.tax, Money::from_minor(225));
        assert_eq!(view.grand_total, Money::from_minor(2025));

        let err = register.apply_discount_input("50", None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDiscount { .. }));
        assert_eq!(register.cart().order_discount(), Money::from_minor(200));
        assert_eq!(
            register.cart().discount_reason(),
            Some(DiscountReason::Loyalty)
        );
    }

    #[tokio::test]
    async fn test_merge_skips_catalog() {
        let mut register = register();
        register.add_item("para", 1).await.unwrap();
        register.add_item("para", 2).await.unwrap();

        assert_eq!(register.cart().get("para").unwrap().quantity(), 3);
        let calls = &register.catalog.catalog_ref().calls;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_warns_and_leaves_cart() {
        let (mut register, display) = register_with_display();
        register.add_item("para", 1).await.unwrap();
        let before = register.cart().clone();

        let err = register.add_item("ghost", 1).await.unwrap_err();

        assert_eq!(err, CoreError::ProductNotFound("ghost".into()));
        assert_eq!(register.cart(), &before);
        let notices = display.notices.lock().unwrap();
        assert_eq!(notices.last().unwrap().level, NotificationLevel::Warning);
    }

    #[tokio::test]
    async fn test_bad_quantity_rejected_before_catalog_lookup() {
        let mut register = register();

        assert!(matches!(
            register.add_item("ghost", 0).await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            register.add_item("para", 1000).await,
            Err(CoreError::QuantityTooLarge { requested: 1000, max: 999 })
        ));
        assert!(matches!(
            register.scan_barcode("BC-vitc", -2).await,
            Err(CoreError::Validation(_))
        ));

        assert!(register.cart().is_empty());
        let calls = &register.catalog.catalog_ref().calls;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_over_cap_price_rejected_without_panic() {
        let catalog = ScriptedCatalog::with_products(vec![
            product("big", "Infusion pump", MAX_UNIT_PRICE.minor_units()),
            product("huge", "Mispriced", i64::MAX / 2 + 1),
        ]);
        let mut register = Register::new(RegisterConfig::default(), catalog);

        let view = register.add_item("big", 999).await.unwrap();
        assert_eq!(
            view.subtotal,
            Money::from_minor(MAX_UNIT_PRICE.minor_units() * 999)
        );

        assert!(matches!(
            register.add_item("huge", 1).await,
            Err(CoreError::InvalidLineItem { .. })
        ));
        assert_eq!(register.cart().item_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_timeout_is_danger() {
        let catalog = catalog().delay("para", Duration::from_secs(30));
        let mut register = Register::new(RegisterConfig::default(), catalog);

        let err = register.add_item("para", 1).await.unwrap_err();

        assert!(matches!(err, CoreError::CollaboratorUnavailable(_)));
        assert!(register.cart().is_empty());
        let notices = register.notifications();
        assert_eq!(notices.last().unwrap().level, NotificationLevel::Danger);
    }

    #[tokio::test]
    async fn test_scan_barcode_merges_by_product_id() {
        let mut register = register();
        register.add_item("vitc", 1).await.unwrap();
        let view = register.scan_barcode("BC-vitc", 2).await.unwrap();

        assert_eq!(view.item_count, 1);
        assert_eq!(view.total_quantity, 3);
    }

    #[tokio::test]
    async fn test_prescription_item_raises_info() {
        let (mut register, display) = register_with_display();
        register.add_item("amox", 1).await.unwrap();

        {
            let notices = display.notices.lock().unwrap();
            assert_eq!(notices.last().unwrap().level, NotificationLevel::Info);
        }

        let view = register
            .attach_prescription(
                "amox",
                Prescription {
                    prescription_number: "RX-1".into(),
                    prescriber_name: "Dr. Owusu".into(),
                    days_supply: None,
                },
            )
            .unwrap();
        assert!(!view.lines[0].prescription_missing);
    }

    #[tokio::test]
    async fn test_every_mutation_publishes_a_view() {
        let (mut register, display) = register_with_display();
        register.add_item("para", 1).await.unwrap();
        register.update_quantity("para", 4).unwrap();
        register.edit_quantity("para", "oops").unwrap();

        let views = display.views.lock().unwrap();
        assert_eq!(views.len(), 3);
        assert_eq!(views[1].total_quantity, 4);
        assert!(views[2].lines.is_empty());
        assert!(!views[2].checkout_enabled);
    }

    #[tokio::test]
    async fn test_removal_clamps_discount() {
        let mut register = register();
        register.add_item("para", 2).await.unwrap();
        register.add_item("vitc", 1).await.unwrap();
        register
            .apply_discount(
                Discount::Amount {
                    amount: Money::from_minor(1500),
                },
                Some(DiscountReason::Promotion),
            )
            .unwrap();

        let view = register.remove_item("para").unwrap();

        assert_eq!(view.order_discount, Money::from_minor(350));
        assert_eq!(view.grand_total, Money::zero());

        // removing twice is a no-op
        let again = register.remove_item("para").unwrap();
        assert_eq!(again, view);
    }

    #[tokio::test]
    async fn test_hold_and_recall_round_trip() {
        let mut register = register();
        register.add_item("para", 2).await.unwrap();
        register.set_customer(Some("cust-7".into())).unwrap();
        register
            .apply_discount(Discount::Percentage { bps: 1000 }, Some(DiscountReason::Staff))
            .unwrap();
        let original = register.cart().clone();

        let ticket = register.hold().unwrap();
        assert!(ticket.starts_with("HOLD-"));
        assert!(register.cart().is_empty());
        assert_eq!(register.held().len(), 1);

        // serve someone else meanwhile
        register.add_item("vitc", 1).await.unwrap();
        assert_eq!(register.recall(&ticket), Err(CoreError::CartNotEmpty));
        register.pay(Tender::Cash, Money::from_minor(500)).unwrap();

        register.recall(&ticket).unwrap();
        assert_eq!(register.cart(), &original);
        assert!(register.held().is_empty());
    }

    #[tokio::test]
    async fn test_recall_starts_a_fresh_checkout() {
        let mut register = register();
        register.add_item("para", 1).await.unwrap();
        let ticket = register.hold().unwrap();

        register.add_item("vitc", 1).await.unwrap();
        register
            .select_payment(Tender::Card {
                reference: Some("AUTH-1".into()),
            })
            .unwrap();
        register.remove_item("vitc").unwrap();
        assert!(matches!(register.checkout_state(), CheckoutState::Idle));

        register.recall(&ticket).unwrap();
        assert!(matches!(register.checkout_state(), CheckoutState::Idle));
        assert!(matches!(
            register.enter_tendered(Money::from_minor(1125)),
            Err(CoreError::InvalidCheckoutState { .. })
        ));

        let record = register.pay(Tender::Cash, Money::from_minor(1200)).unwrap();
        assert_eq!(record.payment.method, PaymentMethod::Cash);
        assert_eq!(record.payment.change, Money::from_minor(75));
    }

    #[tokio::test]
    async fn test_emptying_cart_by_quantity_resets_checkout() {
        let mut register = register();
        register.add_item("para", 1).await.unwrap();
        register.select_payment(Tender::Cash).unwrap();
        register.update_quantity("para", 0).unwrap();
        assert!(matches!(register.checkout_state(), CheckoutState::Idle));

        register.add_item("vitc", 1).await.unwrap();
        register.select_payment(Tender::StoreCredit).unwrap();
        register.edit_quantity("vitc", "").unwrap();
        assert!(matches!(register.checkout_state(), CheckoutState::Idle));

        // a partial edit leaves the chosen tender alone
        register.add_item("para", 2).await.unwrap();
        register.select_payment(Tender::Cash).unwrap();
        register.update_quantity("para", 1).unwrap();
        assert!(matches!(
            register.checkout_state(),
            CheckoutState::MethodSelected { .. }
        ));
    }

    #[tokio::test]
    async fn test_recall_refused_while_customer_selected() {
        let mut register = register();
        register.add_item("para", 1).await.unwrap();
        register.set_customer(Some("cust-1".into())).unwrap();
        let ticket = register.hold().unwrap();

        register.set_customer(Some("cust-2".into())).unwrap();
        assert_eq!(register.recall(&ticket), Err(CoreError::CartNotEmpty));
        assert_eq!(register.cart().customer_id(), Some("cust-2"));
        assert_eq!(register.held().len(), 1);
    }

    #[tokio::test]
    async fn test_hold_empty_cart_is_warning() {
        let mut register = register();
        assert_eq!(register.hold(), Err(CoreError::EmptyCart));
        assert_eq!(
            register.notifications().last().unwrap().level,
            NotificationLevel::Warning
        );
    }

    #[tokio::test]
    async fn test_discard_held() {
        let mut register = register();
        register.add_item("para", 1).await.unwrap();
        let ticket = register.hold().unwrap();

        register.discard_held(&ticket).unwrap();
        assert!(register.held().is_empty());
        assert!(matches!(
            register.discard_held(&ticket),
            Err(CoreError::HeldTicketNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_mobile_money_requires_details() {
        let mut register = register();
        register.add_item("para", 2).await.unwrap();

        let err = register
            .pay(
                Tender::MobileMoney {
                    provider: None,
                    phone: "0241234567".into(),
                },
                Money::from_minor(2250),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(register.cart().item_count(), 1);

        let record = register
            .pay(
                Tender::MobileMoney {
                    provider: Some(MobileMoneyProvider::AirtelTigo),
                    phone: "0271234567".into(),
                },
                Money::from_minor(2250),
            )
            .unwrap();
        assert_eq!(record.payment.method, PaymentMethod::MobileMoney);
        assert_eq!(record.payment.change, Money::zero());
    }

    #[tokio::test]
    async fn test_checkout_on_empty_cart() {
        let mut register = register();
        assert_eq!(
            register.select_payment(Tender::Cash),
            Err(CoreError::EmptyCart)
        );
    }

    #[tokio::test]
    async fn test_sale_numbers_are_unique_in_session() {
        let mut register = register();
        let mut numbers = Vec::new();
        for _ in 0..3 {
            register.add_item("vitc", 1).await.unwrap();
            let record = register.pay(Tender::Cash, Money::from_minor(1000)).unwrap();
            numbers.push(record.sale_number);
        }
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 3);
    }

    #[tokio::test]
    async fn test_notifications_can_be_dismissed() {
        let mut register = register();
        let _ = register.add_item("ghost", 1).await;

        let id = register.notifications()[0].id;
        assert!(register.dismiss(id));
        assert!(register.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_search() {
        let mut register = register();
        let rows = register.search("vitamin").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "vitc");
    }
}
