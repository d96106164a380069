//! # Receipt Printing
//!
//! The print/export surface. A [`SaleRecord`] is handed over once the sale
//! is complete; what happens to it from here is up to the printer.
//!
//! ## Fixed-Width Layout (42 columns)
//! ```text
//!              Pathway Pharmacy
//!                 123 Main St
//!                Accra, Ghana
//!            Tel: +233 20 123 4567
//! ------------------------------------------
//! Sale: POS20261016-093005-0001
//! Date: 2026-10-16 09:30
//! Cashier: Front Counter
//! ------------------------------------------
//! Paracetamol 500mg x 24
//!   2 x ₵10.00                        ₵20.00
//! ==========================================
//! Subtotal                            ₵20.00
//! Tax (12.5%)                          ₵2.50
//! TOTAL                               ₵22.50
//! ------------------------------------------
//! Paid by                               Cash
//! Tendered                            ₵25.00
//! Change                               ₵2.50
//! ```

use std::io::Write;

use pathway_core::{Money, PaymentMethod, SaleRecord};

use crate::config::{RegisterConfig, StoreConfig};
use crate::error::RegisterResult;

/// Receives completed sales.
pub trait ReceiptPrinter: Send {
    fn print(&mut self, record: &SaleRecord) -> RegisterResult<()>;
}

// =============================================================================
// Text Layout
// =============================================================================

/// Renders a sale record as fixed-width text.
#[derive(Debug, Clone)]
pub struct TextReceipt {
    width: usize,
    store: StoreConfig,
    symbol: String,
}

impl TextReceipt {
    pub fn new(width: usize, store: StoreConfig, symbol: impl Into<String>) -> Self {
        TextReceipt {
            width,
            store,
            symbol: symbol.into(),
        }
    }

    pub fn from_config(config: &RegisterConfig) -> Self {
        TextReceipt::new(
            config.till.paper_width,
            config.store.clone(),
            config.currency.symbol.clone(),
        )
    }

    pub fn render(&self, record: &SaleRecord) -> String {
        let mut out = String::new();

        // Header
        out.push_str(&self.centered(&self.store.name));
        for line in &self.store.address {
            out.push_str(&self.centered(line));
        }
        if let Some(phone) = &self.store.phone {
            out.push_str(&self.centered(&format!("Tel: {}", phone)));
        }
        if let Some(license) = &self.store.license {
            out.push_str(&self.centered(&format!("Licence: {}", license)));
        }
        out.push_str(&self.separator('-'));

        out.push_str(&self.fitted(&format!("Sale: {}", record.sale_number)));
        out.push_str(&self.fitted(&format!(
            "Date: {}",
            record.created_at.format("%Y-%m-%d %H:%M")
        )));
        out.push_str(&self.fitted(&format!("Cashier: {}", record.cashier)));
        if let Some(customer) = &record.customer_id {
            out.push_str(&self.fitted(&format!("Customer: {}", customer)));
        }
        out.push_str(&self.separator('-'));

        // Lines
        for line in &record.lines {
            let mut title = line.name.clone();
            if let Some(strength) = &line.strength {
                if !title.contains(strength.as_str()) {
                    title = format!("{} {}", title, strength);
                }
            }
            out.push_str(&self.fitted(&title));

            let gross = line.unit_price * line.quantity;
            out.push_str(&self.amount_row(
                &format!("  {} x {}", line.quantity, self.money(line.unit_price)),
                gross,
            ));
            if line.line_discount.is_positive() {
                out.push_str(&self.amount_row("  Discount", Money::zero() - line.line_discount));
            }
            if let Some(rx) = &line.prescription {
                out.push_str(&self.fitted(&format!(
                    "  Rx {} ({})",
                    rx.prescription_number, rx.prescriber_name
                )));
            }
        }
        out.push_str(&self.separator('='));

        // Totals
        out.push_str(&self.amount_row("Subtotal", record.subtotal));
        if record.order_discount.is_positive() {
            let label = match record.discount_reason {
                Some(reason) => format!("Discount ({})", reason),
                None => "Discount".to_string(),
            };
            out.push_str(&self.amount_row(&label, Money::zero() - record.order_discount));
        }
        out.push_str(&self.amount_row(&format!("Tax ({})", record.tax_rate), record.tax));
        out.push_str(&self.amount_row("TOTAL", record.grand_total));
        out.push_str(&self.separator('-'));

        // Payment
        let payment = &record.payment;
        let method = match (payment.method, payment.provider) {
            (PaymentMethod::MobileMoney, Some(provider)) => provider.to_string(),
            (method, _) => method.to_string(),
        };
        out.push_str(&self.text_row("Paid by", &method));
        if let Some(phone) = &payment.phone {
            out.push_str(&self.text_row("Phone", &mask_phone(phone)));
        }
        if let Some(reference) = &payment.reference {
            out.push_str(&self.text_row("Ref", reference));
        }
        out.push_str(&self.amount_row("Tendered", payment.tendered));
        out.push_str(&self.amount_row("Change", payment.change));

        // Footer
        out.push('\n');
        out.push_str(&self.centered(&format!("Thank you for choosing {}", self.store.name)));
        out.push_str(&self.centered("Get well soon!"));

        out
    }

    fn money(&self, amount: Money) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.symbol, Money::from_minor(-amount.minor_units()))
        } else {
            format!("{}{}", self.symbol, amount)
        }
    }

    fn separator(&self, ch: char) -> String {
        let mut line: String = std::iter::repeat(ch).take(self.width).collect();
        line.push('\n');
        line
    }

    fn centered(&self, text: &str) -> String {
        let text = truncate(text, self.width);
        let pad = (self.width - text.chars().count()) / 2;
        format!("{}{}\n", " ".repeat(pad), text)
    }

    fn fitted(&self, text: &str) -> String {
        format!("{}\n", truncate(text, self.width))
    }

    fn amount_row(&self, label: &str, amount: Money) -> String {
        self.text_row(label, &self.money(amount))
    }

    /// Label on the left, value flush right.
    fn text_row(&self, label: &str, value: &str) -> String {
        let value = truncate(value, self.width);
        let room = self.width - value.chars().count();
        let label = truncate(label, room.saturating_sub(1));
        format!("{:<room$}{}\n", label, value, room = room)
    }
}

/// Cuts `text` to at most `max` characters.
fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Hides all but the last four digits.
fn mask_phone(phone: &str) -> String {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let mut seen = 0;
    phone
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen + 4 <= digits {
                    return '*';
                }
            }
            c
        })
        .collect()
}

// =============================================================================
// Printers
// =============================================================================

/// Writes the text layout to any writer (stdout, a file, a printer device).
pub struct TextPrinter<W> {
    layout: TextReceipt,
    out: W,
}

impl<W: Write + Send> TextPrinter<W> {
    pub fn new(layout: TextReceipt, out: W) -> Self {
        TextPrinter { layout, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ReceiptPrinter for TextPrinter<W> {
    fn print(&mut self, record: &SaleRecord) -> RegisterResult<()> {
        self.out.write_all(self.layout.render(record).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes the record as pretty JSON.
pub struct JsonExporter<W> {
    out: W,
}

impl<W: Write + Send> JsonExporter<W> {
    pub fn new(out: W) -> Self {
        JsonExporter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ReceiptPrinter for JsonExporter<W> {
    fn print(&mut self, record: &SaleRecord) -> RegisterResult<()> {
        let json = record.to_json()?;
        writeln!(self.out, "{}", json)?;
        self.out.flush()?;
        Ok(())
    }
}
