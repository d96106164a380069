//! # Console Commands
//!
//! One line of cashier input becomes one [`Command`], which is run against
//! the [`Register`] and comes back as an [`Outcome`] for the console to show.
//!
//! ## Command Reference
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add <product> [qty]                 add by id (merges)                 │
//! │  scan <barcode> [qty]                add by barcode                     │
//! │  qty <product> <qty>                 set quantity (0 or junk removes)   │
//! │  rm <product>                        remove a line                      │
//! │  clear                               empty the cart                     │
//! │  discount <10% | 5.00> [reason]      order discount                     │
//! │  discount off                        remove the order discount          │
//! │  ldiscount <product> <10% | 5.00>    line discount                      │
//! │  customer [id]                       attach or clear the customer       │
//! │  rx <product> <number> <days|-> <prescriber...>                         │
//! │  hold / held / recall <ticket> / discard <ticket>                       │
//! │  search [query]                                                         │
//! │  pay <method> [details] <amount>     cash, momo, card, bank, insurance, │
//! │                                      credit                             │
//! │  tender <amount>                     re-enter after a short payment     │
//! │  cancel                              abandon checkout                   │
//! │  show / notices / dismiss <n> / help / quit                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Write as _;

use pathway_core::held::HeldSummary;
use pathway_core::{
    CartView, CoreError, CoreResult, DiscountReason, MobileMoneyProvider, Money, Prescription,
    ProductSummary, SaleRecord, Tender,
};
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::RegisterConfig;
use crate::notify::Notification;
use crate::register::Register;

pub const HELP: &str = "\
add <product> [qty]                add a product by id
scan <barcode> [qty]               add a product by barcode
qty <product> <qty>                set a quantity (0 removes)
rm <product>                       remove a line
clear                              empty the cart
discount <10%|5.00> [reason]       order discount (discount off removes it)
ldiscount <product> <10%|5.00>     line discount
customer [id]                      attach or clear the customer
rx <product> <number> <days|-> <prescriber>
hold | held | recall <ticket> | discard <ticket>
search [query]
pay cash <amount>
pay momo <mtn|vodafone|airteltigo> <phone> <amount>
pay card|bank|insurance [reference] <amount>
pay credit <amount>
tender <amount>                    re-enter after a short payment
cancel                             abandon checkout
show | notices | dismiss <n> | help | quit";

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { product_id: String, quantity: i64 },
    Scan { code: String, quantity: i64 },
    Quantity { product_id: String, raw: String },
    Remove { product_id: String },
    Clear,
    Discount { raw: String, reason: Option<DiscountReason> },
    RemoveDiscount,
    LineDiscount { product_id: String, raw: String },
    Customer(Option<String>),
    Prescription { product_id: String, prescription: Prescription },
    Hold,
    Held,
    Recall { ticket_id: String },
    Discard { ticket_id: String },
    Search { query: String },
    Pay { tender: Tender, tendered: Money },
    Tender { tendered: Money },
    Cancel,
    Show,
    Notices,
    /// 1-based position in the notices list.
    Dismiss(usize),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

impl Command {
    /// Parses one input line. Blank lines give `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((keyword, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match keyword.to_lowercase().as_str() {
            "add" => match args {
                [id] => Command::Add {
                    product_id: id.to_string(),
                    quantity: 1,
                },
                [id, qty] => Command::Add {
                    product_id: id.to_string(),
                    quantity: parse_count(qty, "add <product> [qty]")?,
                },
                _ => return Err(CommandError::Usage("add <product> [qty]")),
            },
            "scan" => match args {
                [code] => Command::Scan {
                    code: code.to_string(),
                    quantity: 1,
                },
                [code, qty] => Command::Scan {
                    code: code.to_string(),
                    quantity: parse_count(qty, "scan <barcode> [qty]")?,
                },
                _ => return Err(CommandError::Usage("scan <barcode> [qty]")),
            },
            "qty" => match args {
                [id, raw] => Command::Quantity {
                    product_id: id.to_string(),
                    raw: raw.to_string(),
                },
                _ => return Err(CommandError::Usage("qty <product> <qty>")),
            },
            "rm" | "remove" => match args {
                [id] => Command::Remove {
                    product_id: id.to_string(),
                },
                _ => return Err(CommandError::Usage("rm <product>")),
            },
            "clear" => Command::Clear,
            "discount" => match args {
                [off] if off.eq_ignore_ascii_case("off") => Command::RemoveDiscount,
                [raw] => Command::Discount {
                    raw: raw.to_string(),
                    reason: None,
                },
                [raw, reason] => Command::Discount {
                    raw: raw.to_string(),
                    reason: Some(reason.parse::<DiscountReason>().map_err(CoreError::from)?),
                },
                _ => return Err(CommandError::Usage("discount <10%|5.00> [reason]")),
            },
            "ldiscount" => match args {
                [id, raw] => Command::LineDiscount {
                    product_id: id.to_string(),
                    raw: raw.to_string(),
                },
                _ => return Err(CommandError::Usage("ldiscount <product> <10%|5.00>")),
            },
            "customer" => Command::Customer(args.first().map(|id| id.to_string())),
            "rx" => parse_prescription(args)?,
            "hold" => Command::Hold,
            "held" => Command::Held,
            "recall" => match args {
                [ticket] => Command::Recall {
                    ticket_id: ticket.to_string(),
                },
                _ => return Err(CommandError::Usage("recall <ticket>")),
            },
            "discard" => match args {
                [ticket] => Command::Discard {
                    ticket_id: ticket.to_string(),
                },
                _ => return Err(CommandError::Usage("discard <ticket>")),
            },
            "search" => Command::Search {
                query: args.join(" "),
            },
            "pay" => parse_pay(args)?,
            "tender" => match args {
                [amount] => Command::Tender {
                    tendered: parse_amount(amount)?,
                },
                _ => return Err(CommandError::Usage("tender <amount>")),
            },
            "cancel" => Command::Cancel,
            "show" | "cart" => Command::Show,
            "notices" => Command::Notices,
            "dismiss" => match args {
                [n] => Command::Dismiss(
                    n.parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(CommandError::Usage("dismiss <n>"))?,
                ),
                _ => return Err(CommandError::Usage("dismiss <n>")),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

fn parse_count(raw: &str, usage: &'static str) -> Result<i64, CommandError> {
    raw.parse::<i64>().map_err(|_| CommandError::Usage(usage))
}

fn parse_amount(raw: &str) -> Result<Money, CommandError> {
    Ok(raw.parse::<Money>().map_err(CoreError::from)?)
}

fn parse_prescription(args: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "rx <product> <number> <days|-> <prescriber>";

    let [id, number, days, prescriber @ ..] = args else {
        return Err(CommandError::Usage(USAGE));
    };
    if prescriber.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }

    let days_supply = match *days {
        "-" => None,
        days => Some(days.parse::<u32>().map_err(|_| CommandError::Usage(USAGE))?),
    };

    Ok(Command::Prescription {
        product_id: id.to_string(),
        prescription: Prescription {
            prescription_number: number.to_string(),
            prescriber_name: prescriber.join(" "),
            days_supply,
        },
    })
}

fn parse_pay(args: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "pay <cash|momo|card|bank|insurance|credit> [details] <amount>";

    let [method, details @ .., amount] = args else {
        return Err(CommandError::Usage(USAGE));
    };
    let tendered = parse_amount(amount)?;
    let reference = (!details.is_empty()).then(|| details.join(" "));

    let tender = match method.to_lowercase().as_str() {
        "cash" if details.is_empty() => Tender::Cash,
        "credit" if details.is_empty() => Tender::StoreCredit,
        "momo" => {
            let [provider, phone @ ..] = details else {
                return Err(CommandError::Usage(
                    "pay momo <mtn|vodafone|airteltigo> <phone> <amount>",
                ));
            };
            Tender::MobileMoney {
                provider: Some(
                    provider
                        .parse::<MobileMoneyProvider>()
                        .map_err(CoreError::from)?,
                ),
                phone: phone.join(" "),
            }
        }
        "card" => Tender::Card { reference },
        "bank" => Tender::BankTransfer { reference },
        "insurance" => Tender::Insurance {
            claim_number: reference,
        },
        _ => return Err(CommandError::Usage(USAGE)),
    };

    Ok(Command::Pay { tender, tendered })
}

// =============================================================================
// Execution
// =============================================================================

/// What a command produced, for the console to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Cart(CartView),
    Sale(SaleRecord),
    Ticket(String),
    Held(Vec<HeldSummary>),
    Results(Vec<ProductSummary>),
    Notices(Vec<Notification>),
    Message(String),
    Help,
    Quit,
}

/// Runs a command against the session.
///
/// Failures have already been raised as notifications by the register; the
/// error is returned so the caller can decide whether to echo it.
pub async fn execute<C: Catalog>(
    register: &mut Register<C>,
    command: Command,
) -> CoreResult<Outcome> {
    debug!(?command, "Executing command");

    let outcome = match command {
        Command::Add {
            product_id,
            quantity,
        } => Outcome::Cart(register.add_item(&product_id, quantity).await?),
        Command::Scan { code, quantity } => {
            Outcome::Cart(register.scan_barcode(&code, quantity).await?)
        }
        Command::Quantity { product_id, raw } => {
            Outcome::Cart(register.edit_quantity(&product_id, &raw)?)
        }
        Command::Remove { product_id } => Outcome::Cart(register.remove_item(&product_id)?),
        Command::Clear => Outcome::Cart(register.clear()?),
        Command::Discount { raw, reason } => {
            Outcome::Cart(register.apply_discount_input(&raw, reason)?)
        }
        Command::RemoveDiscount => Outcome::Cart(register.remove_discount()?),
        Command::LineDiscount { product_id, raw } => {
            Outcome::Cart(register.apply_line_discount_input(&product_id, &raw)?)
        }
        Command::Customer(customer_id) => Outcome::Cart(register.set_customer(customer_id)?),
        Command::Prescription {
            product_id,
            prescription,
        } => Outcome::Cart(register.attach_prescription(&product_id, prescription)?),
        Command::Hold => Outcome::Ticket(register.hold()?),
        Command::Held => Outcome::Held(register.held()),
        Command::Recall { ticket_id } => Outcome::Cart(register.recall(&ticket_id)?),
        Command::Discard { ticket_id } => {
            register.discard_held(&ticket_id)?;
            Outcome::Message(format!("Discarded {}", ticket_id))
        }
        Command::Search { query } => Outcome::Results(register.search(&query).await?),
        Command::Pay { tender, tendered } => Outcome::Sale(register.pay(tender, tendered)?),
        Command::Tender { tendered } => {
            register.enter_tendered(tendered)?;
            Outcome::Sale(register.complete_sale()?)
        }
        Command::Cancel => {
            register.cancel_checkout();
            Outcome::Message("Checkout cancelled".to_string())
        }
        Command::Show => Outcome::Cart(register.view()),
        Command::Notices => Outcome::Notices(register.notifications()),
        Command::Dismiss(position) => {
            let active = register.notifications();
            match position.checked_sub(1).and_then(|i| active.get(i)) {
                Some(notice) if register.dismiss(notice.id) => {
                    Outcome::Message("Dismissed".to_string())
                }
                _ => Outcome::Message(format!("No notice #{}", position)),
            }
        }
        Command::Help => Outcome::Help,
        Command::Quit => Outcome::Quit,
    };

    Ok(outcome)
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders an outcome as console text. Sales render as a one-line summary;
/// the receipt itself goes through the printer.
pub fn render(outcome: &Outcome, config: &RegisterConfig) -> String {
    match outcome {
        Outcome::Cart(view) => render_cart(view, config),
        Outcome::Sale(record) => format!(
            "Sale {} complete: total {}, change {}",
            record.sale_number,
            config.format_currency(record.grand_total),
            config.format_currency(record.payment.change)
        ),
        Outcome::Ticket(ticket) => format!("Held as {}", ticket),
        Outcome::Held(tickets) if tickets.is_empty() => "No held sales".to_string(),
        Outcome::Held(tickets) => tickets
            .iter()
            .map(|t| {
                format!(
                    "{}  {} line(s)  {}{}",
                    t.ticket_id,
                    t.item_count,
                    config.format_currency(t.grand_total),
                    t.customer_id
                        .as_deref()
                        .map(|c| format!("  [{}]", c))
                        .unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Outcome::Results(rows) if rows.is_empty() => "No matches".to_string(),
        Outcome::Results(rows) => rows
            .iter()
            .map(|p| {
                format!(
                    "{:<12} {:<30} {:>10}{}",
                    p.id,
                    p.name,
                    config.format_currency(p.unit_price),
                    p.generic_name
                        .as_deref()
                        .map(|g| format!("  ({})", g))
                        .unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Outcome::Notices(notices) if notices.is_empty() => "No notices".to_string(),
        Outcome::Notices(notices) => notices
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{}. [{}] {}", i + 1, n.level, n.message))
            .collect::<Vec<_>>()
            .join("\n"),
        Outcome::Message(message) => message.clone(),
        Outcome::Help => HELP.to_string(),
        Outcome::Quit => String::new(),
    }
}

pub fn render_cart(view: &CartView, config: &RegisterConfig) -> String {
    if view.lines.is_empty() {
        return "Cart is empty".to_string();
    }

    let money = |m: Money| config.format_currency(m);
    let mut out = String::new();

    for line in &view.lines {
        let _ = writeln!(
            out,
            "{:<12} {:<26} {:>4} x {:>9} {:>10}",
            line.product_id,
            line.name,
            line.quantity,
            money(line.unit_price),
            money(line.line_total)
        );
        if line.line_discount.is_positive() {
            let _ = writeln!(out, "{:>54} -{}", "line discount", money(line.line_discount));
        }
        if line.prescription_missing {
            let _ = writeln!(out, "{:>54}", "Rx details missing");
        }
    }

    let _ = writeln!(out, "Subtotal {:>15}", money(view.subtotal));
    if view.order_discount.is_positive() {
        let reason = view
            .discount_reason
            .map(|r| format!(" ({})", r))
            .unwrap_or_default();
        let _ = writeln!(out, "Discount{} -{}", reason, money(view.order_discount));
    }
    let _ = writeln!(out, "Tax {} {:>12}", view.tax_rate, money(view.tax));
    let _ = write!(
        out,
        "TOTAL {:>18}  ({} line(s), {} item(s))",
        money(view.grand_total),
        view.item_count,
        view.total_quantity
    );
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
