//! # Pathway Register
//!
//! The till: one session per register, driven from the console.
//!
//! ## Module Organization
//! ```text
//! pathway_register/
//! ├── lib.rs          ◄─── You are here (exports & tracing setup)
//! ├── register.rs     ◄─── Session context (cart, held tickets, checkout)
//! ├── catalog.rs      ◄─── Catalog port, TOML catalog, timeout/dedup client
//! ├── commands.rs     ◄─── Console command parsing and dispatch
//! ├── notify.rs       ◄─── Notifications & the display surface trait
//! ├── printer.rs      ◄─── Receipt layout and printers
//! ├── config.rs       ◄─── register.toml + PATHWAY_* overrides
//! └── error.rs        ◄─── RegisterError
//! ```
//!
//! ## Flow of One Input Line
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "add p-001 2"                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Command::parse ──► execute(&mut Register, Command)                     │
//! │                          │                                              │
//! │                          ├──► CatalogClient::resolve (timeout 3 s)      │
//! │                          ├──► Cart::add_product  (pathway-core)         │
//! │                          └──► DisplaySurface::cart_changed(CartView)    │
//! │                                                                         │
//! │  On failure: cart untouched, Notification raised at the error's level   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod notify;
pub mod printer;
pub mod register;

use tracing_subscriber::EnvFilter;

pub use catalog::{Catalog, CatalogClient, CatalogError, InMemoryCatalog};
pub use commands::{execute, Command, CommandError, Outcome};
pub use config::RegisterConfig;
pub use error::{RegisterError, RegisterResult};
pub use notify::{DisplaySurface, NoOpDisplay, Notification, NotificationCenter};
pub use printer::{JsonExporter, ReceiptPrinter, TextPrinter, TextReceipt};
pub use register::Register;

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they don't interleave with receipts on stdout.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pathway=trace` - Show trace for pathway crates only
/// - Default: INFO, DEBUG for pathway crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pathway=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
