//! # Pathway Register Entry Point
//!
//! A console till. Reads one command per line from stdin, prints the cart
//! after each change and a receipt after each sale.
//!
//! ## Usage
//! ```text
//! register [config.toml] [--json]
//!
//!   config.toml   defaults to the platform config dir (register.toml)
//!   --json        also export each sale record as JSON
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Load config (file, then PATHWAY_* overrides)
//! 3. Load the catalog file, or start with an empty catalog
//! 4. Read commands until `quit` or end of input

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use pathway_core::{CartView, NotificationLevel};
use pathway_register::commands::{self, Command, Outcome};
use pathway_register::{
    init_tracing, DisplaySurface, InMemoryCatalog, JsonExporter, Notification, ReceiptPrinter,
    Register, RegisterConfig, RegisterResult, TextPrinter, TextReceipt,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Prints notifications as they are raised. The cart itself is printed by
/// the command loop, so `cart_changed` has nothing to do here.
struct ConsoleDisplay;

impl DisplaySurface for ConsoleDisplay {
    fn cart_changed(&self, _view: &CartView) {}

    fn notified(&self, notification: &Notification) {
        let marker = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "i",
            NotificationLevel::Warning => "!",
            NotificationLevel::Danger => "!!",
        };
        println!("[{}] {}", marker, notification.message);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Register stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> RegisterResult<()> {
    let mut config_path = None;
    let mut export_json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => export_json = true,
            _ => config_path = Some(PathBuf::from(arg)),
        }
    }

    let config = RegisterConfig::load_or_default(config_path);
    info!(
        store = %config.store.name,
        cashier = %config.till.cashier,
        tax = %config.tax_rate(),
        "Starting Pathway register"
    );

    let catalog = match &config.catalog.path {
        Some(path) => InMemoryCatalog::load(path)?,
        None => {
            warn!("No catalog configured; every lookup will miss");
            InMemoryCatalog::default()
        }
    };

    let mut register =
        Register::new(config.clone(), catalog).with_display(Arc::new(ConsoleDisplay));
    let mut printer = TextPrinter::new(TextReceipt::from_config(&config), std::io::stdout());
    let mut exporter = export_json.then(|| JsonExporter::new(std::io::stdout()));

    println!("{} - type 'help' for commands", config.store.name);
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => {
                prompt()?;
                continue;
            }
            Err(e) => {
                println!("{}", e);
                prompt()?;
                continue;
            }
        };

        match commands::execute(&mut register, command).await {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Sale(record)) => {
                printer.print(&record)?;
                if let Some(exporter) = exporter.as_mut() {
                    exporter.print(&record)?;
                }
                println!("{}", commands::render(&Outcome::Sale(record), &config));
            }
            Ok(outcome) => println!("{}", commands::render(&outcome, &config)),
            // failures are already shown through the display surface
            Err(_) => {}
        }
        prompt()?;
    }

    if !register.cart().is_empty() || !register.held().is_empty() {
        warn!(
            lines = register.cart().item_count(),
            held = register.held().len(),
            "Exiting with an open sale; unsaved carts are lost"
        );
    }
    info!("Register closed");
    Ok(())
}

fn prompt() -> RegisterResult<()> {
    let mut out = std::io::stdout();
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}
