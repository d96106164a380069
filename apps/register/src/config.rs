//! # Register Configuration
//!
//! Store, currency and till settings, read once at startup.
//!
//! ## Load Order (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file (`register.toml`, explicit path or the platform config dir)
//! 3. Environment variables (`PATHWAY_*`)
//! 4. Validation
//!
//! ## Example register.toml
//! ```toml
//! [store]
//! name = "Pathway Pharmacy"
//! address = ["123 Main St", "Accra, Ghana"]
//! phone = "+233 20 123 4567"
//!
//! [currency]
//! code = "GHS"
//! symbol = "₵"
//!
//! [till]
//! cashier = "Front Counter"
//! tax_rate_bps = 1250
//! paper_width = 42
//! notification_ttl_secs = 5
//!
//! [catalog]
//! path = "catalog.toml"
//! timeout_ms = 3000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use pathway_core::validation::validate_tax_rate_bps;
use pathway_core::{Money, TaxRate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{RegisterError, RegisterResult};

/// Printed in the receipt header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: String,
    pub address: Vec<String>,
    pub phone: Option<String>,
    /// Pharmacy licence number.
    pub license: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: "Pathway Pharmacy".to_string(),
            address: vec!["123 Main St".to_string(), "Accra, Ghana".to_string()],
            phone: Some("+233 20 123 4567".to_string()),
            license: None,
        }
    }
}

/// Amounts are always hundredths of the major unit; only the labels vary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// ISO 4217 code.
    pub code: String,
    pub symbol: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        CurrencyConfig {
            code: "GHS".to_string(),
            symbol: "₵".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TillConfig {
    /// Name recorded on every sale.
    pub cashier: String,
    /// 1250 = 12.5%
    pub tax_rate_bps: u32,
    /// Receipt width in characters (typically 32, 42 or 48).
    pub paper_width: usize,
    pub notification_ttl_secs: u64,
}

impl Default for TillConfig {
    fn default() -> Self {
        TillConfig {
            cashier: "Front Counter".to_string(),
            tax_rate_bps: 1250,
            paper_width: 42,
            notification_ttl_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog file for the in-memory catalog.
    pub path: Option<PathBuf>,
    pub timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            path: None,
            timeout_ms: 3000,
        }
    }
}

/// Complete register configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub currency: CurrencyConfig,

    #[serde(default)]
    pub till: TillConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl RegisterConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> RegisterResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading register config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if anything goes wrong.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load register config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> RegisterResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| RegisterError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Register config saved");
        Ok(())
    }

    pub fn validate(&self) -> RegisterResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(RegisterError::InvalidConfig("store name is required".into()));
        }

        if self.till.cashier.trim().is_empty() {
            return Err(RegisterError::InvalidConfig("cashier is required".into()));
        }

        validate_tax_rate_bps(self.till.tax_rate_bps)
            .map_err(|e| RegisterError::InvalidConfig(e.to_string()))?;

        if !(24..=80).contains(&self.till.paper_width) {
            return Err(RegisterError::InvalidConfig(format!(
                "paper_width must be between 24 and 80, got {}",
                self.till.paper_width
            )));
        }

        if self.catalog.timeout_ms == 0 {
            return Err(RegisterError::InvalidConfig(
                "catalog timeout_ms must be greater than 0".into(),
            ));
        }

        if self.till.notification_ttl_secs == 0 {
            return Err(RegisterError::InvalidConfig(
                "notification_ttl_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `PATHWAY_*` overrides from `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("PATHWAY_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(cashier) = lookup("PATHWAY_CASHIER") {
            debug!(cashier = %cashier, "Overriding cashier from environment");
            self.till.cashier = cashier;
        }

        if let Some(symbol) = lookup("PATHWAY_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }

        if let Some(raw) = lookup("PATHWAY_TAX_RATE_BPS") {
            match raw.parse::<u32>() {
                Ok(bps) => {
                    debug!(bps, "Overriding tax rate from environment");
                    self.till.tax_rate_bps = bps;
                }
                Err(_) => warn!(value = %raw, "Ignoring non-numeric PATHWAY_TAX_RATE_BPS"),
            }
        }

        if let Some(path) = lookup("PATHWAY_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("PATHWAY_CATALOG_TIMEOUT_MS") {
            if let Ok(ms) = raw.parse::<u64>() {
                self.catalog.timeout_ms = ms;
            }
        }

        if let Some(raw) = lookup("PATHWAY_PAPER_WIDTH") {
            if let Ok(width) = raw.parse::<usize>() {
                self.till.paper_width = width;
            }
        }

        if let Some(raw) = lookup("PATHWAY_NOTIFICATION_TTL_SECS") {
            if let Ok(secs) = raw.parse::<u64>() {
                self.till.notification_ttl_secs = secs;
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pathway", "pos")
            .map(|dirs| dirs.config_dir().join("register.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.till.tax_rate_bps)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog.timeout_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.till.notification_ttl_secs)
    }

    /// Formats an amount with the currency symbol, e.g. `₵12.34`, `-₵0.50`.
    pub fn format_currency(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let magnitude = Money::from_minor(amount.minor_units().abs());
        format!("{}{}{}", sign, self.currency.symbol, magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = RegisterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tax_rate(), TaxRate::from_bps(1250));
        assert_eq!(config.catalog_timeout(), Duration::from_millis(3000));
        assert_eq!(config.notification_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_format_currency() {
        let config = RegisterConfig::default();
        assert_eq!(config.format_currency(Money::from_minor(1234)), "₵12.34");
        assert_eq!(config.format_currency(Money::from_minor(5)), "₵0.05");
        assert_eq!(config.format_currency(Money::from_minor(-50)), "-₵0.50");
    }

    #[test]
    fn test_validation() {
        let mut config = RegisterConfig::default();
        config.till.tax_rate_bps = 10_001;
        assert!(config.validate().is_err());

        let mut config = RegisterConfig::default();
        config.till.cashier = " ".into();
        assert!(config.validate().is_err());

        let mut config = RegisterConfig::default();
        config.till.paper_width = 12;
        assert!(config.validate().is_err());

        let mut config = RegisterConfig::default();
        config.catalog.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = RegisterConfig::default();
        config.apply_overrides(overrides(&[
            ("PATHWAY_CASHIER", "Ama"),
            ("PATHWAY_TAX_RATE_BPS", "1500"),
            ("PATHWAY_CATALOG_TIMEOUT_MS", "250"),
            ("PATHWAY_PAPER_WIDTH", "not-a-number"),
        ]));

        assert_eq!(config.till.cashier, "Ama");
        assert_eq!(config.tax_rate(), TaxRate::from_bps(1500));
        assert_eq!(config.catalog.timeout_ms, 250);
        assert_eq!(config.till.paper_width, 42);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RegisterConfig = toml::from_str(
            r#"
            [till]
            cashier = "Kofi"

            [catalog]
            path = "catalog.toml"
            "#,
        )
        .unwrap();

        assert_eq!(config.till.cashier, "Kofi");
        assert_eq!(config.till.tax_rate_bps, 1250);
        assert_eq!(config.catalog.path, Some(PathBuf::from("catalog.toml")));
        assert_eq!(config.store.name, "Pathway Pharmacy");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("pathway-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("register.toml");

        let mut config = RegisterConfig::default();
        config.store.name = "Pathway Pharmacy Osu".into();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[till]"));

        let loaded: RegisterConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_demo_config_is_valid() {
        let config: RegisterConfig =
            toml::from_str(include_str!("../../../demos/register.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.tax_rate().bps(), 1250);
        assert_eq!(
            config.catalog.path.as_deref(),
            Some(std::path::Path::new("demos/catalog.toml"))
        );
    }
}
