//! # Register Error Types
//!
//! Errors of the till layer. Business rule failures stay as
//! [`pathway_core::CoreError`] and reach the cashier as notifications;
//! this module covers what only the register can get wrong: config files,
//! the catalog file and console I/O.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Catalog call ── CatalogError ──► CoreError::CollaboratorUnavailable    │
//! │                                         │                               │
//! │  Cart / checkout ── CoreError ──────────┼──► Notification (level, msg)  │
//! │                                         │                               │
//! │  Startup (config, catalog file, stdin) ── RegisterError ──► exit        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for register operations.
pub type RegisterResult<T> = Result<T, RegisterError>;

#[derive(Debug, Error)]
pub enum RegisterError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A config value is out of range.
    #[error("Invalid register configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Catalog File Errors
    // =========================================================================
    /// Failed to read or parse the catalog file.
    #[error("Failed to load catalog: {0}")]
    CatalogLoadFailed(String),

    // =========================================================================
    // Runtime Errors
    // =========================================================================
    /// Console or printer I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Receipt export failed.
    #[error("Export failed: {0}")]
    ExportFailed(String),
}

impl From<toml::de::Error> for RegisterError {
    fn from(err: toml::de::Error) -> Self {
        RegisterError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for RegisterError {
    fn from(err: toml::ser::Error) -> Self {
        RegisterError::ConfigSaveFailed(err.to_string())
    }
}

impl From<serde_json::Error> for RegisterError {
    fn from(err: serde_json::Error) -> Self {
        RegisterError::ExportFailed(err.to_string())
    }
}
