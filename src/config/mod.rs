//! Configuration management.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for optional settings
//! - `EDX_SF_<SECTION>_<KEY>` environment overrides
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`SourcesConfig`] - The `default` and `ecommerce` PostgreSQL sources
//! - [`SalesforceConfig`] - OAuth credentials and API settings
//! - [`ReportConfig`] - CSV output location
//! - [`LoggingConfig`] - File logging
//!
//! # Example Configuration
//!
//! ```toml
//! [sources.default]
//! connection_string = "postgresql://edx:${EDXAPP_DB_PASSWORD}@db:5432/edxapp"
//!
//! [sources.ecommerce]
//! connection_string = "postgresql://edx:${ECOMMERCE_DB_PASSWORD}@db:5432/ecommerce"
//!
//! [salesforce]
//! client_id = "3MVG9..."
//! client_secret = "${SALESFORCE_CLIENT_SECRET}"
//! username = "integration@example.com"
//! password = "${SALESFORCE_PASSWORD}"
//! security_token = "${SALESFORCE_SECURITY_TOKEN}"
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use edx_salesforce::config::load_config;
//!
//! # fn example() {
//! match load_config("edx-salesforce.toml") {
//!     Ok(config) => println!("Configuration valid"),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, LoggingConfig, PostgreSQLConfig, ReportConfig, SalesforceConfig,
    SourcesConfig, SyncConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
