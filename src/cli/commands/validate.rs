//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file and, optionally, the connections it describes.

use super::{exit_code_for, EXIT_CONFIG, EXIT_SUCCESS};
use crate::adapters::crm::SalesforceClient;
use crate::adapters::source::PgRecordStore;
use crate::config::{load_config, PostgreSQLConfig};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also connect to both source databases and authenticate with Salesforce
    #[arg(long)]
    pub check_connections: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config also runs validation
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Default Source: {}",
            redacted_host(&config.sources.default)
        );
        println!(
            "  E-commerce Source: {}",
            redacted_host(&config.sources.ecommerce)
        );
        println!("  Salesforce Login: {}", config.salesforce.login_url);
        println!("  Salesforce API Version: {}", config.salesforce.api_version);
        println!("  Salesforce User: {}", config.salesforce.username);
        println!("  Report Directory: {}", config.report.output_dir);
        println!();

        if !self.check_connections {
            return Ok(EXIT_SUCCESS);
        }

        println!("🔌 Checking connections...");
        let store = match PgRecordStore::from_config(&config.sources) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Source databases: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        if let Err(e) = store.test_connections().await {
            println!("❌ Source databases: {e}");
            return Ok(exit_code_for(&e));
        }
        println!("✅ Source databases reachable");

        match SalesforceClient::connect(config.salesforce.clone()).await {
            Ok(client) => {
                println!("✅ Salesforce authenticated ({})", client.instance_url());
            }
            Err(e) => {
                println!("❌ Salesforce: {e}");
                return Ok(exit_code_for(&e));
            }
        }

        Ok(EXIT_SUCCESS)
    }
}

/// Host part of a connection string, without credentials
fn redacted_host(config: &PostgreSQLConfig) -> &str {
    config.connection_string.expose_secret().redacted_host()
}
