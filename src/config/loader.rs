//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SyncConfig;
use super::secret::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SyncConfig
/// 4. Applies environment variable overrides (EDX_SF_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use edx_salesforce::config::loader::load_config;
///
/// let config = load_config("edx-salesforce.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        SyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the EDX_SF_* prefix
///
/// Environment variables follow the pattern: EDX_SF_<SECTION>_<KEY>
/// For example: EDX_SF_SALESFORCE_LOGIN_URL, EDX_SF_REPORT_OUTPUT_DIR
fn apply_env_overrides(config: &mut SyncConfig) {
    if let Ok(val) = std::env::var("EDX_SF_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Sources
    if let Ok(val) = std::env::var("EDX_SF_SOURCES_DEFAULT_CONNECTION_STRING") {
        config.sources.default.connection_string = secret_string(val);
    }
    if let Ok(val) = std::env::var("EDX_SF_SOURCES_DEFAULT_SSL_MODE") {
        config.sources.default.ssl_mode = val;
    }
    if let Ok(val) = std::env::var("EDX_SF_SOURCES_ECOMMERCE_CONNECTION_STRING") {
        config.sources.ecommerce.connection_string = secret_string(val);
    }
    if let Ok(val) = std::env::var("EDX_SF_SOURCES_ECOMMERCE_SSL_MODE") {
        config.sources.ecommerce.ssl_mode = val;
    }

    // Salesforce
    if let Ok(val) = std::env::var("EDX_SF_SALESFORCE_LOGIN_URL") {
        config.salesforce.login_url = val;
    }
    if let Ok(val) = std::env::var("EDX_SF_SALESFORCE_API_VERSION") {
        config.salesforce.api_version = val;
    }
    if let Ok(val) = std::env::var("EDX_SF_SALESFORCE_CLIENT_ID") {
        config.salesforce.client_id = val;
    }
    if let Ok(val) = std::env::var("EDX_SF_SALESFORCE_CLIENT_SECRET") {
        config.salesforce.client_secret = secret_string(val);
    }
    if let Ok(val) = std::env::var("EDX_SF_SALESFORCE_USERNAME") {
        config.salesforce.username = val;
    }
    if let Ok(val) = std::env::var("EDX_SF_SALESFORCE_PASSWORD") {
        config.salesforce.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("EDX_SF_SALESFORCE_SECURITY_TOKEN") {
        config.salesforce.security_token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("EDX_SF_SALESFORCE_CONVERTED_STATUS") {
        config.salesforce.converted_status = val;
    }
    if let Ok(val) = std::env::var("EDX_SF_SALESFORCE_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.salesforce.timeout_seconds = timeout;
        }
    }

    // Report
    if let Ok(val) = std::env::var("EDX_SF_REPORT_OUTPUT_DIR") {
        config.report.output_dir = val;
    }

    // Logging
    if let Ok(val) = std::env::var("EDX_SF_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("EDX_SF_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
