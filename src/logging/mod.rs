//! Logging and observability
//!
//! Structured logging on `tracing`, with console output and optional
//! JSON files with rotation.
//!
//! # Example
//!
//! ```no_run
//! use edx_salesforce::logging::init_logging;
//! use edx_salesforce::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(site = "courses.example.com", "Sync started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a run for a site and org set
///
/// # Example
///
/// ```no_run
/// use edx_salesforce::log_run_start;
///
/// let orgs = vec!["OrgX".to_string()];
/// log_run_start!("sync", "courses.example.com", &orgs);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($command:expr, $site:expr, $orgs:expr) => {
        tracing::info!(
            command = $command,
            site = %$site,
            orgs = ?$orgs,
            "Starting run"
        );
    };
}

/// Log a per-user failure with the full error chain
///
/// # Example
///
/// ```no_run
/// use edx_salesforce::log_user_failure;
/// use edx_salesforce::domain::SyncError;
///
/// let error = SyncError::Other("lead conversion rejected".to_string());
/// log_user_failure!("alice", &error);
/// ```
#[macro_export]
macro_rules! log_user_failure {
    ($username:expr, $error:expr) => {
        tracing::error!(
            username = %$username,
            error = %$error,
            details = ?$error,
            "User synchronization failed"
        );
    };
}
