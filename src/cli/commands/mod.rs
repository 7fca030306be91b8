//! CLI command implementations
//!
//! This module contains all CLI command implementations and the exit code
//! conventions they share.

pub mod init;
pub mod report;
pub mod sync;
pub mod validate;

use crate::domain::{CrmError, SourceError, SyncError};

/// Run completed without per-user failures
pub const EXIT_SUCCESS: i32 = 0;
/// Run completed but some users failed
pub const EXIT_PARTIAL: i32 = 1;
/// Configuration could not be loaded or is invalid
pub const EXIT_CONFIG: i32 = 2;
/// A source database or Salesforce could not be reached
pub const EXIT_CONNECTION: i32 = 4;
/// Any other error that aborted the run
pub const EXIT_FATAL: i32 = 5;
/// Stopped by SIGINT/SIGTERM
pub const EXIT_INTERRUPTED: i32 = 130;

/// Maps an error that aborted a command to its exit code
pub fn exit_code_for(error: &SyncError) -> i32 {
    match error {
        SyncError::Configuration(_) | SyncError::Validation(_) => EXIT_CONFIG,
        SyncError::Connection(_)
        | SyncError::Source(SourceError::ConnectionFailed { .. })
        | SyncError::Crm(CrmError::AuthenticationFailed(_) | CrmError::ConnectionFailed(_)) => {
            EXIT_CONNECTION
        }
        _ => EXIT_FATAL,
    }
}

/// `""` for one, `"s"` otherwise
pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Printed when a site and its orgs have no users
pub(crate) fn no_users_message(site_domain: &str, orgs: &[String]) -> String {
    format!(
        "No user accounts found for site {} and orgs {}...",
        site_domain,
        orgs.join(",")
    )
}
