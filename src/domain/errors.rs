//! Domain error types
//!
//! This module defines the error hierarchy for the sync tool.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main error type
///
/// This is the primary error type used throughout the application.
/// It wraps the source database and CRM error families and provides
/// context for error handling at the command boundary.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source database errors
    #[error("Source database error: {0}")]
    Source(#[from] SourceError),

    /// Salesforce errors
    #[error("Salesforce error: {0}")]
    Crm(#[from] CrmError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Report rendering errors
    #[error("Report error: {0}")]
    Report(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Source database errors
///
/// Raised by the record store when talking to the learning platform or
/// e-commerce databases. Any of these aborts a run.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to build or reach the connection pool
    #[error("Failed to connect to source '{source_name}': {message}")]
    ConnectionFailed { source_name: String, message: String },

    /// Query failed
    #[error("Query '{query}' failed: {message}")]
    QueryFailed { query: String, message: String },

    /// A row could not be decoded into a record
    #[error("Failed to decode row from '{query}': {message}")]
    DecodeFailed { query: String, message: String },

    /// Organization filter could not be built
    #[error("Invalid organization filter: {0}")]
    InvalidOrgFilter(String),
}

/// Salesforce errors
///
/// Errors that occur when interacting with the Salesforce REST and SOAP APIs.
#[derive(Debug, Error)]
pub enum CrmError {
    /// OAuth token request failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to connect to Salesforce
    #[error("Failed to connect to Salesforce: {0}")]
    ConnectionFailed(String),

    /// SOQL query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Referenced record does not exist
    #[error("{object} not found: {id}")]
    NotFound { object: String, id: String },

    /// Record creation failed
    #[error("Failed to create {object}: {message}")]
    CreateFailed { object: String, message: String },

    /// Record update failed
    #[error("Failed to update {object}: {message}")]
    UpdateFailed { object: String, message: String },

    /// Lead conversion failed
    #[error("Lead conversion failed: {0}")]
    ConversionFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Unexpected response body
    #[error("Invalid response from Salesforce: {0}")]
    InvalidResponse(String),
}

impl CrmError {
    /// Maps a non-success HTTP status and body to a client or server error
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 {
            CrmError::ServerError { status, message }
        } else {
            CrmError::ClientError { status, message }
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for SyncError {
    fn from(err: csv::Error) -> Self {
        SyncError::Report(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_source_error_conversion() {
        let source_err = SourceError::QueryFailed {
            query: "orders_for_orgs".to_string(),
            message: "relation does not exist".to_string(),
        };
        let err: SyncError = source_err.into();
        assert!(matches!(err, SyncError::Source(_)));
        assert!(err.to_string().contains("orders_for_orgs"));
    }

    #[test]
    fn test_crm_error_conversion() {
        let crm_err = CrmError::ConversionFailed("INVALID_STATUS".to_string());
        let err: SyncError = crm_err.into();
        assert!(matches!(err, SyncError::Crm(_)));
    }

    #[test]
    fn test_crm_error_from_status() {
        assert!(matches!(
            CrmError::from_status(503, "unavailable"),
            CrmError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            CrmError::from_status(400, "MALFORMED_QUERY"),
            CrmError::ClientError { status: 400, .. }
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SyncError = io_err.into();
        assert!(matches!(err, SyncError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SyncError = toml_err.into();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_sync_error_implements_std_error() {
        let err = SyncError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
