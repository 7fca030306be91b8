//! Pooled PostgreSQL client for one source database

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{Result, SourceError, SyncError};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

/// Read-only client for a named source (`default` or `ecommerce`)
///
/// Connections come from a deadpool pool. Every query runs under the
/// configured `statement_timeout`.
pub struct SourceClient {
    name: String,
    pool: Pool,
    config: PostgreSQLConfig,
}

impl SourceClient {
    /// Create a new client
    ///
    /// The pool is built lazily, so this does not open a connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed or the TLS
    /// connector cannot be built.
    pub fn new(name: impl Into<String>, config: PostgreSQLConfig) -> Result<Self> {
        let name = name.into();

        let mut pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .parse()
            .map_err(|e| {
                SyncError::Configuration(format!(
                    "Invalid PostgreSQL connection string for source '{name}': {e}"
                ))
            })?;
        pg_config.ssl_mode(match config.ssl_mode.as_str() {
            "disable" => SslMode::Disable,
            "allow" | "prefer" => SslMode::Prefer,
            _ => SslMode::Require,
        });

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = if config.uses_tls() {
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(!config.ssl_mode.starts_with("verify-"))
                .danger_accept_invalid_hostnames(config.ssl_mode != "verify-full")
                .build()
                .map_err(|e| {
                    SyncError::Configuration(format!(
                        "Failed to build TLS connector for source '{name}': {e}"
                    ))
                })?;
            Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
        } else {
            Manager::from_config(pg_config, NoTls, manager_config)
        };

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| SourceError::ConnectionFailed {
                source_name: name.clone(),
                message: format!("Failed to create connection pool: {e}"),
            })?;

        Ok(Self { name, pool, config })
    }

    /// Source name used in logs and errors
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a connection from the pool
    async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            SourceError::ConnectionFailed {
                source_name: self.name.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Runs `SELECT 1` against the source
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| SourceError::ConnectionFailed {
                source_name: self.name.clone(),
                message: format!("Connection test failed: {e}"),
            })?;

        tracing::info!(source = %self.name, "Source connection test successful");
        Ok(())
    }

    /// Execute a query and return rows
    ///
    /// `label` names the query in logs and errors.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the query fails.
    pub async fn query(
        &self,
        label: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client
            .execute(timeout_query.as_str(), &[])
            .await
            .map_err(|e| SourceError::QueryFailed {
                query: label.to_string(),
                message: format!("Failed to set statement timeout: {e}"),
            })?;

        let rows = client
            .query(sql, params)
            .await
            .map_err(|e| SourceError::QueryFailed {
                query: label.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(source = %self.name, query = label, rows = rows.len(), "Query complete");
        Ok(rows)
    }

    /// Connection target with credentials removed
    pub fn connection_string_safe(&self) -> String {
        format!(
            "postgresql://***@{}",
            self.config.connection_string.expose_secret().redacted_host()
        )
    }
}
