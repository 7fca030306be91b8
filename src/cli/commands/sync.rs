//! Sync command implementation
//!
//! This module implements the `sync` command, which pushes a site's learners
//! and their course purchases into Salesforce.

use super::{
    exit_code_for, no_users_message, EXIT_INTERRUPTED, EXIT_PARTIAL, EXIT_SUCCESS,
};
use crate::adapters::crm::{CrmStore, SalesforceClient};
use crate::adapters::source::{PgRecordStore, RecordStore};
use crate::config::load_config;
use crate::core::extract::fetch_user_data;
use crate::core::sync::SyncOrchestrator;
use crate::domain::{Result, SyncError};
use crate::log_run_start;
use clap::Args;
use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Domain of the site whose user accounts are synchronized
    #[arg(short, long)]
    pub site_domain: String,

    /// Organizations whose course purchases are synchronized
    #[arg(short, long, num_args = 1.., required = true)]
    pub orgs: Vec<String>,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        log_run_start!("sync", self.site_domain, self.orgs);

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let store = match PgRecordStore::from_config(&config.sources) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create source connection pools");
                eprintln!("Failed to connect to source databases: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let salesforce = config.salesforce.clone();
        let connect_crm = move || async move {
            let client = SalesforceClient::connect(salesforce).await?;
            Ok::<_, SyncError>(Arc::new(client) as Arc<dyn CrmStore>)
        };

        sync_site(
            &store,
            &self.site_domain,
            &self.orgs,
            connect_crm,
            Some(shutdown_signal),
            &mut io::stdout(),
        )
        .await
    }
}

/// Fetches the site's users and synchronizes them
///
/// `connect_crm` is only invoked once there is at least one user, so a run
/// with nothing to do never touches Salesforce.
pub async fn sync_site<F, Fut, W>(
    store: &dyn RecordStore,
    site_domain: &str,
    orgs: &[String],
    connect_crm: F,
    shutdown_signal: Option<watch::Receiver<bool>>,
    out: &mut W,
) -> anyhow::Result<i32>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<dyn CrmStore>>>,
    W: Write,
{
    let users = match fetch_user_data(store, site_domain, orgs).await {
        Ok(u) => u,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch user data");
            eprintln!("Failed to fetch user data: {e}");
            return Ok(exit_code_for(&e));
        }
    };

    if users.is_empty() {
        writeln!(out, "{}", no_users_message(site_domain, orgs))?;
        return Ok(EXIT_SUCCESS);
    }

    let crm = match connect_crm().await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Salesforce");
            eprintln!("Failed to connect to Salesforce: {e}");
            return Ok(exit_code_for(&e));
        }
    };

    let mut orchestrator = match SyncOrchestrator::new(crm).await {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize sync");
            eprintln!("Failed to initialize sync: {e}");
            return Ok(exit_code_for(&e));
        }
    };
    if let Some(shutdown_signal) = shutdown_signal {
        orchestrator = orchestrator.with_shutdown(shutdown_signal);
    }

    let summary = orchestrator.run(&users, site_domain, orgs, out).await?;

    for line in summary.tally_lines() {
        writeln!(out, "{line}")?;
    }
    summary.log_summary();

    let exit_code = if summary.interrupted {
        writeln!(out, "Sync interrupted; re-run the same command to continue.")?;
        EXIT_INTERRUPTED
    } else if summary.is_successful() {
        EXIT_SUCCESS
    } else {
        EXIT_PARTIAL
    };

    Ok(exit_code)
}
