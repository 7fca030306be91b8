//! Report command implementation
//!
//! This module implements the `report` command, which writes a site's
//! learners to a CSV file instead of Salesforce.

use super::{exit_code_for, no_users_message, plural, EXIT_SUCCESS};
use crate::adapters::source::{PgRecordStore, RecordStore};
use crate::config::load_config;
use crate::core::extract::fetch_user_data;
use crate::core::report::write_report;
use crate::log_run_start;
use clap::Args;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Domain of the site whose user accounts are reported
    #[arg(short, long)]
    pub site_domain: String,

    /// Organizations whose course purchases are reported
    #[arg(short, long, num_args = 1.., required = true)]
    pub orgs: Vec<String>,

    /// Override the configured report directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl ReportArgs {
    /// Execute the report command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        log_run_start!("report", self.site_domain, self.orgs);

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.report.output_dir));

        let store = match PgRecordStore::from_config(&config.sources) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create source connection pools");
                eprintln!("Failed to connect to source databases: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        report_site(
            &store,
            &self.site_domain,
            &self.orgs,
            &output_dir,
            &mut io::stdout(),
        )
        .await
    }
}

/// Fetches the site's users and writes them to a report in `output_dir`
///
/// Nothing is written, and `output_dir` is not created, when no user matches.
pub async fn report_site<W: Write>(
    store: &dyn RecordStore,
    site_domain: &str,
    orgs: &[String],
    output_dir: &Path,
    out: &mut W,
) -> anyhow::Result<i32> {
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

    let joined_orgs = orgs.join(",");
    writeln!(
        out,
        "Running user account report for {} user account{} for site {} and org{} {}...",
        users.len(),
        plural(users.len()),
        site_domain,
        plural(orgs.len()),
        joined_orgs
    )?;

    let path = match write_report(&users, site_domain, output_dir) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Failed to write report");
            eprintln!("Failed to write report: {e}");
            return Ok(exit_code_for(&e));
        }
    };

    writeln!(
        out,
        "Finished running user account report for {} user{} for site {} and org{} {}.",
        users.len(),
        plural(users.len()),
        site_domain,
        plural(orgs.len()),
        joined_orgs
    )?;
    writeln!(out, "Report written to {}", path.display())?;

    Ok(EXIT_SUCCESS)
}
