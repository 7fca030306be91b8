//! Core business logic for the edX Salesforce sync.
//!
//! # Modules
//!
//! - [`extract`] - Fetches a site's learners from the source databases
//! - [`merge`] - Joins orders, coupons, profiles, languages and tracking per user
//! - [`sync`] - Change detection and the Salesforce sync orchestrator
//! - [`report`] - CSV rendering of merged users
//!
//! # Sync Workflow
//!
//! 1. **Fetch**: Query orders for the orgs and users registered on the site
//! 2. **Merge**: Build one [`MergedUser`](crate::domain::MergedUser) per learner
//! 3. **Sync**: Find or create each Lead, convert it on first purchase and
//!    create one Opportunity per purchased course
//! 4. **Report**: Print a status per user and the final tally
//!
//! # Example
//!
//! ```rust,no_run
//! use edx_salesforce::adapters::crm::SalesforceClient;
//! use edx_salesforce::adapters::source::PgRecordStore;
//! use edx_salesforce::config::load_config;
//! use edx_salesforce::core::extract::fetch_user_data;
//! use edx_salesforce::core::sync::SyncOrchestrator;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("edx-salesforce.toml")?;
//! let orgs = vec!["OrgX".to_string()];
//!
//! let store = PgRecordStore::from_config(&config.sources)?;
//! let users = fetch_user_data(&store, "courses.example.com", &orgs).await?;
//!
//! let crm = Arc::new(SalesforceClient::connect(config.salesforce.clone()).await?);
//! let mut orchestrator = SyncOrchestrator::new(crm).await?;
//! let summary = orchestrator
//!     .run(&users, "courses.example.com", &orgs, &mut std::io::stdout())
//!     .await?;
//!
//! for line in summary.tally_lines() {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod extract;
pub mod merge;
pub mod report;
pub mod sync;
