//! External system integrations.
//!
//! - [`source`] - the learning platform and e-commerce PostgreSQL databases
//! - [`crm`] - the Salesforce object store
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. Both sides sit behind a trait
//! ([`source::RecordStore`], [`crm::CrmStore`]) so the merge pipeline and the
//! sync orchestrator never see a driver type.
//!
//! # Source Adapter
//!
//! ```rust,no_run
//! use edx_salesforce::adapters::source::{PgRecordStore, RecordStore};
//! use edx_salesforce::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("edx-salesforce.toml")?;
//! let store = PgRecordStore::from_config(&config.sources)?;
//! let site_users = store.users_for_site("courses.example.com").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Salesforce Adapter
//!
//! ```rust,no_run
//! use edx_salesforce::adapters::crm::{CrmStore, SalesforceClient};
//! use edx_salesforce::config::load_config;
//! use edx_salesforce::domain::Username;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("edx-salesforce.toml")?;
//! let client = SalesforceClient::connect(config.salesforce).await?;
//! let lead = client.find_lead(&Username::new("alice")?).await?;
//! # Ok(())
//! # }
//! ```

pub mod crm;
pub mod source;
