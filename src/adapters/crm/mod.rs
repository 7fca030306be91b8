//! CRM object store
//!
//! - [`traits`] - the [`CrmStore`] trait driven by the sync orchestrator
//! - [`models`] - Salesforce object shapes
//! - [`salesforce`] - REST/SOAP implementation
//! - [`memory`] - in-memory implementation used by tests

pub mod memory;
pub mod models;
pub mod salesforce;
pub mod traits;

pub use memory::{CallCounts, InMemoryCrm};
pub use models::{
    CampaignMember, Contact, GetOrCreate, Lead, OpportunityContactRole, OpportunityKey,
    OpportunityLineItem, PersonFields, PricebookEntry, UtmFields, DEFAULT_PROGRAM, STAGE_PAID,
};
pub use salesforce::SalesforceClient;
pub use traits::{CrmStore, NamedEntity};
