//! Salesforce synchronization
//!
//! This module provides the per-user sync logic, including:
//! - Field-level change detection for Leads and Contacts
//! - The per-run lookup cache for campaigns and products
//! - Orchestration of lead conversion and opportunity creation
//! - Status tally and reporting

pub mod cache;
pub mod detector;
pub mod orchestrator;
pub mod summary;

pub use cache::LookupCache;
pub use detector::{parse_full_name, update_field, update_person};
pub use orchestrator::{SyncOrchestrator, UserOutcome};
pub use summary::{SyncStatus, SyncSummary, UserFailure};
