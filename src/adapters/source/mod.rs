//! Source database adapter
//!
//! Reads orders, coupons, site registrations, profiles, language
//! preferences and registration tracking from the `default` (learning
//! platform) and `ecommerce` databases.

pub mod client;
pub mod memory;
pub mod queries;
pub mod store;

pub use client::SourceClient;
pub use memory::InMemoryRecordStore;
pub use store::{PgRecordStore, RecordStore};
