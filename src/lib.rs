// edX Salesforce Sync - edX user accounts and purchases to Salesforce
// Copyright (c) 2025 edx-salesforce Contributors
// Licensed under the MIT License

//! # edX Salesforce Sync
//!
//! Pulls learner accounts and course purchases for an edX site out of the
//! learning platform and e-commerce PostgreSQL databases and mirrors them
//! into Salesforce as Leads, Contacts and Opportunities.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Extracting** orders, coupons, profiles, language preferences and
//!   registration UTM data from the two source databases
//! - **Merging** them into one record per learner
//! - **Synchronizing** each learner into Salesforce, touching only the fields
//!   that changed
//! - **Reporting** the same records as a CSV file
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (extract, merge, sync, report)
//! - [`adapters`] - External integrations (PostgreSQL sources, Salesforce)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edx_salesforce::adapters::source::PgRecordStore;
//! use edx_salesforce::config::load_config;
//! use edx_salesforce::core::extract::fetch_user_data;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("edx-salesforce.toml")?;
//!     let store = PgRecordStore::from_config(&config.sources)?;
//!
//!     let users = fetch_user_data(&store, "courses.example.com", &["OrgX".to_string()]).await?;
//!     println!("Found {} learners", users.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Change Detection
//!
//! A second run over unchanged data writes nothing. Each Lead or Contact
//! field is compared with its freshly computed value and only differences
//! are sent:
//!
//! ```rust
//! use edx_salesforce::core::sync::update_field;
//!
//! let mut email = Some("old@example.com".to_string());
//! assert!(update_field(&mut email, Some("new@example.com".to_string())));
//! assert!(!update_field(&mut email, Some("new@example.com".to_string())));
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error type is
//! [`domain::SyncError`]. Source and Salesforce failures convert into it with
//! the `?` operator.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
