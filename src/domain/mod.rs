//! Domain models and types.
//!
//! This module contains the core domain types shared by the source adapter,
//! the merge pipeline, the Salesforce sync and the report renderer.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RecordId`], [`Username`])
//! - **Source records** ([`RawOrder`], [`RawCoupon`], [`RawUserProfile`], ...)
//! - **Merged records** ([`MergedOrder`], [`MergedUser`])
//! - **Display-name lookups** ([`choices`])
//! - **Error types** ([`SyncError`], [`SourceError`], [`CrmError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Salesforce ids and edX usernames are distinct newtypes:
//!
//! ```rust
//! use edx_salesforce::domain::{RecordId, Username};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let lead_id = RecordId::new("00Q5e00000AbCdEEAV")?;
//! let username = Username::new("alice")?;
//!
//! // This won't compile:
//! // let wrong: RecordId = username;
//! # Ok(())
//! # }
//! ```

pub mod choices;
pub mod errors;
pub mod ids;
pub mod records;
pub mod result;

pub use errors::{CrmError, SourceError, SyncError};
pub use ids::{RecordId, Username};
pub use records::{
    MergedOrder, MergedUser, RawCoupon, RawLanguagePreference, RawOrder, RawTrackingAttribute,
    RawUserProfile, TrackingData, UtmParam,
};
pub use result::Result;
