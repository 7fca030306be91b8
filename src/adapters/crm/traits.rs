//! CRM object store abstraction
//!
//! This module defines the trait the sync orchestrator drives. The
//! Salesforce client implements it against the REST and SOAP APIs and
//! [`super::memory::InMemoryCrm`] implements it in memory for tests.

use super::models::{
    CampaignMember, Contact, GetOrCreate, Lead, OpportunityContactRole, OpportunityKey,
    OpportunityLineItem, PricebookEntry,
};
use crate::domain::{RecordId, Result, Username};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;

/// Objects looked up and created by their `Name` alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedEntity {
    Campaign,
    Product,
    DiscountCode,
}

impl NamedEntity {
    /// Salesforce object API name
    pub fn sobject(self) -> &'static str {
        match self {
            NamedEntity::Campaign => "Campaign",
            NamedEntity::Product => "Product2",
            NamedEntity::DiscountCode => "Discount_Code__c",
        }
    }
}

impl fmt::Display for NamedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sobject())
    }
}

/// CRM object store
///
/// Lookups return `Ok(None)` when nothing matches. Every other failure is
/// an error and fails the user being synchronized.
#[async_trait]
pub trait CrmStore: Send + Sync {
    /// Find the Lead whose `Username__c` equals `username`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or more than one Lead matches.
    async fn find_lead(&self, username: &Username) -> Result<Option<Lead>>;

    /// Create a Lead and return its id
    async fn create_lead(&self, lead: &Lead) -> Result<RecordId>;

    /// Persist all writable fields of a saved Lead
    async fn update_lead(&self, lead: &Lead) -> Result<()>;

    /// Load a Contact, `None` if it was deleted
    async fn find_contact(&self, id: &RecordId) -> Result<Option<Contact>>;

    /// Persist all writable fields of a saved Contact
    async fn update_contact(&self, contact: &Contact) -> Result<()>;

    /// Convert a Lead into an Account and Contact without an Opportunity
    ///
    /// Conversion cannot be undone.
    async fn convert_lead(&self, lead_id: &RecordId) -> Result<()>;

    /// Id of the standard price book
    async fn standard_pricebook(&self) -> Result<RecordId>;

    /// Find a Campaign, Product2 or discount code by name, creating it if absent
    async fn get_or_create_named(&self, entity: NamedEntity, name: &str) -> Result<GetOrCreate>;

    async fn create_campaign_member(&self, member: &CampaignMember) -> Result<RecordId>;

    /// Find an Opportunity matching every field of `key`, creating it if absent
    async fn get_or_create_opportunity(&self, key: &OpportunityKey) -> Result<GetOrCreate>;

    /// Active entry for a product in a price book
    async fn find_active_pricebook_entry(
        &self,
        pricebook_id: &RecordId,
        product_id: &RecordId,
    ) -> Result<Option<PricebookEntry>>;

    async fn create_pricebook_entry(&self, entry: &PricebookEntry) -> Result<RecordId>;

    async fn update_pricebook_entry_price(&self, id: &RecordId, unit_price: Decimal)
        -> Result<()>;

    async fn create_contact_role(&self, role: &OpportunityContactRole) -> Result<RecordId>;

    async fn create_line_item(&self, item: &OpportunityLineItem) -> Result<RecordId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entity_sobjects() {
        assert_eq!(NamedEntity::Campaign.sobject(), "Campaign");
        assert_eq!(NamedEntity::Product.sobject(), "Product2");
        assert_eq!(NamedEntity::DiscountCode.to_string(), "Discount_Code__c");
    }
}
