//! In-memory CRM object store
//!
//! Models the parts of Salesforce the sync relies on: generated ids,
//! lead conversion producing an Account and Contact, and lookups by
//! field value. Every call is counted so tests can assert on traffic.

use super::models::{
    CampaignMember, Contact, GetOrCreate, Lead, OpportunityContactRole, OpportunityKey,
    OpportunityLineItem, PricebookEntry, UtmFields,
};
use super::traits::{CrmStore, NamedEntity};
use crate::domain::{CrmError, RecordId, Result, SyncError, Username};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Per-operation call counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub queries: usize,
    pub creates: usize,
    pub updates: usize,
    pub conversions: usize,
}

impl CallCounts {
    /// Calls that changed CRM state
    pub fn writes(&self) -> usize {
        self.creates + self.updates + self.conversions
    }

    pub fn total(&self) -> usize {
        self.queries + self.writes()
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    calls: CallCounts,
    pricebook_id: Option<RecordId>,
    leads: BTreeMap<RecordId, Lead>,
    contacts: BTreeMap<RecordId, Contact>,
    accounts: BTreeMap<RecordId, String>,
    named: BTreeMap<(NamedEntity, String), RecordId>,
    campaign_members: Vec<CampaignMember>,
    opportunities: Vec<(RecordId, OpportunityKey)>,
    pricebook_entries: Vec<PricebookEntry>,
    contact_roles: Vec<OpportunityContactRole>,
    line_items: Vec<OpportunityLineItem>,
}

impl State {
    fn new_id(&mut self, prefix: &str) -> RecordId {
        self.next_id += 1;
        RecordId::new(format!("{prefix}{:015}", self.next_id))
            .unwrap_or_else(|_| unreachable!("generated ids are never blank"))
    }
}

/// [`CrmStore`] held in memory
///
/// Lead conversion copies the standard person fields plus the custom
/// education, interest, gender and registration date fields to the new
/// Contact, the way a typical org's lead field mapping does. Language,
/// country, year of birth and UTM fields are left for the caller to copy.
#[derive(Debug)]
pub struct InMemoryCrm {
    state: Mutex<State>,
}

impl Default for InMemoryCrm {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCrm {
    /// An empty org with a standard price book
    pub fn new() -> Self {
        let mut state = State::default();
        let pricebook = state.new_id("01s");
        state.pricebook_id = Some(pricebook);
        Self {
            state: Mutex::new(state),
        }
    }

    /// An org without a standard price book
    pub fn without_pricebook() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| SyncError::Other("in-memory CRM state poisoned".to_string()))
    }

    fn snapshot<T>(&self, read: impl FnOnce(&State) -> T) -> T {
        match self.state.lock() {
            Ok(state) => read(&*state),
            Err(poisoned) => read(&*poisoned.into_inner()),
        }
    }

    pub fn calls(&self) -> CallCounts {
        self.snapshot(|s| s.calls)
    }

    pub fn reset_calls(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.calls = CallCounts::default();
        }
    }

    pub fn pricebook_id(&self) -> Option<RecordId> {
        self.snapshot(|s| s.pricebook_id.clone())
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.snapshot(|s| s.leads.values().cloned().collect())
    }

    pub fn lead_by_username(&self, username: &str) -> Option<Lead> {
        self.snapshot(|s| s.leads.values().find(|l| l.username == username).cloned())
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.snapshot(|s| s.contacts.values().cloned().collect())
    }

    pub fn account_count(&self) -> usize {
        self.snapshot(|s| s.accounts.len())
    }

    /// Names of every Campaign, Product2 or discount code of one kind
    pub fn named(&self, entity: NamedEntity) -> Vec<String> {
        self.snapshot(|s| {
            s.named
                .keys()
                .filter(|(kind, _)| *kind == entity)
                .map(|(_, name)| name.clone())
                .collect()
        })
    }

    pub fn named_id(&self, entity: NamedEntity, name: &str) -> Option<RecordId> {
        self.snapshot(|s| s.named.get(&(entity, name.to_string())).cloned())
    }

    pub fn campaign_members(&self) -> Vec<CampaignMember> {
        self.snapshot(|s| s.campaign_members.clone())
    }

    pub fn opportunities(&self) -> Vec<OpportunityKey> {
        self.snapshot(|s| s.opportunities.iter().map(|(_, k)| k.clone()).collect())
    }

    pub fn pricebook_entries(&self) -> Vec<PricebookEntry> {
        self.snapshot(|s| s.pricebook_entries.clone())
    }

    pub fn contact_roles(&self) -> Vec<OpportunityContactRole> {
        self.snapshot(|s| s.contact_roles.clone())
    }

    pub fn line_items(&self) -> Vec<OpportunityLineItem> {
        self.snapshot(|s| s.line_items.clone())
    }

    /// Removes a Contact, as when someone deletes it by hand in Salesforce
    pub fn delete_contact(&self, id: &RecordId) {
        if let Ok(mut state) = self.state.lock() {
            state.contacts.remove(id);
        }
    }

    /// Seeds a named record without counting a call
    pub fn insert_named(&self, entity: NamedEntity, name: &str) -> RecordId {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = state.new_id("a0N");
        state.named.insert((entity, name.to_string()), id.clone());
        id
    }

    /// Seeds a price book entry without counting a call
    pub fn insert_pricebook_entry(&self, entry: PricebookEntry) -> RecordId {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = state.new_id("01u");
        state.pricebook_entries.push(PricebookEntry {
            id: Some(id.clone()),
            ..entry
        });
        id
    }
}

fn missing_id(object: &str) -> SyncError {
    CrmError::UpdateFailed {
        object: object.to_string(),
        message: "record has no id".to_string(),
    }
    .into()
}

#[async_trait]
impl CrmStore for InMemoryCrm {
    async fn find_lead(&self, username: &Username) -> Result<Option<Lead>> {
        let mut state = self.lock()?;
        state.calls.queries += 1;
        let mut matches = state
            .leads
            .values()
            .filter(|lead| lead.username == username.as_str());
        let lead = matches.next().cloned();
        if matches.next().is_some() {
            return Err(CrmError::QueryFailed(format!(
                "more than one Lead has username '{username}'"
            ))
            .into());
        }
        Ok(lead)
    }

    async fn create_lead(&self, lead: &Lead) -> Result<RecordId> {
        let mut state = self.lock()?;
        state.calls.creates += 1;
        let id = state.new_id("00Q");
        let stored = Lead {
            id: Some(id.clone()),
            is_converted: false,
            converted_account_id: None,
            converted_contact_id: None,
            ..lead.clone()
        };
        state.leads.insert(id.clone(), stored);
        Ok(id)
    }

    async fn update_lead(&self, lead: &Lead) -> Result<()> {
        let mut state = self.lock()?;
        state.calls.updates += 1;
        let id = lead.id.as_ref().ok_or_else(|| missing_id("Lead"))?;
        let stored = state.leads.get_mut(id).ok_or_else(|| CrmError::NotFound {
            object: "Lead".to_string(),
            id: id.to_string(),
        })?;
        stored.username = lead.username.clone();
        stored.company = lead.company.clone();
        stored.person = lead.person.clone();
        stored.utm = lead.utm.clone();
        Ok(())
    }

    async fn find_contact(&self, id: &RecordId) -> Result<Option<Contact>> {
        let mut state = self.lock()?;
        state.calls.queries += 1;
        Ok(state.contacts.get(id).cloned())
    }

    async fn update_contact(&self, contact: &Contact) -> Result<()> {
        let mut state = self.lock()?;
        state.calls.updates += 1;
        let id = contact.id.as_ref().ok_or_else(|| missing_id("Contact"))?;
        let stored = state.contacts.get_mut(id).ok_or_else(|| CrmError::NotFound {
            object: "Contact".to_string(),
            id: id.to_string(),
        })?;
        stored.person = contact.person.clone();
        stored.utm = contact.utm.clone();
        Ok(())
    }

    async fn convert_lead(&self, lead_id: &RecordId) -> Result<()> {
        let mut state = self.lock()?;
        state.calls.conversions += 1;

        let lead = state
            .leads
            .get(lead_id)
            .cloned()
            .ok_or_else(|| CrmError::ConversionFailed(format!("lead {lead_id} not found")))?;
        if lead.is_converted {
            return Err(
                CrmError::ConversionFailed(format!("lead {lead_id} is already converted")).into(),
            );
        }

        let account_id = state.new_id("001");
        state.accounts.insert(account_id.clone(), lead.company.clone());

        let mut person = lead.person.clone();
        person.language = None;
        person.country = None;
        person.year_of_birth = None;
        let contact_id = state.new_id("003");
        state.contacts.insert(
            contact_id.clone(),
            Contact {
                id: Some(contact_id.clone()),
                account_id: Some(account_id.clone()),
                person,
                utm: UtmFields::default(),
            },
        );

        if let Some(stored) = state.leads.get_mut(lead_id) {
            stored.is_converted = true;
            stored.converted_account_id = Some(account_id);
            stored.converted_contact_id = Some(contact_id);
        }
        Ok(())
    }

    async fn standard_pricebook(&self) -> Result<RecordId> {
        let mut state = self.lock()?;
        state.calls.queries += 1;
        state.pricebook_id.clone().ok_or_else(|| {
            CrmError::NotFound {
                object: "Pricebook2".to_string(),
                id: "standard".to_string(),
            }
            .into()
        })
    }

    async fn get_or_create_named(&self, entity: NamedEntity, name: &str) -> Result<GetOrCreate> {
        let mut state = self.lock()?;
        state.calls.queries += 1;
        let key = (entity, name.to_string());
        if let Some(id) = state.named.get(&key) {
            return Ok(GetOrCreate {
                id: id.clone(),
                created: false,
            });
        }

        state.calls.creates += 1;
        let id = state.new_id("a0N");
        state.named.insert(key, id.clone());
        Ok(GetOrCreate { id, created: true })
    }

    async fn create_campaign_member(&self, member: &CampaignMember) -> Result<RecordId> {
        let mut state = self.lock()?;
        state.calls.creates += 1;
        state.campaign_members.push(member.clone());
        Ok(state.new_id("00v"))
    }

    async fn get_or_create_opportunity(&self, key: &OpportunityKey) -> Result<GetOrCreate> {
        let mut state = self.lock()?;
        state.calls.queries += 1;
        if let Some((id, _)) = state.opportunities.iter().find(|(_, k)| k == key) {
            return Ok(GetOrCreate {
                id: id.clone(),
                created: false,
            });
        }

        state.calls.creates += 1;
        let id = state.new_id("006");
        state.opportunities.push((id.clone(), key.clone()));
        Ok(GetOrCreate { id, created: true })
    }

    async fn find_active_pricebook_entry(
        &self,
        pricebook_id: &RecordId,
        product_id: &RecordId,
    ) -> Result<Option<PricebookEntry>> {
        let mut state = self.lock()?;
        state.calls.queries += 1;
        Ok(state
            .pricebook_entries
            .iter()
            .find(|e| &e.pricebook_id == pricebook_id && &e.product_id == product_id && e.is_active)
            .cloned())
    }

    async fn create_pricebook_entry(&self, entry: &PricebookEntry) -> Result<RecordId> {
        let mut state = self.lock()?;
        state.calls.creates += 1;
        let id = state.new_id("01u");
        state.pricebook_entries.push(PricebookEntry {
            id: Some(id.clone()),
            ..entry.clone()
        });
        Ok(id)
    }

    async fn update_pricebook_entry_price(
        &self,
        id: &RecordId,
        unit_price: Decimal,
    ) -> Result<()> {
        let mut state = self.lock()?;
        state.calls.updates += 1;
        let entry = state
            .pricebook_entries
            .iter_mut()
            .find(|e| e.id.as_ref() == Some(id))
            .ok_or_else(|| CrmError::NotFound {
                object: "PricebookEntry".to_string(),
                id: id.to_string(),
            })?;
        entry.unit_price = unit_price;
        Ok(())
    }

    async fn create_contact_role(&self, role: &OpportunityContactRole) -> Result<RecordId> {
        let mut state = self.lock()?;
        state.calls.creates += 1;
        state.contact_roles.push(role.clone());
        Ok(state.new_id("00K"))
    }

    async fn create_line_item(&self, item: &OpportunityLineItem) -> Result<RecordId> {
        let mut state = self.lock()?;
        state.calls.creates += 1;
        state.line_items.push(item.clone());
        Ok(state.new_id("00k"))
    }
}
