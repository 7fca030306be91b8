//! Sync orchestrator - drives each user's records into the CRM
//!
//! Per user the orchestrator:
//! 1. Finds or creates the Lead, or the converted Contact, and updates
//!    changed person fields
//! 2. Converts the Lead on the user's first purchase
//! 3. Creates one Opportunity per purchase, with its product, price book
//!    entry, contact role and line item
//!
//! A failure only fails the user it happened on; the run continues.

use super::cache::LookupCache;
use super::detector::update_person;
use super::summary::{SyncStatus, SyncSummary};
use crate::adapters::crm::{
    CampaignMember, CrmStore, Lead, NamedEntity, OpportunityContactRole, OpportunityKey,
    OpportunityLineItem, PricebookEntry, STAGE_PAID,
};
use crate::domain::{CrmError, MergedOrder, MergedUser, RecordId, Result, UtmParam, Username};
use crate::log_user_failure;
use rust_decimal::Decimal;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

const CONTACT_ROLE_PARTICIPANT: &str = "Participant";

/// Outcome of one user's sync that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOutcome {
    Completed(SyncStatus),
    /// The converted Contact was deleted; the user is left alone
    Skipped,
}

/// Sync orchestrator
///
/// Owns the lookup cache and the standard price book id for one run.
pub struct SyncOrchestrator {
    crm: Arc<dyn CrmStore>,
    pricebook_id: RecordId,
    cache: LookupCache,
    shutdown: Option<watch::Receiver<bool>>,
}

impl SyncOrchestrator {
    /// Create a new orchestrator, resolving the standard price book
    ///
    /// # Errors
    ///
    /// Returns an error if the org has no standard price book.
    pub async fn new(crm: Arc<dyn CrmStore>) -> Result<Self> {
        let pricebook_id = crm.standard_pricebook().await?;
        tracing::debug!(pricebook_id = %pricebook_id, "Resolved standard price book");

        Ok(Self {
            crm,
            pricebook_id,
            cache: LookupCache::new(),
            shutdown: None,
        })
    }

    /// Stop between users once `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }

    /// Synchronize every user, writing progress lines to `out`
    ///
    /// # Errors
    ///
    /// Only failures to write to `out` are returned. Per-user errors are
    /// logged and counted as [`SyncStatus::Failed`].
    pub async fn run<W: Write>(
        &mut self,
        users: &[MergedUser],
        site_domain: &str,
        orgs: &[String],
        out: &mut W,
    ) -> Result<SyncSummary> {
        let start_time = Instant::now();
        let mut summary = SyncSummary::new(users.len());
        let scope = RunScope::new(users.len(), orgs);

        writeln!(
            out,
            "Synchronizing {} user account{} for site {} and org{} {}...",
            users.len(),
            scope.users_suffix,
            site_domain,
            scope.orgs_suffix,
            scope.orgs
        )?;

        for user in users {
            if self.shutdown_requested() {
                tracing::warn!(
                    processed = summary.processed(),
                    remaining = users.len() - summary.processed(),
                    "Shutdown requested, stopping sync"
                );
                summary.interrupted = true;
                break;
            }

            match self.sync_user(user).await {
                Ok(UserOutcome::Completed(status)) => {
                    summary.record(status);
                    writeln!(out, "{}: {}", user.username, status)?;
                }
                Ok(UserOutcome::Skipped) => {
                    summary.record_skip();
                    tracing::warn!(username = %user.username, "Converted contact missing, skipping user");
                    writeln!(
                        out,
                        "{}: Converted Contact object manually deleted in Salesforce. \
                         This user will no longer be synchronized.",
                        user.username
                    )?;
                }
                Err(e) => {
                    log_user_failure!(user.username, e);
                    summary.record_failure(&user.username, e.to_string());
                    writeln!(out, "{}: {}", user.username, SyncStatus::Failed)?;
                }
            }
        }

        writeln!(
            out,
            "Finished processing {} user{} for site {} and org{} {}.",
            users.len(),
            scope.users_suffix,
            site_domain,
            scope.orgs_suffix,
            scope.orgs
        )?;

        Ok(summary.with_duration(start_time.elapsed()))
    }

    /// Synchronize one user
    pub async fn sync_user(&mut self, user: &MergedUser) -> Result<UserOutcome> {
        let mut changed = false;

        let mut lead = match self.crm.find_lead(&user.username).await? {
            None => {
                changed = true;
                self.create_lead(user).await?
            }
            Some(lead) if lead.is_converted => {
                let contact = match &lead.converted_contact_id {
                    Some(id) => self.crm.find_contact(id).await?,
                    None => None,
                };
                let Some(mut contact) = contact else {
                    return Ok(UserOutcome::Skipped);
                };
                if update_person(&mut contact.person, user) {
                    self.crm.update_contact(&contact).await?;
                    changed = true;
                }
                lead
            }
            Some(mut lead) => {
                if update_person(&mut lead.person, user) {
                    self.crm.update_lead(&lead).await?;
                    changed = true;
                }
                lead
            }
        };

        if !user.courses.is_empty() {
            if !lead.is_converted {
                lead = self.convert_lead(&lead, &user.username).await?;
                changed = true;
            }
            for course in &user.courses {
                if self.sync_opportunity(&lead, course).await? {
                    changed = true;
                }
            }
        }

        let status = if changed {
            SyncStatus::Synchronized
        } else {
            SyncStatus::InSync
        };
        tracing::debug!(username = %user.username, status = %status, "User processed");
        Ok(UserOutcome::Completed(status))
    }

    /// Create a Lead, attaching it to its registration campaign if any
    async fn create_lead(&mut self, user: &MergedUser) -> Result<Lead> {
        let mut lead = Lead::new(user.username.as_str());
        update_person(&mut lead.person, user);

        let lead_id = self.crm.create_lead(&lead).await?;
        tracing::info!(username = %user.username, lead_id = %lead_id, "Created lead");
        lead.id = Some(lead_id.clone());

        if let Some(campaign) = user.utm(UtmParam::Campaign).filter(|c| !c.is_empty()) {
            let campaign_id = self
                .get_or_create_cached(NamedEntity::Campaign, campaign)
                .await?;
            self.crm
                .create_campaign_member(&CampaignMember {
                    campaign_id,
                    lead_id,
                })
                .await?;

            for param in UtmParam::ALL {
                *lead.utm.slot_mut(param) = user.utm(param).map(str::to_string);
            }
            self.crm.update_lead(&lead).await?;
        }

        Ok(lead)
    }

    /// Convert a Lead and copy the fields conversion does not carry over
    ///
    /// Returns the Lead as re-read after conversion.
    async fn convert_lead(&mut self, lead: &Lead, username: &Username) -> Result<Lead> {
        let lead_id = lead
            .id
            .as_ref()
            .ok_or_else(|| CrmError::InvalidResponse(format!("lead for '{username}' has no id")))?;
        self.crm.convert_lead(lead_id).await?;

        let converted = self
            .crm
            .find_lead(username)
            .await?
            .ok_or_else(|| CrmError::NotFound {
                object: "Lead".to_string(),
                id: lead_id.to_string(),
            })?;
        let contact_id = converted.converted_contact_id.as_ref().ok_or_else(|| {
            CrmError::ConversionFailed(format!("lead {lead_id} has no converted contact"))
        })?;
        let mut contact =
            self.crm
                .find_contact(contact_id)
                .await?
                .ok_or_else(|| CrmError::NotFound {
                    object: "Contact".to_string(),
                    id: contact_id.to_string(),
                })?;

        contact.person.language = converted.person.language.clone();
        contact.person.country = converted.person.country.clone();
        contact.person.year_of_birth = converted.person.year_of_birth.clone();
        contact.utm = converted.utm.clone();
        self.crm.update_contact(&contact).await?;

        tracing::info!(username = %username, contact_id = %contact_id, "Converted lead to contact");
        Ok(converted)
    }

    /// Ensure an Opportunity exists for a purchase
    ///
    /// Returns `true` if the Opportunity was created by this call.
    async fn sync_opportunity(&mut self, lead: &Lead, course: &MergedOrder) -> Result<bool> {
        let account_id = lead.converted_account_id.clone().ok_or_else(|| {
            CrmError::InvalidResponse(format!("lead '{}' has no converted account", lead.username))
        })?;
        let contact_id = lead.converted_contact_id.clone().ok_or_else(|| {
            CrmError::InvalidResponse(format!("lead '{}' has no converted contact", lead.username))
        })?;

        let paid_date = course.purchase_date.date_naive();
        let total_price = course.total_price();
        let key = OpportunityKey {
            account_id,
            name: course.course_id.clone(),
            amount: total_price,
            close_date: paid_date,
            paid_date,
            stage_name: STAGE_PAID.to_string(),
        };

        let opportunity = self.crm.get_or_create_opportunity(&key).await?;
        if !opportunity.created {
            return Ok(false);
        }
        tracing::info!(
            username = %lead.username,
            course_id = %course.course_id,
            amount = %total_price,
            "Created opportunity"
        );

        let discount_code_id = match course.primary_coupon() {
            Some(code) => Some(
                self.crm
                    .get_or_create_named(NamedEntity::DiscountCode, code)
                    .await?
                    .id,
            ),
            None => None,
        };

        let product_id = self
            .get_or_create_cached(NamedEntity::Product, &course.course_id)
            .await?;
        let pricebook_entry_id = self
            .get_or_raise_pricebook_entry(&product_id, course.list_price)
            .await?;

        self.crm
            .create_contact_role(&OpportunityContactRole {
                opportunity_id: opportunity.id.clone(),
                contact_id,
                role: CONTACT_ROLE_PARTICIPANT.to_string(),
                is_primary: true,
            })
            .await?;

        self.crm
            .create_line_item(&OpportunityLineItem {
                opportunity_id: opportunity.id,
                pricebook_entry_id,
                quantity: Decimal::from(course.quantity),
                total_price,
                discount_code_id,
                list_price: course.list_price,
            })
            .await?;

        Ok(true)
    }

    /// Get-or-create through the per-run cache
    async fn get_or_create_cached(&mut self, entity: NamedEntity, name: &str) -> Result<RecordId> {
        if let Some(id) = self.cache.get(entity, &[name]) {
            return Ok(id.clone());
        }

        let result = self.crm.get_or_create_named(entity, name).await?;
        if result.created {
            tracing::info!(entity = %entity, name, id = %result.id, "Created record");
        }
        self.cache.insert(entity, &[name], result.id.clone());
        Ok(result.id)
    }

    /// Active price book entry for a product, raised to at least `list_price`
    async fn get_or_raise_pricebook_entry(
        &mut self,
        product_id: &RecordId,
        list_price: Decimal,
    ) -> Result<RecordId> {
        match self
            .crm
            .find_active_pricebook_entry(&self.pricebook_id, product_id)
            .await?
        {
            Some(entry) => {
                let id = entry.id.ok_or_else(|| {
                    CrmError::InvalidResponse("price book entry has no id".to_string())
                })?;
                // Course prices change over time; keep the highest one seen
                if entry.unit_price < list_price {
                    self.crm.update_pricebook_entry_price(&id, list_price).await?;
                    tracing::info!(
                        pricebook_entry_id = %id,
                        from = %entry.unit_price,
                        to = %list_price,
                        "Raised price book entry"
                    );
                }
                Ok(id)
            }
            None => {
                self.crm
                    .create_pricebook_entry(&PricebookEntry {
                        id: None,
                        pricebook_id: self.pricebook_id.clone(),
                        product_id: product_id.clone(),
                        unit_price: list_price,
                        is_active: true,
                    })
                    .await
            }
        }
    }
}

/// Pluralized fragments of the progress messages
struct RunScope {
    users_suffix: &'static str,
    orgs_suffix: &'static str,
    orgs: String,
}

impl RunScope {
    fn new(user_count: usize, orgs: &[String]) -> Self {
        Self {
            users_suffix: if user_count == 1 { "" } else { "s" },
            orgs_suffix: if orgs.len() == 1 { "" } else { "s" },
            orgs: orgs.join(","),
        }
    }
}
