//! Salesforce implementation of [`CrmStore`]
//!
//! Authenticates with the OAuth 2.0 username-password flow, reads through
//! SOQL, writes through the sObject REST resources and converts leads
//! through the SOAP partner API, which has no REST equivalent.

use super::models::{
    CampaignMember, Contact, GetOrCreate, Lead, OpportunityContactRole, OpportunityKey,
    OpportunityLineItem, PersonFields, PricebookEntry, UtmFields,
};
use super::traits::{CrmStore, NamedEntity};
use crate::config::{secret_string, SalesforceConfig, SecretString};
use crate::domain::{CrmError, RecordId, Result, Username};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use zeroize::Zeroizing;

/// Authenticated Salesforce API client
pub struct SalesforceClient {
    http: Client,
    access_token: SecretString,
    instance_url: String,
    config: SalesforceConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

#[derive(Deserialize)]
struct QueryResponse<T> {
    records: Vec<T>,
}

#[derive(Deserialize)]
struct CreateResponse {
    id: RecordId,
}

#[derive(Deserialize)]
struct IdOnly {
    #[serde(rename = "Id")]
    id: RecordId,
}

impl SalesforceClient {
    /// Build the HTTP client and obtain an access token
    ///
    /// # Errors
    ///
    /// Returns an error if Salesforce cannot be reached or rejects the
    /// credentials.
    pub async fn connect(config: SalesforceConfig) -> Result<Self> {
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CrmError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        let token = Self::authenticate(&http, &config).await?;
        tracing::info!(instance_url = %token.instance_url, "Authenticated with Salesforce");

        Ok(Self {
            http,
            access_token: secret_string(token.access_token),
            instance_url: token.instance_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    async fn authenticate(http: &Client, config: &SalesforceConfig) -> Result<TokenResponse> {
        let url = format!(
            "{}/services/oauth2/token",
            config.login_url.trim_end_matches('/')
        );

        // The password grant expects the security token appended to the password
        let mut password = Zeroizing::new(config.password.expose_secret().as_ref().to_string());
        if let Some(token) = &config.security_token {
            password.push_str(token.expose_secret().as_ref());
        }

        let params = [
            ("grant_type", "password"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose_secret().as_ref()),
            ("username", config.username.as_str()),
            ("password", password.as_str()),
        ];

        tracing::debug!(url = %url, username = %config.username, "Requesting access token");
        let resp = http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| CrmError::ConnectionFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CrmError::AuthenticationFailed(format!("{status}: {body}")).into());
        }

        Ok(resp
            .json::<TokenResponse>()
            .await
            .map_err(|e| CrmError::InvalidResponse(format!("token response: {e}")))?)
    }

    /// Instance the session is bound to
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn data_url(&self, path: &str) -> String {
        format!(
            "{}/services/data/v{}{}",
            self.instance_url, self.config.api_version, path
        )
    }

    fn token(&self) -> &str {
        self.access_token.expose_secret().as_ref()
    }

    /// Run a SOQL query and decode every record
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<Vec<T>> {
        tracing::debug!(soql = %soql, "Running SOQL query");
        let resp = self
            .http
            .get(self.data_url("/query"))
            .bearer_auth(self.token())
            .query(&[("q", soql)])
            .send()
            .await
            .map_err(|e| CrmError::ConnectionFailed(e.to_string()))?;

        let resp = success_or(resp, |status, body| {
            if status.is_server_error() {
                CrmError::from_status(status.as_u16(), body)
            } else {
                CrmError::QueryFailed(format!("{status}: {body}"))
            }
        })
        .await?;

        let page: QueryResponse<T> = resp
            .json()
            .await
            .map_err(|e| CrmError::InvalidResponse(format!("query response: {e}")))?;
        Ok(page.records)
    }

    async fn create<T: Serialize + ?Sized + Sync>(&self, sobject: &str, record: &T) -> Result<RecordId> {
        let resp = self
            .http
            .post(self.data_url(&format!("/sobjects/{sobject}")))
            .bearer_auth(self.token())
            .json(record)
            .send()
            .await
            .map_err(|e| CrmError::ConnectionFailed(e.to_string()))?;

        let resp = success_or(resp, |status, body| CrmError::CreateFailed {
            object: sobject.to_string(),
            message: format!("{status}: {body}"),
        })
        .await?;

        let created: CreateResponse = resp
            .json()
            .await
            .map_err(|e| CrmError::InvalidResponse(format!("create {sobject} response: {e}")))?;
        tracing::debug!(sobject, id = %created.id, "Created record");
        Ok(created.id)
    }

    async fn update<T: Serialize + ?Sized + Sync>(
        &self,
        sobject: &str,
        id: Option<&RecordId>,
        record: &T,
    ) -> Result<()> {
        let id = id.ok_or_else(|| CrmError::UpdateFailed {
            object: sobject.to_string(),
            message: "record has no id".to_string(),
        })?;

        let resp = self
            .http
            .patch(self.data_url(&format!("/sobjects/{sobject}/{id}")))
            .bearer_auth(self.token())
            .json(record)
            .send()
            .await
            .map_err(|e| CrmError::ConnectionFailed(e.to_string()))?;

        success_or(resp, |status, body| {
            if status == StatusCode::NOT_FOUND {
                CrmError::NotFound {
                    object: sobject.to_string(),
                    id: id.to_string(),
                }
            } else {
                CrmError::UpdateFailed {
                    object: sobject.to_string(),
                    message: format!("{status}: {body}"),
                }
            }
        })
        .await?;

        tracing::debug!(sobject, id = %id, "Updated record");
        Ok(())
    }

    async fn find_id(&self, soql: &str) -> Result<Option<RecordId>> {
        let records: Vec<IdOnly> = self.query(soql).await?;
        Ok(records.into_iter().next().map(|r| r.id))
    }
}

/// Returns the response if successful, otherwise maps status and body to an error
async fn success_or<F>(resp: Response, to_error: F) -> std::result::Result<Response, CrmError>
where
    F: FnOnce(StatusCode, String) -> CrmError,
{
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(to_error(status, body))
}

/// Quotes a value as a SOQL string literal
pub fn soql_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

fn lead_select() -> String {
    let mut fields = vec!["Id", "Username__c", "Company"];
    fields.extend(PersonFields::API_NAMES);
    fields.extend(UtmFields::API_NAMES);
    fields.extend(["IsConverted", "ConvertedAccountId", "ConvertedContactId"]);
    fields.join(", ")
}

fn contact_select() -> String {
    let mut fields = vec!["Id", "AccountId"];
    fields.extend(PersonFields::API_NAMES);
    fields.extend(UtmFields::API_NAMES);
    fields.join(", ")
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn xml_text<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(&body[start..end])
}

fn convert_lead_envelope(session_id: &str, lead_id: &str, converted_status: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:urn="urn:partner.soap.sforce.com">
  <soapenv:Header>
    <urn:SessionHeader>
      <urn:sessionId>{}</urn:sessionId>
    </urn:SessionHeader>
  </soapenv:Header>
  <soapenv:Body>
    <urn:convertLead>
      <urn:leadConverts>
        <urn:convertedStatus>{}</urn:convertedStatus>
        <urn:doNotCreateOpportunity>true</urn:doNotCreateOpportunity>
        <urn:leadId>{}</urn:leadId>
        <urn:sendNotificationEmail>false</urn:sendNotificationEmail>
      </urn:leadConverts>
    </urn:convertLead>
  </soapenv:Body>
</soapenv:Envelope>"#,
        xml_escape(session_id),
        xml_escape(converted_status),
        xml_escape(lead_id)
    )
}

#[async_trait]
impl CrmStore for SalesforceClient {
    async fn find_lead(&self, username: &Username) -> Result<Option<Lead>> {
        let soql = format!(
            "SELECT {} FROM Lead WHERE Username__c = {} LIMIT 2",
            lead_select(),
            soql_literal(username.as_str())
        );
        let mut leads: Vec<Lead> = self.query(&soql).await?;
        if leads.len() > 1 {
            return Err(CrmError::QueryFailed(format!(
                "more than one Lead has username '{username}'"
            ))
            .into());
        }
        Ok(leads.pop())
    }

    async fn create_lead(&self, lead: &Lead) -> Result<RecordId> {
        self.create("Lead", lead).await
    }

    async fn update_lead(&self, lead: &Lead) -> Result<()> {
        self.update("Lead", lead.id.as_ref(), lead).await
    }

    async fn find_contact(&self, id: &RecordId) -> Result<Option<Contact>> {
        let soql = format!(
            "SELECT {} FROM Contact WHERE Id = {}",
            contact_select(),
            soql_literal(id.as_str())
        );
        let contacts: Vec<Contact> = self.query(&soql).await?;
        Ok(contacts.into_iter().next())
    }

    async fn update_contact(&self, contact: &Contact) -> Result<()> {
        self.update("Contact", contact.id.as_ref(), contact).await
    }

    async fn convert_lead(&self, lead_id: &RecordId) -> Result<()> {
        let url = format!(
            "{}/services/Soap/u/{}",
            self.instance_url, self.config.api_version
        );
        let envelope =
            convert_lead_envelope(self.token(), lead_id.as_str(), &self.config.converted_status);

        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", "convertLead")
            .body(envelope)
            .send()
            .await
            .map_err(|e| CrmError::ConnectionFailed(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CrmError::InvalidResponse(format!("convertLead response: {e}")))?;

        if !status.is_success() {
            let fault = xml_text(&body, "faultstring").unwrap_or(&body);
            return Err(CrmError::ConversionFailed(format!("{status}: {fault}")).into());
        }
        if xml_text(&body, "success") != Some("true") {
            let message = xml_text(&body, "message").unwrap_or("no error message returned");
            return Err(CrmError::ConversionFailed(format!("lead {lead_id}: {message}")).into());
        }

        tracing::info!(lead_id = %lead_id, "Converted lead");
        Ok(())
    }

    async fn standard_pricebook(&self) -> Result<RecordId> {
        self.find_id("SELECT Id FROM Pricebook2 WHERE IsStandard = true LIMIT 1")
            .await?
            .ok_or_else(|| {
                CrmError::NotFound {
                    object: "Pricebook2".to_string(),
                    id: "standard".to_string(),
                }
                .into()
            })
    }

    async fn get_or_create_named(&self, entity: NamedEntity, name: &str) -> Result<GetOrCreate> {
        let soql = format!(
            "SELECT Id FROM {} WHERE Name = {} LIMIT 1",
            entity.sobject(),
            soql_literal(name)
        );
        if let Some(id) = self.find_id(&soql).await? {
            return Ok(GetOrCreate { id, created: false });
        }

        let id = self
            .create(entity.sobject(), &serde_json::json!({ "Name": name }))
            .await?;
        Ok(GetOrCreate { id, created: true })
    }

    async fn create_campaign_member(&self, member: &CampaignMember) -> Result<RecordId> {
        self.create("CampaignMember", member).await
    }

    async fn get_or_create_opportunity(&self, key: &OpportunityKey) -> Result<GetOrCreate> {
        let soql = format!(
            "SELECT Id FROM Opportunity WHERE AccountId = {} AND Name = {} AND Amount = {} \
             AND CloseDate = {} AND Paid_Date__c = {} AND StageName = {} LIMIT 1",
            soql_literal(key.account_id.as_str()),
            soql_literal(&key.name),
            key.amount,
            key.close_date.format("%Y-%m-%d"),
            key.paid_date.format("%Y-%m-%d"),
            soql_literal(&key.stage_name)
        );
        if let Some(id) = self.find_id(&soql).await? {
            return Ok(GetOrCreate { id, created: false });
        }

        let id = self.create("Opportunity", key).await?;
        Ok(GetOrCreate { id, created: true })
    }

    async fn find_active_pricebook_entry(
        &self,
        pricebook_id: &RecordId,
        product_id: &RecordId,
    ) -> Result<Option<PricebookEntry>> {
        let soql = format!(
            "SELECT Id, Pricebook2Id, Product2Id, UnitPrice, IsActive FROM PricebookEntry \
             WHERE Pricebook2Id = {} AND Product2Id = {} AND IsActive = true LIMIT 1",
            soql_literal(pricebook_id.as_str()),
            soql_literal(product_id.as_str())
        );
        let entries: Vec<PricebookEntry> = self.query(&soql).await?;
        Ok(entries.into_iter().next())
    }

    async fn create_pricebook_entry(&self, entry: &PricebookEntry) -> Result<RecordId> {
        self.create("PricebookEntry", entry).await
    }

    async fn update_pricebook_entry_price(
        &self,
        id: &RecordId,
        unit_price: Decimal,
    ) -> Result<()> {
        self.update(
            "PricebookEntry",
            Some(id),
            &serde_json::json!({ "UnitPrice": unit_price }),
        )
        .await
    }

    async fn create_contact_role(&self, role: &OpportunityContactRole) -> Result<RecordId> {
        self.create("OpportunityContactRole", role).await
    }

    async fn create_line_item(&self, item: &OpportunityLineItem) -> Result<RecordId> {
        tracing::debug!(
            opportunity_id = %item.opportunity_id,
            list_price = %item.list_price,
            total_price = %item.total_price,
            "Creating opportunity line item"
        );
        self.create("OpportunityLineItem", item).await
    }
}
