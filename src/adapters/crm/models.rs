//! Salesforce object shapes
//!
//! Field names follow the Salesforce API names through `serde(rename)`.
//! Read-only fields are never serialized, so the same struct is used for
//! query results and for create/update payloads.

use crate::domain::{RecordId, UtmParam};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fields shared by Lead and Contact that mirror the learner profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonFields {
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "FirstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "Country__c", default)]
    pub country: Option<String>,
    #[serde(rename = "Year_of_Birth__c", default)]
    pub year_of_birth: Option<String>,
    #[serde(rename = "Language__c", default)]
    pub language: Option<String>,
    #[serde(rename = "Level_of_Education__c", default)]
    pub level_of_education: Option<String>,
    #[serde(rename = "Interest__c", default)]
    pub interest: Option<String>,
    #[serde(rename = "Gender__c", default)]
    pub gender: Option<String>,
    #[serde(rename = "Registration_Date__c", default, with = "sf_datetime")]
    pub registration_date: Option<DateTime<Utc>>,
}

impl PersonFields {
    /// API names, in SOQL select order
    pub const API_NAMES: [&'static str; 10] = [
        "Email",
        "FirstName",
        "LastName",
        "Country__c",
        "Year_of_Birth__c",
        "Language__c",
        "Level_of_Education__c",
        "Interest__c",
        "Gender__c",
        "Registration_Date__c",
    ];
}

/// Pardot UTM fields carried by Lead and Contact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmFields {
    #[serde(rename = "pi__utm_campaign__c", default)]
    pub campaign: Option<String>,
    #[serde(rename = "pi__utm_content__c", default)]
    pub content: Option<String>,
    #[serde(rename = "pi__utm_medium__c", default)]
    pub medium: Option<String>,
    #[serde(rename = "pi__utm_source__c", default)]
    pub source: Option<String>,
    #[serde(rename = "pi__utm_term__c", default)]
    pub term: Option<String>,
}

impl UtmFields {
    pub const API_NAMES: [&'static str; 5] = [
        "pi__utm_campaign__c",
        "pi__utm_content__c",
        "pi__utm_medium__c",
        "pi__utm_source__c",
        "pi__utm_term__c",
    ];

    pub fn slot_mut(&mut self, param: UtmParam) -> &mut Option<String> {
        match param {
            UtmParam::Campaign => &mut self.campaign,
            UtmParam::Content => &mut self.content,
            UtmParam::Medium => &mut self.medium,
            UtmParam::Source => &mut self.source,
            UtmParam::Term => &mut self.term,
        }
    }
}

/// A Salesforce Lead, keyed by the edX username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(rename = "Id", default, skip_serializing)]
    pub id: Option<RecordId>,
    #[serde(rename = "Username__c")]
    pub username: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(flatten)]
    pub person: PersonFields,
    #[serde(flatten)]
    pub utm: UtmFields,
    /// Only sent when creating, so edits made in Salesforce survive updates
    #[serde(rename = "Programs__c", default, skip_serializing_if = "Option::is_none")]
    pub programs: Option<String>,
    #[serde(rename = "IsConverted", default, skip_serializing)]
    pub is_converted: bool,
    #[serde(rename = "ConvertedAccountId", default, skip_serializing)]
    pub converted_account_id: Option<RecordId>,
    #[serde(rename = "ConvertedContactId", default, skip_serializing)]
    pub converted_contact_id: Option<RecordId>,
}

/// Program every new Lead is filed under
pub const DEFAULT_PROGRAM: &str = "OpenClassroom";

impl Lead {
    /// An unsaved Lead whose company is the username
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: None,
            company: username.clone(),
            username,
            person: PersonFields::default(),
            utm: UtmFields::default(),
            programs: Some(DEFAULT_PROGRAM.to_string()),
            is_converted: false,
            converted_account_id: None,
            converted_contact_id: None,
        }
    }
}

/// A Salesforce Contact produced by lead conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "Id", default, skip_serializing)]
    pub id: Option<RecordId>,
    #[serde(rename = "AccountId", default, skip_serializing)]
    pub account_id: Option<RecordId>,
    #[serde(flatten)]
    pub person: PersonFields,
    #[serde(flatten)]
    pub utm: UtmFields,
}

/// Lookup and create values for an Opportunity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpportunityKey {
    #[serde(rename = "AccountId")]
    pub account_id: RecordId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    #[serde(rename = "CloseDate")]
    pub close_date: NaiveDate,
    #[serde(rename = "Paid_Date__c")]
    pub paid_date: NaiveDate,
    #[serde(rename = "StageName")]
    pub stage_name: String,
}

/// Stage of every Opportunity created from a purchase
pub const STAGE_PAID: &str = "Paid";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricebookEntry {
    #[serde(rename = "Id", default, skip_serializing)]
    pub id: Option<RecordId>,
    #[serde(rename = "Pricebook2Id")]
    pub pricebook_id: RecordId,
    #[serde(rename = "Product2Id")]
    pub product_id: RecordId,
    #[serde(rename = "UnitPrice")]
    pub unit_price: Decimal,
    #[serde(rename = "IsActive")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignMember {
    #[serde(rename = "CampaignId")]
    pub campaign_id: RecordId,
    #[serde(rename = "LeadId")]
    pub lead_id: RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpportunityContactRole {
    #[serde(rename = "OpportunityId")]
    pub opportunity_id: RecordId,
    #[serde(rename = "ContactId")]
    pub contact_id: RecordId,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "IsPrimary")]
    pub is_primary: bool,
}

/// An OpportunityLineItem
///
/// `list_price` is read-only in Salesforce and derived from the pricebook
/// entry; it is kept here for logging only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityLineItem {
    #[serde(rename = "OpportunityId")]
    pub opportunity_id: RecordId,
    #[serde(rename = "PricebookEntryId")]
    pub pricebook_entry_id: RecordId,
    #[serde(rename = "Quantity")]
    pub quantity: Decimal,
    #[serde(rename = "TotalPrice")]
    pub total_price: Decimal,
    #[serde(rename = "Discount_Code__c")]
    pub discount_code_id: Option<RecordId>,
    #[serde(skip)]
    pub list_price: Decimal,
}

/// Result of a get-or-create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOrCreate {
    pub id: RecordId,
    pub created: bool,
}

/// Salesforce datetime values
///
/// Salesforce returns `2024-01-15T09:30:00.000+0000`; RFC 3339 is accepted
/// as a fallback and written on output.
pub mod sf_datetime {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const SALESFORCE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

    pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_str(value, SALESFORCE_FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(value))
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_lead_deserializes_query_record() {
        let record = json!({
            "attributes": {"type": "Lead", "url": "/services/data/v58.0/sobjects/Lead/00Q1"},
            "Id": "00Q000000000001",
            "Username__c": "alice",
            "Company": "alice",
            "Email": "alice@example.com",
            "FirstName": "Alice",
            "LastName": "Smith",
            "Country__c": "Canada",
            "Year_of_Birth__c": "1990",
            "Language__c": null,
            "Level_of_Education__c": "Bachelor's degree",
            "Interest__c": null,
            "Gender__c": "F",
            "Registration_Date__c": "2023-05-01T10:00:00.000+0000",
            "pi__utm_campaign__c": "spring",
            "pi__utm_content__c": null,
            "pi__utm_medium__c": null,
            "pi__utm_source__c": null,
            "pi__utm_term__c": null,
            "IsConverted": true,
            "ConvertedAccountId": "001000000000001",
            "ConvertedContactId": "003000000000001"
        });

        let lead: Lead = serde_json::from_value(record).unwrap();
        assert_eq!(lead.username, "alice");
        assert!(lead.is_converted);
        assert_eq!(lead.person.country.as_deref(), Some("Canada"));
        assert_eq!(
            lead.person.registration_date,
            Some(Utc.with_ymd_and_hms(2023, 5, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(lead.utm.campaign.as_deref(), Some("spring"));
        assert_eq!(
            lead.converted_contact_id.map(RecordId::into_inner),
            Some("003000000000001".to_string())
        );
    }

    #[test]
    fn test_lead_payload_omits_read_only_fields() {
        let mut lead = Lead::new("bob");
        lead.is_converted = true;
        lead.person.last_name = Some("Jones".to_string());

        let payload = serde_json::to_value(&lead).unwrap();
        assert_eq!(payload["Company"], "bob");
        assert_eq!(payload["LastName"], "Jones");
        assert!(payload.get("Id").is_none());
        assert!(payload.get("IsConverted").is_none());
        assert!(payload.get("ConvertedContactId").is_none());
        assert!(payload["FirstName"].is_null());
        assert_eq!(payload["Programs__c"], "OpenClassroom");
    }

    #[test]
    fn test_queried_lead_update_leaves_programs_alone() {
        let record = json!({"Id": "00Q000000000001", "Username__c": "carol", "Company": "carol"});
        let lead: Lead = serde_json::from_value(record).unwrap();
        assert_eq!(lead.programs, None);

        let payload = serde_json::to_value(&lead).unwrap();
        assert!(payload.get("Programs__c").is_none());
    }

    #[test]
    fn test_registration_date_written_as_rfc3339() {
        let person = PersonFields {
            registration_date: Some(Utc.with_ymd_and_hms(2023, 5, 1, 10, 0, 0).unwrap()),
            ..Default::default()
        };
        let payload = serde_json::to_value(&person).unwrap();
        assert_eq!(payload["Registration_Date__c"], "2023-05-01T10:00:00.000Z");
    }

    #[test]
    fn test_opportunity_key_payload() {
        let key = OpportunityKey {
            account_id: RecordId::new("001000000000001").unwrap(),
            name: "course-v1:OrgX+C1+2024".to_string(),
            amount: Decimal::new(9000, 2),
            close_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            paid_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            stage_name: STAGE_PAID.to_string(),
        };
        let payload = serde_json::to_value(&key).unwrap();
        assert_eq!(payload["CloseDate"], "2024-03-01");
        assert_eq!(payload["Amount"], 90.0);
        assert_eq!(payload["StageName"], "Paid");
    }

    #[test]
    fn test_line_item_skips_list_price() {
        let item = OpportunityLineItem {
            opportunity_id: RecordId::new("006000000000001").unwrap(),
            pricebook_entry_id: RecordId::new("01u000000000001").unwrap(),
            quantity: Decimal::ONE,
            total_price: Decimal::new(9000, 2),
            discount_code_id: None,
            list_price: Decimal::new(10000, 2),
        };
        let payload = serde_json::to_value(&item).unwrap();
        assert!(payload.get("list_price").is_none());
        assert!(payload["Discount_Code__c"].is_null());
    }
}
