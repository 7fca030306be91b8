//! Integration tests for the Salesforce REST/SOAP client against a mock server

use edx_salesforce::adapters::crm::{CrmStore, Lead, NamedEntity, SalesforceClient};
use edx_salesforce::config::{secret_string, SalesforceConfig};
use edx_salesforce::domain::{CrmError, RecordId, SyncError, Username};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const TOKEN: &str = "00Dtoken!session";
const QUERY_PATH: &str = "/services/data/v58.0/query";

fn config(server: &ServerGuard) -> SalesforceConfig {
    SalesforceConfig {
        login_url: server.url(),
        api_version: "58.0".to_string(),
        client_id: "consumer-key".to_string(),
        client_secret: secret_string("consumer-secret".to_string()),
        username: "integration@example.com".to_string(),
        password: secret_string("hunter2".to_string()),
        security_token: Some(secret_string("tok3n".to_string())),
        converted_status: "Closed - Converted".to_string(),
        timeout_seconds: 5,
    }
}

async fn connected(server: &mut ServerGuard) -> SalesforceClient {
    server
        .mock("POST", "/services/oauth2/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "password".into()),
            Matcher::UrlEncoded("client_id".into(), "consumer-key".into()),
            Matcher::UrlEncoded("client_secret".into(), "consumer-secret".into()),
            Matcher::UrlEncoded("username".into(), "integration@example.com".into()),
            Matcher::UrlEncoded("password".into(), "hunter2tok3n".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": TOKEN,
                "instance_url": server.url(),
                "token_type": "Bearer"
            })
            .to_string(),
        )
        .create_async()
        .await;

    SalesforceClient::connect(config(server)).await.unwrap()
}

async fn mock_query(server: &mut ServerGuard, records: serde_json::Value) -> mockito::Mock {
    server
        .mock("GET", QUERY_PATH)
        .match_query(Matcher::Any)
        .match_header("authorization", format!("Bearer {TOKEN}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "totalSize": records.as_array().map(|r| r.len()).unwrap_or(0),
                "done": true,
                "records": records
            })
            .to_string(),
        )
        .create_async()
        .await
}

fn lead_record(id: &str) -> serde_json::Value {
    json!({
        "attributes": {"type": "Lead", "url": format!("/services/data/v58.0/sobjects/Lead/{id}")},
        "Id": id,
        "Username__c": "alice",
        "Company": "alice",
        "Email": "alice@example.com",
        "FirstName": "Alice",
        "LastName": "Smith",
        "Country__c": "Canada",
        "Year_of_Birth__c": "1990",
        "Language__c": "English",
        "Level_of_Education__c": null,
        "Interest__c": null,
        "Gender__c": "F",
        "Registration_Date__c": "2023-09-01T08:30:00.000+0000",
        "pi__utm_campaign__c": "spring",
        "pi__utm_content__c": null,
        "pi__utm_medium__c": null,
        "pi__utm_source__c": null,
        "pi__utm_term__c": null,
        "IsConverted": true,
        "ConvertedAccountId": "001000000000001AAA",
        "ConvertedContactId": "003000000000001AAA"
    })
}

#[tokio::test]
async fn test_connect_uses_instance_url() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    assert_eq!(client.instance_url(), server.url());
}

#[tokio::test]
async fn test_connect_rejected_credentials() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/services/oauth2/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"authentication failure"}"#)
        .create_async()
        .await;

    let result = SalesforceClient::connect(config(&server)).await;
    match result {
        Err(SyncError::Crm(CrmError::AuthenticationFailed(message))) => {
            assert!(message.contains("invalid_grant"));
        }
        other => panic!("expected authentication failure, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_find_lead_decodes_record() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    let mock = mock_query(&mut server, json!([lead_record("00Q000000000001AAA")])).await;

    let lead = client
        .find_lead(&Username::new("alice").unwrap())
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(lead.id.unwrap().as_str(), "00Q000000000001AAA");
    assert_eq!(lead.person.country.as_deref(), Some("Canada"));
    assert_eq!(lead.person.level_of_education, None);
    assert_eq!(
        lead.person.registration_date.unwrap().to_rfc3339(),
        "2023-09-01T08:30:00+00:00"
    );
    assert_eq!(lead.utm.campaign.as_deref(), Some("spring"));
    assert!(lead.is_converted);
    assert_eq!(
        lead.converted_contact_id.unwrap().as_str(),
        "003000000000001AAA"
    );
}

#[tokio::test]
async fn test_find_lead_rejects_duplicates() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    mock_query(
        &mut server,
        json!([
            lead_record("00Q000000000001AAA"),
            lead_record("00Q000000000002AAA")
        ]),
    )
    .await;

    let result = client.find_lead(&Username::new("alice").unwrap()).await;
    assert!(matches!(
        result,
        Err(SyncError::Crm(CrmError::QueryFailed(_)))
    ));
}

#[tokio::test]
async fn test_missing_standard_pricebook() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    mock_query(&mut server, json!([])).await;

    let result = client.standard_pricebook().await;
    assert!(matches!(
        result,
        Err(SyncError::Crm(CrmError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_query_server_error() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    server
        .mock("GET", QUERY_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let result = client.standard_pricebook().await;
    assert!(matches!(
        result,
        Err(SyncError::Crm(CrmError::ServerError { status: 503, .. }))
    ));
}

#[tokio::test]
async fn test_create_lead_posts_writable_fields() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    let mock = server
        .mock("POST", "/services/data/v58.0/sobjects/Lead")
        .match_header("authorization", format!("Bearer {TOKEN}").as_str())
        .match_body(Matcher::PartialJson(json!({
            "Username__c": "alice",
            "Company": "alice",
            "LastName": "Smith",
            "Programs__c": "OpenClassroom"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"00Q000000000003AAA","success":true,"errors":[]}"#)
        .create_async()
        .await;

    let mut lead = Lead::new("alice");
    lead.person.last_name = Some("Smith".to_string());
    let id = client.create_lead(&lead).await.unwrap();

    mock.assert_async().await;
    assert_eq!(id.as_str(), "00Q000000000003AAA");
}

#[tokio::test]
async fn test_get_or_create_named_finds_existing() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    mock_query(
        &mut server,
        json!([{"attributes": {"type": "Campaign"}, "Id": "701000000000001AAA"}]),
    )
    .await;

    let result = client
        .get_or_create_named(NamedEntity::Campaign, "spring")
        .await
        .unwrap();
    assert!(!result.created);
    assert_eq!(result.id.as_str(), "701000000000001AAA");
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    server
        .mock("PATCH", "/services/data/v58.0/sobjects/PricebookEntry/01u000000000001AAA")
        .with_status(404)
        .with_body(r#"[{"errorCode":"NOT_FOUND","message":"The requested resource does not exist"}]"#)
        .create_async()
        .await;

    let id = RecordId::new("01u000000000001AAA").unwrap();
    let result = client
        .update_pricebook_entry_price(&id, rust_decimal::Decimal::new(12000, 2))
        .await;
    assert!(matches!(
        result,
        Err(SyncError::Crm(CrmError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_convert_lead_success() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    let mock = server
        .mock("POST", "/services/Soap/u/58.0")
        .match_header("soapaction", "convertLead")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<urn:leadId>00Q000000000001AAA</urn:leadId>".into()),
            Matcher::Regex("<urn:convertedStatus>Closed - Converted</urn:convertedStatus>".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(
            r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"><soapenv:Body><convertLeadResponse><result><accountId>001000000000001AAA</accountId><contactId>003000000000001AAA</contactId><leadId>00Q000000000001AAA</leadId><success>true</success></result></convertLeadResponse></soapenv:Body></soapenv:Envelope>"#,
        )
        .create_async()
        .await;

    let id = RecordId::new("00Q000000000001AAA").unwrap();
    client.convert_lead(&id).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_convert_lead_reports_error_message() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    server
        .mock("POST", "/services/Soap/u/58.0")
        .with_status(200)
        .with_body(
            r#"<result><errors><message>invalid converted status</message><statusCode>INVALID_STATUS</statusCode></errors><success>false</success></result>"#,
        )
        .create_async()
        .await;

    let id = RecordId::new("00Q000000000001AAA").unwrap();
    match client.convert_lead(&id).await {
        Err(SyncError::Crm(CrmError::ConversionFailed(message))) => {
            assert!(message.contains("invalid converted status"));
        }
        other => panic!("expected conversion failure, got {other:?}"),
    }
}
