//! End-to-end sync tests over the in-memory record store and CRM
//!
//! These tests verify that:
//! - A first purchase creates, converts and links every Salesforce object
//! - A second run over unchanged data writes nothing
//! - Price book entries keep the highest list price seen
//! - Profile edits reach the Lead or the converted Contact

use chrono::{TimeZone, Utc};
use edx_salesforce::adapters::crm::{InMemoryCrm, NamedEntity};
use edx_salesforce::adapters::source::InMemoryRecordStore;
use edx_salesforce::core::extract::fetch_user_data;
use edx_salesforce::core::sync::{SyncOrchestrator, SyncStatus, SyncSummary};
use edx_salesforce::domain::{
    MergedUser, RawCoupon, RawLanguagePreference, RawOrder, RawTrackingAttribute, RawUserProfile,
    Username,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

const SITE: &str = "courses.example.com";
const COURSE: &str = "course-v1:OrgX+Rust101+2024";

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

fn username(name: &str) -> Username {
    Username::new(name).unwrap()
}

fn profile(name: &str) -> RawUserProfile {
    RawUserProfile {
        username: username(name),
        email: format!("{name}@example.com"),
        full_name: format!("{} Learner", name.to_uppercase()),
        country: Some("CA".to_string()),
        year_of_birth: Some(1990),
        level_of_education: Some("m".to_string()),
        goals: Some("Learn Rust".to_string()),
        gender: Some("f".to_string()),
        registration_date: Utc.with_ymd_and_hms(2023, 9, 1, 8, 30, 0).unwrap(),
    }
}

fn order(name: &str, order_id: i64, course_id: &str, unit: &str, list: &str) -> RawOrder {
    RawOrder {
        username: username(name),
        order_id,
        purchase_date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        quantity: 1,
        list_price: dec(list),
        unit_price: dec(unit),
        course_id: course_id.to_string(),
    }
}

/// alice bought the course with a coupon; bob only registered on the site
fn store() -> InMemoryRecordStore {
    let mut store = InMemoryRecordStore::new();
    store.orders = vec![order("alice", 100, COURSE, "90.00", "100.00")];
    store.coupons = vec![RawCoupon {
        order_id: 100,
        coupon_code: "SAVE10".to_string(),
    }];
    store.site_attributes = vec![(username("bob"), SITE.to_string())];
    store.profiles = vec![profile("alice"), profile("bob")];
    store.language_prefs = vec![RawLanguagePreference {
        username: username("alice"),
        language_preference: "en".to_string(),
    }];
    store.tracking = vec![RawTrackingAttribute {
        username: username("alice"),
        utm_param_name: "registration_utm_campaign".to_string(),
        utm_param_value: "spring-launch".to_string(),
    }];
    store
}

async fn users(store: &InMemoryRecordStore) -> Vec<MergedUser> {
    fetch_user_data(store, SITE, &["OrgX".to_string()])
        .await
        .unwrap()
}

async fn run(crm: &Arc<InMemoryCrm>, users: &[MergedUser]) -> (SyncSummary, String) {
    let mut orchestrator = SyncOrchestrator::new(crm.clone()).await.unwrap();
    let mut out = Vec::new();
    let summary = orchestrator
        .run(users, SITE, &["OrgX".to_string()], &mut out)
        .await
        .unwrap();
    (summary, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_first_purchase_creates_full_object_graph() {
    let crm = Arc::new(InMemoryCrm::new());
    let users = users(&store()).await;

    let (summary, output) = run(&crm, &users).await;

    assert!(output.contains("alice: SYNCHRONIZED"));
    assert!(output.contains("bob: SYNCHRONIZED"));
    assert_eq!(summary.synchronized, 2);
    assert_eq!(summary.tally_lines(), vec!["0 FAILED", "0 In Sync", "2 SYNCHRONIZED"]);

    // alice converted, bob stays a lead
    let alice = crm.lead_by_username("alice").unwrap();
    assert!(alice.is_converted);
    assert_eq!(alice.programs.as_deref(), Some("OpenClassroom"));
    assert!(!crm.lead_by_username("bob").unwrap().is_converted);
    assert_eq!(crm.account_count(), 1);

    let opportunities = crm.opportunities();
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].name, COURSE);
    assert_eq!(opportunities[0].amount, dec("90.00"));
    assert_eq!(opportunities[0].stage_name, "Paid");
    assert_eq!(
        opportunities[0].close_date,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    );

    let entries = crm.pricebook_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].unit_price, dec("100.00"));
    assert!(entries[0].is_active);

    assert_eq!(crm.named(NamedEntity::DiscountCode), vec!["SAVE10"]);
    assert_eq!(crm.named(NamedEntity::Product), vec![COURSE]);
    assert_eq!(crm.named(NamedEntity::Campaign), vec!["spring-launch"]);
    assert_eq!(crm.campaign_members().len(), 1);

    let line_items = crm.line_items();
    assert_eq!(line_items.len(), 1);
    assert_eq!(line_items[0].total_price, dec("90.00"));
    assert_eq!(line_items[0].quantity, Decimal::ONE);
    assert_eq!(
        line_items[0].discount_code_id,
        crm.named_id(NamedEntity::DiscountCode, "SAVE10")
    );

    let contacts = crm.contacts();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].person.language.as_deref(), Some("English"));
    assert_eq!(contacts[0].person.country.as_deref(), Some("Canada"));
    assert_eq!(contacts[0].utm.campaign.as_deref(), Some("spring-launch"));
}

#[tokio::test]
async fn test_second_run_is_in_sync_with_no_writes() {
    let crm = Arc::new(InMemoryCrm::new());
    let users = users(&store()).await;
    run(&crm, &users).await;
    crm.reset_calls();

    let (summary, output) = run(&crm, &users).await;

    assert_eq!(summary.in_sync, 2);
    assert_eq!(summary.synchronized, 0);
    assert!(output.contains("alice: In Sync"));
    assert_eq!(crm.calls().writes(), 0);
    assert_eq!(crm.opportunities().len(), 1);
    assert_eq!(crm.leads().len(), 2);
}

#[tokio::test]
async fn test_pricebook_entry_keeps_highest_price() {
    let crm = Arc::new(InMemoryCrm::new());
    let mut store = store();
    store.orders = vec![
        order("alice", 100, COURSE, "120.00", "120.00"),
        order("bob", 101, COURSE, "90.00", "90.00"),
    ];
    store.coupons.clear();

    run(&crm, &users(&store).await).await;

    let entries = crm.pricebook_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].unit_price, dec("120.00"));
}

#[tokio::test]
async fn test_pricebook_entry_raised_by_later_higher_price() {
    let crm = Arc::new(InMemoryCrm::new());
    let mut store = store();
    store.orders = vec![
        order("alice", 100, COURSE, "90.00", "90.00"),
        order("bob", 101, COURSE, "150.00", "150.00"),
    ];
    store.coupons.clear();

    run(&crm, &users(&store).await).await;

    let entries = crm.pricebook_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].unit_price, dec("150.00"));
    assert!(crm.named(NamedEntity::DiscountCode).is_empty());
    assert!(crm.line_items().iter().all(|item| item.discount_code_id.is_none()));
}

#[tokio::test]
async fn test_profile_change_updates_only_changed_records() {
    let crm = Arc::new(InMemoryCrm::new());
    let mut store = store();
    run(&crm, &users(&store).await).await;
    crm.reset_calls();

    store.profiles[0].email = "alice@new.example.com".to_string();
    store.profiles[1].full_name = "Robert Learner".to_string();
    let (summary, _) = run(&crm, &users(&store).await).await;

    assert_eq!(summary.synchronized, 2);
    assert_eq!(crm.calls().updates, 2);
    assert_eq!(crm.calls().creates, 0);
    assert_eq!(
        crm.contacts()[0].person.email.as_deref(),
        Some("alice@new.example.com")
    );
    assert_eq!(
        crm.lead_by_username("bob").unwrap().person.first_name.as_deref(),
        Some("Robert")
    );
}

#[tokio::test]
async fn test_new_purchase_by_existing_lead_converts() {
    let crm = Arc::new(InMemoryCrm::new());
    let mut store = store();
    run(&crm, &users(&store).await).await;

    store
        .orders
        .push(order("bob", 200, "course-v1:OrgX+Async+2024", "49.00", "49.00"));
    let (summary, output) = run(&crm, &users(&store).await).await;

    assert!(output.contains("bob: SYNCHRONIZED"));
    assert!(output.contains("alice: In Sync"));
    assert_eq!(summary.synchronized, 1);
    assert!(crm.lead_by_username("bob").unwrap().is_converted);
    assert_eq!(crm.opportunities().len(), 2);
    assert_eq!(crm.contacts().len(), 2);
}

#[tokio::test]
async fn test_other_org_purchases_are_ignored() {
    let crm = Arc::new(InMemoryCrm::new());
    let mut store = store();
    store
        .orders
        .push(order("bob", 300, "course-v1:OtherOrg+X+2024", "10.00", "10.00"));

    let users = users(&store).await;
    let bob = users.iter().find(|u| u.username.as_str() == "bob").unwrap();
    assert!(bob.courses.is_empty());

    run(&crm, &users).await;
    assert_eq!(crm.opportunities().len(), 1);
}

#[tokio::test]
async fn test_statuses_are_reported_in_tally_order() {
    let crm = Arc::new(InMemoryCrm::new());
    let users = users(&store()).await;
    let (summary, _) = run(&crm, &users).await;

    let counts: Vec<usize> = SyncStatus::ALL.iter().map(|s| summary.count(*s)).collect();
    assert_eq!(counts, vec![0, 0, 2]);
}
