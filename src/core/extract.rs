//! Fetches and merges everything known about a site's learners

use crate::adapters::source::RecordStore;
use crate::core::merge::{merge_orders, merge_users};
use crate::domain::{MergedUser, Result};
use std::collections::HashSet;

/// Builds the merged user set for a site and its orgs
///
/// The user universe is everyone who bought a course of one of `orgs`
/// plus everyone registered on `site_domain`. Output follows the order
/// of the profile query. Any source error aborts the whole fetch.
pub async fn fetch_user_data(
    store: &dyn RecordStore,
    site_domain: &str,
    orgs: &[String],
) -> Result<Vec<MergedUser>> {
    let orders = store.orders_for_orgs(orgs).await?;
    let order_ids = distinct(orders.iter().map(|o| o.order_id));
    let coupons = store.coupons_for_orders(&order_ids).await?;
    let orders = merge_orders(orders, coupons);

    let site_users = store.users_for_site(site_domain).await?;
    let usernames = distinct(
        orders
            .iter()
            .map(|o| o.username.clone())
            .chain(site_users),
    );

    tracing::info!(
        site = %site_domain,
        purchases = orders.len(),
        users = usernames.len(),
        "Collected usernames"
    );

    let profiles = store.profiles_for_usernames(&usernames).await?;
    let language_prefs = store.language_prefs_for_usernames(&usernames).await?;
    let tracking = store.tracking_for_usernames(&usernames).await?;

    let users = merge_users(profiles, language_prefs, tracking, orders);
    tracing::debug!(users = users.len(), "Merged user records");
    Ok(users)
}

/// First occurrence of each value, in input order
fn distinct<T, I>(values: I) -> Vec<T>
where
    T: Clone + Eq + std::hash::Hash,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::source::InMemoryRecordStore;
    use crate::domain::{RawCoupon, RawOrder, RawUserProfile, Username};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn profile(username: &str) -> RawUserProfile {
        RawUserProfile {
            username: user(username),
            email: format!("{username}@example.com"),
            full_name: username.to_string(),
            country: None,
            year_of_birth: None,
            level_of_education: None,
            goals: None,
            gender: None,
            registration_date: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn store() -> InMemoryRecordStore {
        let mut store = InMemoryRecordStore::new();
        store.orders = vec![RawOrder {
            username: user("buyer"),
            order_id: 7,
            purchase_date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            quantity: 1,
            list_price: Decimal::new(10000, 2),
            unit_price: Decimal::new(9000, 2),
            course_id: "course-v1:OrgX+C1+2024".to_string(),
        }];
        store.coupons = vec![RawCoupon {
            order_id: 7,
            coupon_code: "SAVE10".to_string(),
        }];
        store.site_attributes = vec![
            (user("registrant"), "courses.example.com".to_string()),
            (user("buyer"), "courses.example.com".to_string()),
        ];
        store.profiles = vec![profile("buyer"), profile("registrant"), profile("other")];
        store
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        assert_eq!(distinct(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_fetch_user_data_unions_buyers_and_registrants() {
        let store = store();
        let users = fetch_user_data(&store, "courses.example.com", &["OrgX".to_string()])
            .await
            .unwrap();

        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["buyer", "registrant"]);
        assert_eq!(users[0].courses.len(), 1);
        assert_eq!(users[0].courses[0].primary_coupon(), Some("SAVE10"));
        assert!(users[1].courses.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_user_data_empty() {
        let store = InMemoryRecordStore::new();
        let users = fetch_user_data(&store, "courses.example.com", &["OrgX".to_string()])
            .await
            .unwrap();
        assert!(users.is_empty());
        // orders and site users only; empty sets skip the rest
        assert_eq!(store.query_count(), 2);
    }
}
