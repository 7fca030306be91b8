//! In-memory record store
//!
//! Applies the same filters as the SQL in [`super::queries`] to rows held
//! in vectors. Used by tests and dry runs of the merge pipeline.

use super::queries::org_course_pattern;
use super::store::RecordStore;
use crate::domain::{
    RawCoupon, RawLanguagePreference, RawOrder, RawTrackingAttribute, RawUserProfile, Result,
    SyncError, UtmParam, Username,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Rows for an in-memory [`RecordStore`]
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    pub orders: Vec<RawOrder>,
    pub coupons: Vec<RawCoupon>,
    /// `(username, created_on_site value)`
    pub site_attributes: Vec<(Username, String)>,
    pub profiles: Vec<RawUserProfile>,
    pub language_prefs: Vec<RawLanguagePreference>,
    pub tracking: Vec<RawTrackingAttribute>,
    queries: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queries answered so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn orders_for_orgs(&self, orgs: &[String]) -> Result<Vec<RawOrder>> {
        let pattern = org_course_pattern(orgs)?;
        let re = regex::Regex::new(&pattern)
            .map_err(|e| SyncError::Validation(format!("Invalid course pattern: {e}")))?;
        self.record_query();

        Ok(self
            .orders
            .iter()
            .filter(|order| re.is_match(&order.course_id))
            .cloned()
            .collect())
    }

    async fn coupons_for_orders(&self, order_ids: &[i64]) -> Result<Vec<RawCoupon>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.record_query();
        Ok(self
            .coupons
            .iter()
            .filter(|coupon| order_ids.contains(&coupon.order_id))
            .cloned()
            .collect())
    }

    async fn users_for_site(&self, site_domain: &str) -> Result<Vec<Username>> {
        self.record_query();
        Ok(self
            .site_attributes
            .iter()
            .filter(|(_, site)| site == site_domain)
            .map(|(username, _)| username.clone())
            .collect())
    }

    async fn profiles_for_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<RawUserProfile>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        self.record_query();
        Ok(self
            .profiles
            .iter()
            .filter(|profile| usernames.contains(&profile.username))
            .cloned()
            .collect())
    }

    async fn language_prefs_for_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<RawLanguagePreference>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        self.record_query();
        Ok(self
            .language_prefs
            .iter()
            .filter(|pref| usernames.contains(&pref.username))
            .cloned()
            .collect())
    }

    async fn tracking_for_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<RawTrackingAttribute>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        self.record_query();
        Ok(self
            .tracking
            .iter()
            .filter(|attr| usernames.contains(&attr.username))
            .filter(|attr| {
                UtmParam::ALL
                    .iter()
                    .any(|param| param.attribute_name() == attr.utm_param_name)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn order(username: &str, order_id: i64, course_id: &str) -> RawOrder {
        RawOrder {
            username: user(username),
            order_id,
            purchase_date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            quantity: 1,
            list_price: Decimal::new(10000, 2),
            unit_price: Decimal::new(9000, 2),
            course_id: course_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_orders_filtered_by_org() {
        let mut store = InMemoryRecordStore::new();
        store.orders = vec![
            order("alice", 1, "course-v1:OrgX+C1+2024"),
            order("bob", 2, "course-v1:OtherX+C2+2024"),
        ];

        let orders = store.orders_for_orgs(&["OrgX".to_string()]).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].username.as_str(), "alice");
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn test_site_filter_is_exact() {
        let mut store = InMemoryRecordStore::new();
        store.site_attributes = vec![
            (user("alice"), "courses.example.com".to_string()),
            (user("bob"), "sub.courses.example.com".to_string()),
        ];

        let users = store.users_for_site("courses.example.com").await.unwrap();
        assert_eq!(users, vec![user("alice")]);
    }

    #[tokio::test]
    async fn test_empty_sets_do_not_count_as_queries() {
        let store = InMemoryRecordStore::new();
        store.coupons_for_orders(&[]).await.unwrap();
        store.profiles_for_usernames(&[]).await.unwrap();
        assert_eq!(store.query_count(), 0);
    }
}
