//! Record store over the two source databases

use super::client::SourceClient;
use super::queries;
use crate::config::SourcesConfig;
use crate::domain::{
    RawCoupon, RawLanguagePreference, RawOrder, RawTrackingAttribute, RawUserProfile, Result,
    Username,
};
use async_trait::async_trait;

/// Read access to the learning platform and e-commerce records
///
/// Implementations return rows in a stable order. Any error is fatal for
/// the run that issued the query.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Purchased course lines for courses owned by any of `orgs`
    async fn orders_for_orgs(&self, orgs: &[String]) -> Result<Vec<RawOrder>>;

    /// Coupon codes applied to the given orders
    async fn coupons_for_orders(&self, order_ids: &[i64]) -> Result<Vec<RawCoupon>>;

    /// Usernames whose `created_on_site` attribute equals `site_domain`
    async fn users_for_site(&self, site_domain: &str) -> Result<Vec<Username>>;

    /// Profiles for the given usernames
    async fn profiles_for_usernames(&self, usernames: &[Username])
        -> Result<Vec<RawUserProfile>>;

    /// Stored language preferences, oldest first
    async fn language_prefs_for_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<RawLanguagePreference>>;

    /// Registration UTM attributes
    async fn tracking_for_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<RawTrackingAttribute>>;
}

/// [`RecordStore`] backed by the `default` and `ecommerce` PostgreSQL sources
pub struct PgRecordStore {
    default: SourceClient,
    ecommerce: SourceClient,
}

impl PgRecordStore {
    /// Builds both connection pools
    ///
    /// No connection is opened until the first query.
    pub fn from_config(config: &SourcesConfig) -> Result<Self> {
        Ok(Self {
            default: SourceClient::new("default", config.default.clone())?,
            ecommerce: SourceClient::new("ecommerce", config.ecommerce.clone())?,
        })
    }

    /// Runs a connection test against both sources
    pub async fn test_connections(&self) -> Result<()> {
        for client in [&self.default, &self.ecommerce] {
            tracing::info!(
                source = client.name(),
                target = %client.connection_string_safe(),
                "Testing source connection"
            );
            client.test_connection().await?;
        }
        Ok(())
    }
}

fn username_params(usernames: &[Username]) -> Vec<&str> {
    usernames.iter().map(Username::as_str).collect()
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn orders_for_orgs(&self, orgs: &[String]) -> Result<Vec<RawOrder>> {
        let pattern = queries::org_course_pattern(orgs)?;
        tracing::debug!(pattern = %pattern, "Fetching orders");

        let rows = self
            .ecommerce
            .query("orders_for_orgs", queries::ORDERS_FOR_ORGS, &[&pattern])
            .await?;
        rows.iter().map(queries::decode_order).collect()
    }

    async fn coupons_for_orders(&self, order_ids: &[i64]) -> Result<Vec<RawCoupon>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = order_ids.to_vec();
        let rows = self
            .ecommerce
            .query(
                "coupon_codes_for_orders",
                queries::COUPON_CODES_FOR_ORDERS,
                &[&ids],
            )
            .await?;
        rows.iter().map(queries::decode_coupon).collect()
    }

    async fn users_for_site(&self, site_domain: &str) -> Result<Vec<Username>> {
        let rows = self
            .default
            .query("users_for_site", queries::USERS_FOR_SITE, &[&site_domain])
            .await?;
        rows.iter().map(queries::decode_site_user).collect()
    }

    async fn profiles_for_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<RawUserProfile>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let names = username_params(usernames);
        let rows = self
            .default
            .query(
                "users_for_usernames",
                queries::USERS_FOR_USERNAMES,
                &[&names],
            )
            .await?;
        rows.iter().map(queries::decode_profile).collect()
    }

    async fn language_prefs_for_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<RawLanguagePreference>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let names = username_params(usernames);
        let rows = self
            .default
            .query(
                "language_prefs_for_usernames",
                queries::LANGUAGE_PREFS_FOR_USERNAMES,
                &[&names],
            )
            .await?;
        rows.iter().map(queries::decode_language_preference).collect()
    }

    async fn tracking_for_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<RawTrackingAttribute>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let names = username_params(usernames);
        let attributes = queries::utm_attribute_names();
        let rows = self
            .default
            .query(
                "tracking_data_for_usernames",
                queries::TRACKING_DATA_FOR_USERNAMES,
                &[&attributes, &names],
            )
            .await?;
        rows.iter().map(queries::decode_tracking).collect()
    }
}
