//! Source records and the merged per-user record
//!
//! Raw records mirror one row of a source query. [`MergedUser`] is the
//! denormalized unit handed to the sync orchestrator and the report renderer.

use crate::domain::ids::Username;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One purchased line item joined with its order, product and purchaser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    pub username: Username,
    pub order_id: i64,
    pub purchase_date: DateTime<Utc>,
    pub quantity: i32,
    pub list_price: Decimal,
    pub unit_price: Decimal,
    pub course_id: String,
}

/// A coupon code applied to an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCoupon {
    pub order_id: i64,
    pub coupon_code: String,
}

/// A [`RawOrder`] annotated with the coupon codes applied to its order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedOrder {
    pub username: Username,
    pub order_id: i64,
    pub purchase_date: DateTime<Utc>,
    pub quantity: i32,
    pub list_price: Decimal,
    pub unit_price: Decimal,
    pub course_id: String,
    pub coupon_codes: BTreeSet<String>,
}

impl MergedOrder {
    /// Attaches a coupon set to an order
    pub fn new(order: RawOrder, coupon_codes: BTreeSet<String>) -> Self {
        Self {
            username: order.username,
            order_id: order.order_id,
            purchase_date: order.purchase_date,
            quantity: order.quantity,
            list_price: order.list_price,
            unit_price: order.unit_price,
            course_id: order.course_id,
            coupon_codes,
        }
    }

    /// Price paid for the line: unit price times quantity
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// The coupon used for the discount code, the smallest code when several apply
    pub fn primary_coupon(&self) -> Option<&str> {
        self.coupon_codes.iter().next().map(String::as_str)
    }
}

/// Profile row for one learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUserProfile {
    pub username: Username,
    /// Lower-cased by the source query
    pub email: String,
    pub full_name: String,
    pub country: Option<String>,
    pub year_of_birth: Option<i32>,
    pub level_of_education: Option<String>,
    pub goals: Option<String>,
    pub gender: Option<String>,
    pub registration_date: DateTime<Utc>,
}

/// A stored `pref-lang` preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLanguagePreference {
    pub username: Username,
    pub language_preference: String,
}

/// One registration UTM attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrackingAttribute {
    pub username: Username,
    pub utm_param_name: String,
    pub utm_param_value: String,
}

/// UTM parameters captured at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtmParam {
    Campaign,
    Content,
    Medium,
    Source,
    Term,
}

impl UtmParam {
    /// All parameters in attribute order
    pub const ALL: [UtmParam; 5] = [
        UtmParam::Campaign,
        UtmParam::Content,
        UtmParam::Medium,
        UtmParam::Source,
        UtmParam::Term,
    ];

    /// Name of the `student_userattribute` row holding this parameter
    pub fn attribute_name(self) -> &'static str {
        match self {
            UtmParam::Campaign => "registration_utm_campaign",
            UtmParam::Content => "registration_utm_content",
            UtmParam::Medium => "registration_utm_medium",
            UtmParam::Source => "registration_utm_source",
            UtmParam::Term => "registration_utm_term",
        }
    }

    /// Tracking key, the attribute name without its `registration_` prefix
    pub fn as_str(self) -> &'static str {
        match self {
            UtmParam::Campaign => "utm_campaign",
            UtmParam::Content => "utm_content",
            UtmParam::Medium => "utm_medium",
            UtmParam::Source => "utm_source",
            UtmParam::Term => "utm_term",
        }
    }

    /// Resolves an attribute name, with or without the `registration_` prefix
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        let key = name.strip_prefix("registration_").unwrap_or(name);
        Self::ALL.into_iter().find(|param| param.as_str() == key)
    }
}

impl fmt::Display for UtmParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UTM values keyed by parameter. Parameters without a row are absent.
pub type TrackingData = BTreeMap<UtmParam, String>;

/// Everything known about one learner, ready for sync or reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedUser {
    pub username: Username,
    pub email: String,
    pub full_name: String,
    pub country: Option<String>,
    pub year_of_birth: Option<i32>,
    pub level_of_education: Option<String>,
    pub goals: Option<String>,
    pub gender: Option<String>,
    pub registration_date: DateTime<Utc>,
    pub language: Option<String>,
    pub tracking: TrackingData,
    pub courses: Vec<MergedOrder>,
}

impl MergedUser {
    /// Builds a user from a profile with no language, tracking or purchases
    pub fn from_profile(profile: RawUserProfile) -> Self {
        Self {
            username: profile.username,
            email: profile.email,
            full_name: profile.full_name,
            country: profile.country,
            year_of_birth: profile.year_of_birth,
            level_of_education: profile.level_of_education,
            goals: profile.goals,
            gender: profile.gender,
            registration_date: profile.registration_date,
            language: None,
            tracking: TrackingData::new(),
            courses: Vec::new(),
        }
    }

    /// Looks up a tracking value
    pub fn utm(&self, param: UtmParam) -> Option<&str> {
        self.tracking.get(&param).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn order(quantity: i32, unit_price: &str) -> RawOrder {
        RawOrder {
            username: Username::new("alice").unwrap(),
            order_id: 1,
            purchase_date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            quantity,
            list_price: dec("100.00"),
            unit_price: dec(unit_price),
            course_id: "course-v1:orgX+C1+2024".to_string(),
        }
    }

    #[test]
    fn test_total_price_multiplies_quantity() {
        let merged = MergedOrder::new(order(3, "90.00"), BTreeSet::new());
        assert_eq!(merged.total_price(), dec("270.00"));
    }

    #[test]
    fn test_primary_coupon_is_smallest() {
        let codes: BTreeSet<String> = ["ZED", "ALPHA"].iter().map(|s| s.to_string()).collect();
        let merged = MergedOrder::new(order(1, "90.00"), codes);
        assert_eq!(merged.primary_coupon(), Some("ALPHA"));
    }

    #[test]
    fn test_primary_coupon_none() {
        let merged = MergedOrder::new(order(1, "90.00"), BTreeSet::new());
        assert_eq!(merged.primary_coupon(), None);
    }

    #[test]
    fn test_utm_param_from_attribute_name() {
        assert_eq!(
            UtmParam::from_attribute_name("registration_utm_source"),
            Some(UtmParam::Source)
        );
        assert_eq!(UtmParam::from_attribute_name("utm_term"), Some(UtmParam::Term));
        assert_eq!(UtmParam::from_attribute_name("created_on_site"), None);
    }

    #[test]
    fn test_utm_param_attribute_names_round_trip() {
        for param in UtmParam::ALL {
            assert_eq!(UtmParam::from_attribute_name(param.attribute_name()), Some(param));
        }
    }
}
