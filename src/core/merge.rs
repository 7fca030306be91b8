//! Correlation of raw source records into per-user records

use crate::domain::{
    MergedOrder, MergedUser, RawCoupon, RawLanguagePreference, RawOrder, RawTrackingAttribute,
    RawUserProfile, TrackingData, UtmParam, Username,
};
use std::collections::{BTreeSet, HashMap};

/// Attaches coupon codes to their orders
///
/// Every order appears exactly once, in input order, with the set of
/// codes applied to its order id (empty if none).
pub fn merge_orders(orders: Vec<RawOrder>, coupons: Vec<RawCoupon>) -> Vec<MergedOrder> {
    let mut codes_by_order: HashMap<i64, BTreeSet<String>> = HashMap::new();
    for coupon in coupons {
        codes_by_order
            .entry(coupon.order_id)
            .or_default()
            .insert(coupon.coupon_code);
    }

    orders
        .into_iter()
        .map(|order| {
            let codes = codes_by_order
                .get(&order.order_id)
                .cloned()
                .unwrap_or_default();
            MergedOrder::new(order, codes)
        })
        .collect()
}

/// Builds one [`MergedUser`] per profile
///
/// Purchases keep their input order. When a user has several language
/// preferences the last one wins. Tracking attributes with an unknown
/// name are dropped. Never fails; missing data yields defaults.
pub fn merge_users(
    profiles: Vec<RawUserProfile>,
    language_prefs: Vec<RawLanguagePreference>,
    tracking: Vec<RawTrackingAttribute>,
    orders: Vec<MergedOrder>,
) -> Vec<MergedUser> {
    let mut orders_by_user: HashMap<Username, Vec<MergedOrder>> = HashMap::new();
    for order in orders {
        orders_by_user
            .entry(order.username.clone())
            .or_default()
            .push(order);
    }

    let mut language_by_user: HashMap<Username, String> = HashMap::new();
    for pref in language_prefs {
        language_by_user.insert(pref.username, pref.language_preference);
    }

    let mut tracking_by_user: HashMap<Username, TrackingData> = HashMap::new();
    for attr in tracking {
        match UtmParam::from_attribute_name(&attr.utm_param_name) {
            Some(param) => {
                tracking_by_user
                    .entry(attr.username)
                    .or_default()
                    .insert(param, attr.utm_param_value);
            }
            None => tracing::debug!(
                username = %attr.username,
                name = %attr.utm_param_name,
                "Ignoring unknown tracking attribute"
            ),
        }
    }

    profiles
        .into_iter()
        .map(|profile| {
            let mut user = MergedUser::from_profile(profile);
            user.courses = orders_by_user
                .get(&user.username)
                .cloned()
                .unwrap_or_default();
            user.language = language_by_user.get(&user.username).cloned();
            user.tracking = tracking_by_user
                .get(&user.username)
                .cloned()
                .unwrap_or_default();
            user
        })
        .collect()
}
