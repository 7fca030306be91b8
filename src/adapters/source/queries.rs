//! SQL for the source databases and row decoding
//!
//! Every value is passed as a bound parameter. Set filters use
//! `= ANY($1)` and the org filter is a single regex parameter.

use crate::domain::records::UtmParam;
use crate::domain::{
    RawCoupon, RawLanguagePreference, RawOrder, RawTrackingAttribute, RawUserProfile, Result,
    SourceError, Username,
};
use tokio_postgres::Row;

/// Purchased course lines for courses owned by the given orgs (ecommerce)
pub const ORDERS_FOR_ORGS: &str = r#"
    SELECT
        u.username AS username,
        o.id::bigint AS order_id,
        o.date_placed AS purchase_date,
        l.quantity::integer AS quantity,
        l.line_price_before_discounts_incl_tax AS list_price,
        l.line_price_incl_tax AS unit_price,
        p.course_id AS course_id
    FROM order_line AS l
    JOIN order_order AS o ON l.order_id = o.id
    JOIN catalogue_product AS p ON l.product_id = p.id
    JOIN ecommerce_user AS u ON o.user_id = u.id
    WHERE p.course_id ~ $1
    ORDER BY o.id, l.id
"#;

/// Voucher codes applied to the given orders (ecommerce)
pub const COUPON_CODES_FOR_ORDERS: &str = r#"
    SELECT
        o.id::bigint AS order_id,
        v.code AS coupon_code
    FROM order_order AS o
    JOIN voucher_voucherapplication AS va ON va.order_id = o.id
    JOIN voucher_voucher AS v ON v.id = va.voucher_id
    WHERE o.id = ANY($1::bigint[])
"#;

/// Accounts registered on a site (default)
pub const USERS_FOR_SITE: &str = r#"
    SELECT
        u.username AS username
    FROM auth_user AS u
    JOIN student_userattribute AS ua ON ua.user_id = u.id
    WHERE ua.name = 'created_on_site'
      AND ua.value = $1
"#;

/// Account and profile data for the given usernames (default)
pub const USERS_FOR_USERNAMES: &str = r#"
    SELECT
        u.username AS username,
        LOWER(u.email) AS email,
        p.name AS full_name,
        p.country AS country,
        p.year_of_birth AS year_of_birth,
        p.level_of_education AS level_of_education,
        p.goals AS goals,
        p.gender AS gender,
        u.date_joined AS registration_date
    FROM auth_user AS u
    JOIN auth_userprofile AS p ON p.user_id = u.id
    WHERE u.username = ANY($1::text[])
    ORDER BY u.id
"#;

/// Stored `pref-lang` preferences, oldest first (default)
pub const LANGUAGE_PREFS_FOR_USERNAMES: &str = r#"
    SELECT
        u.username AS username,
        up.value AS language_preference
    FROM auth_user AS u
    JOIN user_api_userpreference AS up ON up.user_id = u.id
    WHERE up.key = 'pref-lang'
      AND u.username = ANY($1::text[])
    ORDER BY up.id
"#;

/// Registration UTM attributes (default)
pub const TRACKING_DATA_FOR_USERNAMES: &str = r#"
    SELECT
        u.username AS username,
        ua.name AS utm_param_name,
        ua.value AS utm_param_value
    FROM auth_user AS u
    JOIN student_userattribute AS ua ON ua.user_id = u.id
    WHERE ua.name = ANY($1::text[])
      AND u.username = ANY($2::text[])
"#;

/// Builds the course id pattern `^course-v1:(org1|org2|...).*$`
///
/// Org names are escaped and match literally.
///
/// # Errors
///
/// Returns an error for an empty org list or a blank org name.
pub fn org_course_pattern(orgs: &[String]) -> std::result::Result<String, SourceError> {
    if orgs.is_empty() {
        return Err(SourceError::InvalidOrgFilter(
            "at least one organization is required".to_string(),
        ));
    }
    if let Some(blank) = orgs.iter().find(|org| org.trim().is_empty()) {
        return Err(SourceError::InvalidOrgFilter(format!(
            "organization names cannot be blank, got '{blank}'"
        )));
    }

    let alternation = orgs
        .iter()
        .map(|org| regex::escape(org))
        .collect::<Vec<_>>()
        .join("|");
    Ok(format!("^course-v1:({alternation}).*$"))
}

/// Attribute names of the five UTM parameters
pub fn utm_attribute_names() -> Vec<String> {
    UtmParam::ALL
        .iter()
        .map(|param| param.attribute_name().to_string())
        .collect()
}

fn decode_err(query: &str, e: impl std::fmt::Display) -> SourceError {
    SourceError::DecodeFailed {
        query: query.to_string(),
        message: e.to_string(),
    }
}

fn username(row: &Row, query: &str) -> Result<Username> {
    let raw: String = row.try_get("username").map_err(|e| decode_err(query, e))?;
    Ok(Username::new(raw).map_err(|e| decode_err(query, e))?)
}

pub fn decode_order(row: &Row) -> Result<RawOrder> {
    const Q: &str = "orders_for_orgs";
    let get = |e| decode_err(Q, e);
    Ok(RawOrder {
        username: username(row, Q)?,
        order_id: row.try_get("order_id").map_err(get)?,
        purchase_date: row.try_get("purchase_date").map_err(get)?,
        quantity: row.try_get("quantity").map_err(get)?,
        list_price: row.try_get("list_price").map_err(get)?,
        unit_price: row.try_get("unit_price").map_err(get)?,
        course_id: row.try_get("course_id").map_err(get)?,
    })
}

pub fn decode_coupon(row: &Row) -> Result<RawCoupon> {
    const Q: &str = "coupon_codes_for_orders";
    let get = |e| decode_err(Q, e);
    Ok(RawCoupon {
        order_id: row.try_get("order_id").map_err(get)?,
        coupon_code: row.try_get("coupon_code").map_err(get)?,
    })
}

pub fn decode_site_user(row: &Row) -> Result<Username> {
    username(row, "users_for_site")
}

pub fn decode_profile(row: &Row) -> Result<RawUserProfile> {
    const Q: &str = "users_for_usernames";
    let get = |e| decode_err(Q, e);
    Ok(RawUserProfile {
        username: username(row, Q)?,
        email: row.try_get("email").map_err(get)?,
        full_name: row.try_get("full_name").map_err(get)?,
        country: row.try_get("country").map_err(get)?,
        year_of_birth: row.try_get("year_of_birth").map_err(get)?,
        level_of_education: row.try_get("level_of_education").map_err(get)?,
        goals: row.try_get("goals").map_err(get)?,
        gender: row.try_get("gender").map_err(get)?,
        registration_date: row.try_get("registration_date").map_err(get)?,
    })
}

pub fn decode_language_preference(row: &Row) -> Result<RawLanguagePreference> {
    const Q: &str = "language_prefs_for_usernames";
    Ok(RawLanguagePreference {
        username: username(row, Q)?,
        language_preference: row
            .try_get("language_preference")
            .map_err(|e| decode_err(Q, e))?,
    })
}

pub fn decode_tracking(row: &Row) -> Result<RawTrackingAttribute> {
    const Q: &str = "tracking_data_for_usernames";
    let get = |e| decode_err(Q, e);
    Ok(RawTrackingAttribute {
        username: username(row, Q)?,
        utm_param_name: row.try_get("utm_param_name").map_err(get)?,
        utm_param_value: row.try_get("utm_param_value").map_err(get)?,
    })
}
