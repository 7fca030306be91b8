//! Field-level change detection for Lead and Contact records

use crate::adapters::crm::PersonFields;
use crate::domain::choices::{country_name, education_label, language_name};
use crate::domain::MergedUser;
use chrono::SubsecRound;

/// Assigns `value` to `slot` if they differ
///
/// Returns `true` when the slot changed.
pub fn update_field<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot != value {
        *slot = value;
        true
    } else {
        false
    }
}

/// Splits a display name into first and last name
///
/// Whitespace is trimmed and collapsed, then the name is split at the last
/// space. A single word is all last name.
pub fn parse_full_name(full_name: &str) -> (Option<String>, String) {
    let normalized = full_name.split_whitespace().collect::<Vec<_>>().join(" ");
    match normalized.rsplit_once(' ') {
        Some((first, last)) => (Some(first.to_string()), last.to_string()),
        None => (None, normalized),
    }
}

/// Brings the person fields of a Lead or Contact in line with `user`
///
/// Every field is compared; returns `true` if any of them changed.
pub fn update_person(fields: &mut PersonFields, user: &MergedUser) -> bool {
    let (first_name, last_name) = parse_full_name(&user.full_name);
    let interest = user
        .goals
        .as_deref()
        .map(str::trim)
        .filter(|goals| !goals.is_empty())
        .map(str::to_string);
    let gender = user
        .gender
        .as_deref()
        .map(str::to_uppercase)
        .filter(|gender| !gender.is_empty());

    let updates = [
        update_field(&mut fields.email, Some(user.email.clone())),
        update_field(&mut fields.first_name, first_name),
        update_field(&mut fields.last_name, Some(last_name)),
        update_field(
            &mut fields.country,
            country_name(user.country.as_deref()).map(str::to_string),
        ),
        update_field(
            &mut fields.year_of_birth,
            user.year_of_birth.map(|year| year.to_string()),
        ),
        update_field(
            &mut fields.language,
            language_name(user.language.as_deref()).map(str::to_string),
        ),
        update_field(
            &mut fields.level_of_education,
            education_label(user.level_of_education.as_deref()).map(str::to_string),
        ),
        update_field(&mut fields.interest, interest),
        update_field(&mut fields.gender, gender),
        // Salesforce datetimes have no sub-second precision
        update_field(
            &mut fields.registration_date,
            Some(user.registration_date.trunc_subsecs(0)),
        ),
    ];

    updates.iter().any(|changed| *changed)
}
