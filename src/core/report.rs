//! CSV report of merged user accounts

use crate::domain::choices::{country_name, education_label, language_name};
use crate::domain::{MergedUser, Result, UtmParam};
use chrono::{DateTime, Local};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column headers, in output order
pub const REPORT_HEADER: [&str; 15] = [
    "Email",
    "Username",
    "Full Name",
    "Country",
    "Year of Birth",
    "Language",
    "Level of Education",
    "Interest",
    "Registration Date",
    "UTM Campaign",
    "UTM Content",
    "UTM Source",
    "UTM Medium",
    "UTM Term",
    "Course Runs",
];

/// UTM columns follow the header, which lists source before medium
const UTM_COLUMNS: [UtmParam; 5] = [
    UtmParam::Campaign,
    UtmParam::Content,
    UtmParam::Source,
    UtmParam::Medium,
    UtmParam::Term,
];

/// `user_accounts_<site>_<YYYYMMDD-HHMMSS>.csv`
pub fn report_file_name(site_domain: &str, timestamp: DateTime<Local>) -> String {
    format!(
        "user_accounts_{}_{}.csv",
        site_domain,
        timestamp.format("%Y%m%d-%H%M%S")
    )
}

/// Renders one user as a report row
pub fn report_row(user: &MergedUser) -> Vec<String> {
    let display = |value: Option<&str>| value.unwrap_or_default().to_string();

    let mut row = vec![
        user.email.clone(),
        user.username.to_string(),
        user.full_name.clone(),
        display(country_name(user.country.as_deref())),
        user.year_of_birth
            .map(|year| year.to_string())
            .unwrap_or_default(),
        display(language_name(user.language.as_deref())),
        display(education_label(user.level_of_education.as_deref())),
        user.goals.clone().unwrap_or_default(),
        user.registration_date.format("%Y-%m-%d").to_string(),
    ];
    row.extend(UTM_COLUMNS.iter().map(|param| display(user.utm(*param))));
    row.push(
        user.courses
            .iter()
            .map(|course| course.course_id.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    );
    row
}

/// Writes the header and one row per user
pub fn write_rows<W: Write>(writer: W, users: &[MergedUser]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(REPORT_HEADER)?;
    for user in users {
        csv_writer.write_record(report_row(user))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the report file for a site into `output_dir`
///
/// The directory is created if it does not exist. Returns the path of the
/// written file.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_report(users: &[MergedUser], site_domain: &str, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let path = output_dir.join(report_file_name(site_domain, Local::now()));
    let file = fs::File::create(&path)?;
    write_rows(file, users)?;

    tracing::info!(path = %path.display(), rows = users.len(), "Wrote user account report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MergedOrder, RawOrder, RawUserProfile, Username};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::collections::BTreeSet;

    fn bob() -> MergedUser {
        let mut user = MergedUser::from_profile(RawUserProfile {
            username: Username::new("bob").unwrap(),
            email: "bob@example.com".to_string(),
            full_name: "Bob Jones".to_string(),
            country: Some("ca".to_string()),
            year_of_birth: Some(1979),
            level_of_education: Some("B".to_string()),
            goals: Some("career change".to_string()),
            gender: Some("m".to_string()),
            registration_date: Utc.with_ymd_and_hms(2022, 7, 4, 23, 30, 0).unwrap(),
        });
        user.language = Some("en".to_string());
        user.tracking.insert(UtmParam::Source, "ads".to_string());
        user.tracking.insert(UtmParam::Medium, "cpc".to_string());
        for course_id in ["course-v1:OrgX+C1+2024", "course-v1:OrgX+C2+2024"] {
            user.courses.push(MergedOrder::new(
                RawOrder {
                    username: user.username.clone(),
                    order_id: 1,
                    purchase_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                    quantity: 1,
                    list_price: Decimal::new(5000, 2),
                    unit_price: Decimal::new(5000, 2),
                    course_id: course_id.to_string(),
                },
                BTreeSet::new(),
            ));
        }
        user
    }

    #[test]
    fn test_report_row_renders_display_values() {
        let row = report_row(&bob());
        assert_eq!(row.len(), REPORT_HEADER.len());
        assert_eq!(
            row,
            vec![
                "bob@example.com",
                "bob",
                "Bob Jones",
                "Canada",
                "1979",
                "English",
                "Bachelor's degree",
                "career change",
                "2022-07-04",
                "",
                "",
                "ads",
                "cpc",
                "",
                "course-v1:OrgX+C1+2024 course-v1:OrgX+C2+2024",
            ]
        );
    }

    #[test]
    fn test_report_row_missing_values_are_empty() {
        let mut user = bob();
        user.country = None;
        user.year_of_birth = None;
        user.language = Some("xx".to_string());
        user.goals = None;
        user.courses.clear();

        let row = report_row(&user);
        assert_eq!(row[3], "");
        assert_eq!(row[4], "");
        assert_eq!(row[5], "");
        assert_eq!(row[7], "");
        assert_eq!(row[14], "");
    }

    #[test]
    fn test_write_rows_header_first() {
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &[bob()]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(REPORT_HEADER.join(",").as_str()));
        assert!(lines.next().unwrap().starts_with("bob@example.com,bob,Bob Jones,Canada"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_report_file_name() {
        let timestamp = Local.with_ymd_and_hms(2024, 2, 9, 8, 5, 3).unwrap();
        assert_eq!(
            report_file_name("courses.example.com", timestamp),
            "user_accounts_courses.example.com_20240209-080503.csv"
        );
    }

    #[test]
    fn test_write_report_creates_output_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested").join("output");

        let path = write_report(&[bob()], "courses.example.com", &output_dir).unwrap();

        assert!(path.starts_with(&output_dir));
        assert!(path.exists());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
