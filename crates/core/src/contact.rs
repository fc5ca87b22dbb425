use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::country::CountryCode;
use crate::phone;

pub const FIRST_NAME_REQUIRED: &str = "First name is required";
pub const LAST_NAME_REQUIRED: &str = "Last name is required";
pub const PHONE_REQUIRED: &str = "Phone number is required";

/// A phonebook entry as persisted and returned to callers.
///
/// `id` and `created_at` are assigned by the store and never change;
/// `updated_at` is refreshed on every effective mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub country_code: CountryCode,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a contact.
///
/// Missing text fields deserialize to empty strings so that validation can
/// report every violation at once instead of failing on the first absent
/// field. A missing `country_code` means "use the configured default".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub country_code: Option<CountryCode>,
    pub address: Option<String>,
}

/// Sparse update request. Every field is optional; the merge rules in
/// [`crate::merge`] decide what an absent or blank field means.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub country_code: Option<CountryCode>,
    pub address: Option<String>,
}

/// Error type for create-request validation, carrying every violation found
#[derive(Debug, Clone, PartialEq)]
pub struct NewContactError {
    violations: Vec<String>,
}

impl NewContactError {
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

impl std::fmt::Display for NewContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.violations.join("\n"))
    }
}

impl std::error::Error for NewContactError {}

/// Validate a create request, collecting every violated rule.
///
/// Checks the required text fields for blankness and the phone number for
/// basic shape. Country-aware phone validity is a separate, later step (see
/// [`phone::validate_phone`]); a blank phone reports only the missing-field
/// violation, not a format one.
pub fn validate_new(request: &NewContact) -> Result<(), NewContactError> {
    let mut violations = Vec::new();

    if request.first_name.trim().is_empty() {
        violations.push(FIRST_NAME_REQUIRED.to_string());
    }
    if request.last_name.trim().is_empty() {
        violations.push(LAST_NAME_REQUIRED.to_string());
    }
    if request.phone.trim().is_empty() {
        violations.push(PHONE_REQUIRED.to_string());
    } else if !phone::is_format_valid(&request.phone) {
        violations.push(phone::PHONE_NUMBER_ERROR.to_string());
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(NewContactError { violations })
    }
}
