use regex::Regex;

use crate::country::CountryCode;

pub const PHONE_NUMBER_ERROR: &str = "The input phone number is not valid";

/// Accepts the common human formats: optional leading `+`, country-code
/// prefix, spaces, dashes and parentheses around the area code.
const PHONE_FORMAT: &str =
    r"^\+?(\d{1,3})?[- ]?\(?(\d{1,4})\)?[- ]?(\d{1,4})[- ]?(\d{1,4})[- ]?(\d{1,9})$";

/// Error type for phone validation. Parse failures and parsed-but-invalid
/// numbers are indistinguishable to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneError;

impl std::fmt::Display for PhoneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(PHONE_NUMBER_ERROR)
    }
}

impl std::error::Error for PhoneError {}

/// Cheap shape check applied before the numbering-plan lookup.
pub fn is_format_valid(phone: &str) -> bool {
    let re = Regex::new(PHONE_FORMAT).unwrap();
    re.is_match(phone)
}

/// Validate a phone number against a country's numbering plan.
///
/// The number must match the format regex, parse for the given region, and be
/// structurally valid there (correct length and prefix). Pure function; the
/// input is normalized internally by the parser, never mutated.
pub fn validate_phone(phone: &str, country: CountryCode) -> Result<(), PhoneError> {
    if !is_format_valid(phone) {
        return Err(PhoneError);
    }

    match phonenumber::parse(Some(country.region()), phone) {
        Ok(parsed) if phonenumber::is_valid(&parsed) => Ok(()),
        _ => Err(PhoneError),
    }
}
