use crate::contact::{Contact, ContactUpdate};

/// Apply a sparse update onto an existing contact, returning the merged value.
///
/// Per-field rules:
/// - `first_name`, `last_name`, `phone`: replaced only when the request value
///   is present, non-blank, and different from the stored one.
/// - `country_code`: replaced when present and different.
/// - `address`: replaced when present and different. An explicit empty string
///   clears the address; an absent field leaves it untouched.
///
/// The existing contact is never mutated; `id`, `created_at` and `updated_at`
/// carry over unchanged. Callers must re-validate the merged phone and
/// country pair before persisting.
pub fn merge_contact(existing: &Contact, update: &ContactUpdate) -> Contact {
    let mut merged = existing.clone();

    if let Some(first_name) = non_blank(&update.first_name) {
        if first_name != merged.first_name {
            merged.first_name = first_name.to_string();
        }
    }
    if let Some(last_name) = non_blank(&update.last_name) {
        if last_name != merged.last_name {
            merged.last_name = last_name.to_string();
        }
    }
    if let Some(phone) = non_blank(&update.phone) {
        if phone != merged.phone {
            merged.phone = phone.to_string();
        }
    }
    if let Some(country_code) = update.country_code {
        if country_code != merged.country_code {
            merged.country_code = country_code;
        }
    }
    if let Some(address) = &update.address {
        if merged.address.as_deref() != Some(address) {
            merged.address = Some(address.clone());
        }
    }

    merged
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}
