use crate::contact::Contact;

/// Does `term` appear as a case-insensitive substring in any of the four
/// searchable fields? A contact with no address never matches on address.
///
/// This is the reference predicate for the store-side LIKE filter built by
/// [`like_pattern`]; the two must agree.
pub fn matches_term(contact: &Contact, term: &str) -> bool {
    let needle = term.to_lowercase();

    contact.first_name.to_lowercase().contains(&needle)
        || contact.last_name.to_lowercase().contains(&needle)
        || contact.phone.to_lowercase().contains(&needle)
        || contact
            .address
            .as_deref()
            .is_some_and(|address| address.to_lowercase().contains(&needle))
}

/// Build the lowercase `%term%` pattern for a parameterized
/// `LIKE ... ESCAPE '\'` filter. LIKE metacharacters in the term are escaped
/// so they match literally.
pub fn like_pattern(term: &str) -> String {
    let lowered = term.to_lowercase();
    let mut escaped = String::with_capacity(lowered.len() + 2);

    escaped.push('%');
    for c in lowered.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');

    escaped
}
