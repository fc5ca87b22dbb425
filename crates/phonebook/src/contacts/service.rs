//! Service orchestration: guard → repository → merge/validate → repository.
//!
//! Every public operation maps one-to-one onto an HTTP endpoint. Domain
//! errors are raised here (or below, in the repository) and travel unmodified
//! to the HTTP boundary.

use std::sync::Arc;

use phonebook_core::contact::{self, Contact, ContactUpdate, NewContact};
use phonebook_core::country::CountryCode;
use phonebook_core::merge::merge_contact;
use phonebook_core::pagination::{self, Page};
use phonebook_core::phone;

use crate::error::Error;

use super::repository::{ContactDraft, ContactRepository};
use super::CONTACT_NOT_FOUND_ERROR;

pub struct ContactService {
    repository: Arc<dyn ContactRepository>,
    default_country: CountryCode,
}

impl ContactService {
    pub fn new(repository: Arc<dyn ContactRepository>, default_country: CountryCode) -> Self {
        Self {
            repository,
            default_country,
        }
    }

    /// Paginated listing. Strictly rejects out-of-bounds page/size.
    pub fn list(&self, page: i64, size: i64) -> Result<Page<Contact>, Error> {
        pagination::check_page_and_size(page, size)
            .map_err(|err| Error::BadRequest(err.to_string()))?;

        log::debug!("Fetching contacts page {page} with size {size}");
        self.repository.find_page(page, size)
    }

    pub fn get(&self, id: i64) -> Result<Contact, Error> {
        log::debug!("Fetching contact with id: {id}");
        self.repository
            .find_by_id(id)?
            .ok_or_else(|| not_found(id))
    }

    /// Create a contact. Field violations are collected and reported
    /// together; the phone must also be valid for the (possibly defaulted)
    /// country before anything is persisted.
    pub fn create(&self, request: &NewContact) -> Result<Contact, Error> {
        contact::validate_new(request).map_err(|err| Error::BadRequest(err.to_string()))?;

        let country_code = request.country_code.unwrap_or(self.default_country);
        phone::validate_phone(&request.phone, country_code)
            .map_err(|err| Error::BadRequest(err.to_string()))?;

        let draft = ContactDraft {
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            phone: request.phone.clone(),
            country_code,
            address: request.address.clone(),
        };

        let created = self.repository.insert(&draft)?;
        log::info!("Created new contact with id: {}", created.id);
        Ok(created)
    }

    /// Merge a sparse update onto the stored contact. The merged phone and
    /// country pair is re-validated before persisting; a failure aborts the
    /// whole update. A merge that changes nothing skips the write, so the
    /// stored record (`updated_at` included) is returned untouched.
    pub fn update(&self, id: i64, request: &ContactUpdate) -> Result<Contact, Error> {
        log::debug!("Updating contact with id: {id}");
        let existing = self.get(id)?;
        let merged = merge_contact(&existing, request);

        phone::validate_phone(&merged.phone, merged.country_code)
            .map_err(|err| Error::BadRequest(err.to_string()))?;

        if merged == existing {
            log::debug!("Update for contact {id} is a no-op");
            return Ok(existing);
        }

        let updated = self.repository.update(&merged)?;
        log::info!("Updated contact with id: {}", updated.id);
        Ok(updated)
    }

    pub fn delete(&self, id: i64) -> Result<(), Error> {
        log::debug!("Deleting contact with id: {id}");
        let existing = self.get(id)?;

        if !self.repository.delete(existing.id)? {
            return Err(not_found(id));
        }
        log::info!("Deleted contact with id: {id}");
        Ok(())
    }

    /// Substring search. Oversized page sizes are clamped to the ceiling
    /// instead of rejected; a negative page or size is still an error.
    pub fn search(&self, term: &str, page: i64, size: i64) -> Result<Page<Contact>, Error> {
        let size = pagination::clamp_size(size);
        pagination::check_page_and_size(page, size)
            .map_err(|err| Error::BadRequest(err.to_string()))?;

        log::debug!("Searching contacts for {term:?}, page {page} size {size}");
        self.repository.search(term, page, size)
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("{CONTACT_NOT_FOUND_ERROR}{id}"))
}
