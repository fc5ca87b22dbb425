//! Read-through cache decorator over a [`ContactRepository`].
//!
//! Purely an accelerator: reads check the cache first and fall back to the
//! inner repository, every successful write invalidates all cached entries.
//! The inner repository remains the source of truth; nothing here affects
//! correctness.

use std::collections::HashMap;

use parking_lot::Mutex;

use phonebook_core::contact::Contact;
use phonebook_core::pagination::Page;

use crate::error::Error;

use super::repository::{ContactDraft, ContactRepository};

pub struct CachedContactRepository<R> {
    inner: R,
    by_id: Mutex<HashMap<i64, Contact>>,
    list_pages: Mutex<HashMap<(i64, i64), Page<Contact>>>,
    search_pages: Mutex<HashMap<(String, i64, i64), Page<Contact>>>,
}

impl<R: ContactRepository> CachedContactRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            by_id: Mutex::new(HashMap::new()),
            list_pages: Mutex::new(HashMap::new()),
            search_pages: Mutex::new(HashMap::new()),
        }
    }

    fn invalidate(&self) {
        self.by_id.lock().clear();
        self.list_pages.lock().clear();
        self.search_pages.lock().clear();
    }
}

impl<R: ContactRepository> ContactRepository for CachedContactRepository<R> {
    fn find_page(&self, page: i64, size: i64) -> Result<Page<Contact>, Error> {
        if let Some(cached) = self.list_pages.lock().get(&(page, size)) {
            log::debug!("List page ({page}, {size}) served from cache");
            return Ok(cached.clone());
        }

        let fetched = self.inner.find_page(page, size)?;
        self.list_pages.lock().insert((page, size), fetched.clone());
        Ok(fetched)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Contact>, Error> {
        if let Some(cached) = self.by_id.lock().get(&id) {
            log::debug!("Contact {id} served from cache");
            return Ok(Some(cached.clone()));
        }

        let fetched = self.inner.find_by_id(id)?;
        if let Some(contact) = &fetched {
            self.by_id.lock().insert(id, contact.clone());
        }
        Ok(fetched)
    }

    fn insert(&self, draft: &ContactDraft) -> Result<Contact, Error> {
        let created = self.inner.insert(draft)?;
        self.invalidate();
        Ok(created)
    }

    fn update(&self, contact: &Contact) -> Result<Contact, Error> {
        let updated = self.inner.update(contact)?;
        self.invalidate();
        Ok(updated)
    }

    fn delete(&self, id: i64) -> Result<bool, Error> {
        let removed = self.inner.delete(id)?;
        if removed {
            self.invalidate();
        }
        Ok(removed)
    }

    fn search(&self, term: &str, page: i64, size: i64) -> Result<Page<Contact>, Error> {
        let key = (term.to_string(), page, size);
        if let Some(cached) = self.search_pages.lock().get(&key) {
            log::debug!("Search page for {term:?} served from cache");
            return Ok(cached.clone());
        }

        let fetched = self.inner.search(term, page, size)?;
        self.search_pages.lock().insert(key, fetched.clone());
        Ok(fetched)
    }
}
