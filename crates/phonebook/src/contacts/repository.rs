//! Contact persistence: the repository contract and its SQLite
//! implementation.
//!
//! Phone uniqueness lives here as a `UNIQUE` constraint, never as an
//! application-level pre-check: pre-checking is racy under concurrent
//! creates, the constraint is not. Violations surface as [`Error::Conflict`].

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use phonebook_core::contact::Contact;
use phonebook_core::country::CountryCode;
use phonebook_core::pagination::{offset, Page};
use phonebook_core::search::like_pattern;

use crate::error::Error;

use super::CONTACT_NOT_FOUND_ERROR;

/// A contact ready to persist, before the store has assigned identity and
/// timestamps.
#[derive(Debug, Clone)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub country_code: CountryCode,
    pub address: Option<String>,
}

/// Persistence contract for contact records.
///
/// Page queries return rows in the store's default order. Totals are always
/// computed over the same (possibly filtered) set the page was sliced from.
pub trait ContactRepository: Send + Sync {
    fn find_page(&self, page: i64, size: i64) -> Result<Page<Contact>, Error>;
    fn find_by_id(&self, id: i64) -> Result<Option<Contact>, Error>;
    fn insert(&self, draft: &ContactDraft) -> Result<Contact, Error>;
    fn update(&self, contact: &Contact) -> Result<Contact, Error>;
    fn delete(&self, id: i64) -> Result<bool, Error>;
    fn search(&self, term: &str, page: i64, size: i64) -> Result<Page<Contact>, Error>;
}

const CONTACT_COLUMNS: &str =
    "id, first_name, last_name, phone, country_code, address, created_at, updated_at";

const SEARCH_FILTER: &str = r"LOWER(first_name) LIKE ?1 ESCAPE '\'
       OR LOWER(last_name) LIKE ?1 ESCAPE '\'
       OR LOWER(phone) LIKE ?1 ESCAPE '\'
       OR LOWER(address) LIKE ?1 ESCAPE '\'";

/// SQLite-backed repository. All access is serialized through a mutex; every
/// write runs in a transaction so a failure never leaves a partial record.
pub struct SqliteContactRepository {
    conn: Mutex<Connection>,
}

impl SqliteContactRepository {
    /// Open or create a database at the given path. Creates schema if needed.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path).map_err(storage_error)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(storage_error)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(storage_error)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, Error> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS contacts (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name   TEXT NOT NULL,
                last_name    TEXT NOT NULL,
                phone        TEXT NOT NULL UNIQUE,
                country_code TEXT NOT NULL,
                address      TEXT,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            );
            ",
        )
        .map_err(storage_error)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ContactRepository for SqliteContactRepository {
    fn find_page(&self, page: i64, size: i64) -> Result<Page<Contact>, Error> {
        let conn = self.conn.lock();

        let total = conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(storage_error)? as u64;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts LIMIT ?1 OFFSET ?2"
            ))
            .map_err(storage_error)?;
        let rows = stmt
            .query_map(params![size, offset(page, size)], contact_from_row)
            .map_err(storage_error)?;

        let mut content = Vec::new();
        for row in rows {
            content.push(row.map_err(storage_error)?);
        }

        Ok(Page::new(content, page, size, total))
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Contact>, Error> {
        let conn = self.conn.lock();

        conn.query_row(
            &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
            params![id],
            contact_from_row,
        )
        .optional()
        .map_err(storage_error)
    }

    fn insert(&self, draft: &ContactDraft) -> Result<Contact, Error> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(storage_error)?;

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO contacts (first_name, last_name, phone, country_code, address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                draft.first_name,
                draft.last_name,
                draft.phone,
                draft.country_code.as_str(),
                draft.address,
                now,
                now,
            ],
        )
        .map_err(storage_error)?;

        let id = tx.last_insert_rowid();
        let contact = tx
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id],
                contact_from_row,
            )
            .map_err(storage_error)?;
        tx.commit().map_err(storage_error)?;

        Ok(contact)
    }

    fn update(&self, contact: &Contact) -> Result<Contact, Error> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(storage_error)?;

        let affected = tx
            .execute(
                "UPDATE contacts
                 SET first_name = ?1, last_name = ?2, phone = ?3, country_code = ?4,
                     address = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    contact.first_name,
                    contact.last_name,
                    contact.phone,
                    contact.country_code.as_str(),
                    contact.address,
                    Utc::now().to_rfc3339(),
                    contact.id,
                ],
            )
            .map_err(storage_error)?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "{CONTACT_NOT_FOUND_ERROR}{}",
                contact.id
            )));
        }

        let updated = tx
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![contact.id],
                contact_from_row,
            )
            .map_err(storage_error)?;
        tx.commit().map_err(storage_error)?;

        Ok(updated)
    }

    fn delete(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock();

        let affected = conn
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])
            .map_err(storage_error)?;

        Ok(affected > 0)
    }

    fn search(&self, term: &str, page: i64, size: i64) -> Result<Page<Contact>, Error> {
        let conn = self.conn.lock();
        let pattern = like_pattern(term);

        let total = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM contacts WHERE {SEARCH_FILTER}"),
                params![pattern],
                |row| row.get::<_, i64>(0),
            )
            .map_err(storage_error)? as u64;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts WHERE {SEARCH_FILTER} LIMIT ?2 OFFSET ?3"
            ))
            .map_err(storage_error)?;
        let rows = stmt
            .query_map(params![pattern, size, offset(page, size)], contact_from_row)
            .map_err(storage_error)?;

        let mut content = Vec::new();
        for row in rows {
            content.push(row.map_err(storage_error)?);
        }

        Ok(Page::new(content, page, size, total))
    }
}

fn contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    let country: String = row.get(4)?;
    let created: String = row.get(6)?;
    let updated: String = row.get(7)?;

    Ok(Contact {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        phone: row.get(3)?,
        country_code: country.parse().map_err(|e| conversion_error(4, e))?,
        address: row.get(5)?,
        created_at: parse_timestamp(6, &created)?,
        updated_at: parse_timestamp(7, &updated)?,
    })
}

fn parse_timestamp(index: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(index, e))
}

fn conversion_error<E>(index: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
}

/// Uniqueness violations become `Conflict`; everything else is unanticipated
/// and logged at the boundary as `Internal`.
fn storage_error(err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::Conflict(format!("Data restriction error: {err}"))
        }
        _ => Error::Internal(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn draft(first: &str, last: &str, phone: &str) -> ContactDraft {
        ContactDraft {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: phone.to_string(),
            country_code: CountryCode::US,
            address: None,
        }
    }

    fn repo() -> SqliteContactRepository {
        SqliteContactRepository::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_assigns_id_and_timestamps() {
        let repo = repo();
        let created = repo.insert(&draft("John", "Doe", "+12025550139")).unwrap();

        assert!(created.id > 0);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(created.phone, "+12025550139");
    }

    #[test]
    fn test_insert_then_find_round_trips() {
        let repo = repo();
        let mut expected = draft("John", "Doe", "+12025550139");
        expected.address = Some("123 Old St".to_string());

        let created = repo.insert(&expected).unwrap();
        let fetched = repo.find_by_id(created.id).unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.address.as_deref(), Some("123 Old St"));
    }

    #[test]
    fn test_find_by_id_missing_is_none() {
        assert_eq!(repo().find_by_id(42).unwrap(), None);
    }

    #[test]
    fn test_duplicate_phone_is_a_conflict() {
        let repo = repo();
        repo.insert(&draft("John", "Doe", "+12025550139")).unwrap();

        let err = repo
            .insert(&draft("Jane", "Smith", "+12025550139"))
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_concurrent_creates_with_same_phone_have_one_winner() {
        let repo = Arc::new(repo());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let repo = Arc::clone(&repo);
                std::thread::spawn(move || repo.insert(&draft("John", "Doe", "+12025550139")))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(Error::Conflict(_))))
            .count();

        assert_eq!(winners, 1);
        assert_eq!(conflicts, 1);
    }

    #[test]
    fn test_update_refreshes_updated_at_only() {
        let repo = repo();
        let created = repo.insert(&draft("John", "Doe", "+12025550139")).unwrap();

        let mut changed = created.clone();
        changed.first_name = "Jane".to_string();
        let updated = repo.update(&changed).unwrap();

        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_update_missing_contact_is_not_found() {
        let repo = repo();
        let mut ghost = repo.insert(&draft("John", "Doe", "+12025550139")).unwrap();
        assert!(repo.delete(ghost.id).unwrap());

        ghost.first_name = "Jane".to_string();
        let err = repo.update(&ghost).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_delete_then_find_is_none() {
        let repo = repo();
        let created = repo.insert(&draft("John", "Doe", "+12025550139")).unwrap();

        assert!(repo.delete(created.id).unwrap());
        assert_eq!(repo.find_by_id(created.id).unwrap(), None);
        assert!(!repo.delete(created.id).unwrap());
    }

    #[test]
    fn test_find_page_slices_and_counts() {
        let repo = repo();
        for i in 0..5 {
            repo.insert(&draft("John", "Doe", &format!("+1202555013{i}")))
                .unwrap();
        }

        let page = repo.find_page(0, 2).unwrap();
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);

        let last = repo.find_page(2, 2).unwrap();
        assert_eq!(last.content.len(), 1);
    }

    #[test]
    fn test_search_filters_and_counts_over_filtered_set() {
        let repo = repo();
        repo.insert(&draft("John", "Doe", "+12025550139")).unwrap();
        repo.insert(&draft("Jane", "Doe", "+12025550140")).unwrap();
        repo.insert(&draft("Bob", "Smith", "+12025550141")).unwrap();

        let page = repo.search("doe", 0, 10).unwrap();
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_elements, 2);
        assert_eq!(page.total_pages, 1);

        let empty = repo.search("Nonexistent", 0, 10).unwrap();
        assert!(empty.content.is_empty());
        assert_eq!(empty.total_elements, 0);
    }

    #[test]
    fn test_search_matches_address_and_phone() {
        let repo = repo();
        let mut with_address = draft("John", "Doe", "+12025550139");
        with_address.address = Some("10 Rothschild Blvd".to_string());
        repo.insert(&with_address).unwrap();
        repo.insert(&draft("Jane", "Smith", "+447911123456")).unwrap();

        assert_eq!(repo.search("rothschild", 0, 10).unwrap().total_elements, 1);
        assert_eq!(repo.search("7911", 0, 10).unwrap().total_elements, 1);
    }

    #[test]
    fn test_search_treats_like_metacharacters_literally() {
        let repo = repo();
        let mut with_address = draft("John", "Doe", "+12025550139");
        with_address.address = Some("Apt 50% discount".to_string());
        repo.insert(&with_address).unwrap();
        repo.insert(&draft("Jane", "Smith", "+12025550140")).unwrap();

        assert_eq!(repo.search("50%", 0, 10).unwrap().total_elements, 1);
        assert_eq!(repo.search("_", 0, 10).unwrap().total_elements, 0);
    }

    #[test]
    fn test_search_pagination_applies_after_filtering() {
        let repo = repo();
        for i in 0..5 {
            repo.insert(&draft("John", "Doe", &format!("+1202555013{i}")))
                .unwrap();
        }
        repo.insert(&draft("Bob", "Smith", "+12025550199")).unwrap();

        let page = repo.search("doe", 1, 2).unwrap();
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_open_creates_database_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("contacts.db3");

        let repo = SqliteContactRepository::open(&path).unwrap();
        let created = repo.insert(&draft("John", "Doe", "+12025550139")).unwrap();
        drop(repo);

        let reopened = SqliteContactRepository::open(&path).unwrap();
        let fetched = reopened.find_by_id(created.id).unwrap().unwrap();
        assert_eq!(fetched.first_name, "John");
    }
}
