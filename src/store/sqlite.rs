use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{Connection, params};

use crate::Result;
use crate::domain::email::EmailRecord;
use crate::store::repo::EmailRepository;

/// SQLite-backed store. A connection is opened per operation and closed
/// when it goes out of scope; nothing is held open between calls.
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }
}

impl EmailRepository for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS emails (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                sender      TEXT,
                subject     TEXT,
                timestamp   TEXT
            );
            "#,
        )?;
        debug!("database ready at {}", self.path.display());
        Ok(())
    }

    fn save(&self, sender: &str, subject: &str, timestamp: &str) -> Result<i64> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO emails (sender, subject, timestamp)
            VALUES (?1, ?2, ?3)
            "#,
            params![sender, subject, timestamp],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<EmailRecord>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, sender, subject, timestamp
            FROM emails
            ORDER BY id ASC
            "#,
        )?;

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();

        while let Some(r) = rows.next()? {
            out.push(EmailRecord {
                id: r.get(0)?,
                sender: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
                subject: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
                timestamp: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
            });
        }
        Ok(out)
    }

    fn count(&self) -> Result<u64> {
        let conn = self.open()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM emails", [], |r| r.get(0))?;
        Ok(n as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(dir.path().join("emails.db"));
        store.initialize().unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_and_read_back_verbatim() {
        let (_dir, store) = temp_store();
        let ts = "Tue, 1 Jul 2003 10:52:37 +0200";

        let id = store
            .save("Jörg <jorg@example.com>", "Grüße", ts)
            .unwrap();

        let rows = store.list_all().unwrap();
        assert_eq!(
            rows,
            vec![EmailRecord {
                id,
                sender: "Jörg <jorg@example.com>".to_string(),
                subject: "Grüße".to_string(),
                timestamp: ts.to_string(),
            }]
        );
    }

    #[test]
    fn test_ids_increase() {
        let (_dir, store) = temp_store();
        let a = store.save("a", "1", "d").unwrap();
        let b = store.save("b", "2", "d").unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let (_dir, store) = temp_store();
        store.save("a", "same", "d").unwrap();
        store.save("a", "same", "d").unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, store) = temp_store();
        store.save("a", "kept", "d").unwrap();

        store.initialize().unwrap();
        store.initialize().unwrap();

        let rows = store.list_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subject, "kept");
    }

    #[test]
    fn test_empty_subject() {
        let (_dir, store) = temp_store();
        store.save("a", "", "d").unwrap();
        assert_eq!(store.list_all().unwrap()[0].subject, "");
    }

    #[test]
    fn test_save_without_initialize_fails() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(dir.path().join("fresh.db"));
        assert!(matches!(
            store.save("a", "b", "c"),
            Err(crate::Error::Storage(_))
        ));
    }
}
