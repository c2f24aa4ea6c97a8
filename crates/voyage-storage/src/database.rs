//! Database connection and keyed entry operations

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::Result;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;

        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    pub fn get_entry(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            let value = conn
                .query_row("SELECT value FROM auth_state WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_entry(&self, key: &str, value: &str) -> Result<()> {
        self.with_connection(|conn| upsert(conn, key, value))
    }

    pub fn remove_entry(&self, key: &str) -> Result<()> {
        self.with_connection(|conn| delete(conn, key))
    }

    /// Apply several writes atomically. `None` removes the key.
    pub fn write_entries(&self, writes: &[(&str, Option<&str>)]) -> Result<()> {
        self.transaction(|conn| {
            for (key, value) in writes {
                match value {
                    Some(value) => upsert(conn, key, value)?,
                    None => delete(conn, key)?,
                }
            }
            Ok(())
        })
    }
}

fn upsert(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let updated_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO auth_state (key, value, updated_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![key, value, updated_at],
    )?;
    Ok(())
}

fn delete(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM auth_state WHERE key = ?1", [key])?;
    Ok(())
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
