use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};

/// A guest message from the public contact form.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GuestMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct GuestMessageForm {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub body: String,
}

impl GuestMessage {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(GuestMessage {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            subject: row.get("subject")?,
            body: row.get("body")?,
            is_read: row.get::<_, i64>("is_read")? != 0,
            created_at: row.get("created_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM messages WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(pool: &DbPool, unread_only: bool, limit: i64, offset: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let sql = if unread_only {
            "SELECT * FROM messages WHERE is_read = 0 ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
        } else {
            "SELECT * FROM messages ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
        };
        let mut stmt = match conn.prepare(sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![limit, offset], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap_or(0)
    }

    pub fn unread_count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE is_read = 0",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0)
    }

    pub fn create(pool: &DbPool, form: &GuestMessageForm) -> ContentResult<i64> {
        if form.name.trim().is_empty() {
            return Err(ContentError::validation("Name is required"));
        }
        if form.body.trim().is_empty() {
            return Err(ContentError::validation("Message body is required"));
        }
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO messages (name, email, phone, subject, body) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                form.name.trim(),
                form.email.as_deref().unwrap_or("").trim(),
                form.phone.as_deref().unwrap_or("").trim(),
                form.subject.as_deref().unwrap_or("").trim(),
                form.body.trim()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn set_read(pool: &DbPool, id: i64, read: bool) -> ContentResult<()> {
        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE messages SET is_read = ?1 WHERE id = ?2",
            params![read as i64, id],
        )?;
        if changed == 0 {
            return Err(ContentError::NotFound("message"));
        }
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> ContentResult<()> {
        let conn = pool.get()?;
        let changed = conn.execute("DELETE FROM messages WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(ContentError::NotFound("message"));
        }
        Ok(())
    }
}
