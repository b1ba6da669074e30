use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};

pub const ORDER_STATUSES: &[&str] = &["pending", "preparing", "delivered", "cancelled"];

/// A room-service order placed from the guest-facing site. `items_json` is
/// the ordered line items as submitted ([{name, qty, price}, ...]).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RoomOrder {
    pub id: i64,
    pub room_number: String,
    pub guest_name: String,
    pub items_json: String,
    pub total: f64,
    pub status: String,
    pub note: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoomOrderForm {
    pub room_number: String,
    pub guest_name: Option<String>,
    pub items_json: String,
    pub total: f64,
    pub note: Option<String>,
}

impl RoomOrder {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(RoomOrder {
            id: row.get("id")?,
            room_number: row.get("room_number")?,
            guest_name: row.get("guest_name")?,
            items_json: row.get("items_json")?,
            total: row.get("total")?,
            status: row.get("status")?,
            note: row.get("note")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM room_orders WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(pool: &DbPool, status: Option<&str>, limit: i64, offset: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        match status {
            Some(s) => {
                let mut stmt = match conn.prepare(
                    "SELECT * FROM room_orders WHERE status = ?1
                     ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                ) {
                    Ok(st) => st,
                    Err(_) => return vec![],
                };
                stmt.query_map(params![s, limit, offset], Self::from_row)
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
                    .unwrap_or_default()
            }
            None => {
                let mut stmt = match conn.prepare(
                    "SELECT * FROM room_orders ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                ) {
                    Ok(st) => st,
                    Err(_) => return vec![],
                };
                stmt.query_map(params![limit, offset], Self::from_row)
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
                    .unwrap_or_default()
            }
        }
    }

    pub fn count(pool: &DbPool, status: Option<&str>) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        match status {
            Some(s) => conn
                .query_row(
                    "SELECT COUNT(*) FROM room_orders WHERE status = ?1",
                    params![s],
                    |row| row.get(0),
                )
                .unwrap_or(0),
            None => conn
                .query_row("SELECT COUNT(*) FROM room_orders", [], |row| row.get(0))
                .unwrap_or(0),
        }
    }

    pub fn create(pool: &DbPool, form: &RoomOrderForm) -> ContentResult<i64> {
        if form.room_number.trim().is_empty() {
            return Err(ContentError::validation("Room number is required"));
        }
        // Reject malformed line items up front so the admin list never has to
        // deal with unparseable orders.
        if serde_json::from_str::<serde_json::Value>(&form.items_json).is_err() {
            return Err(ContentError::validation("Order items are malformed"));
        }
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO room_orders (room_number, guest_name, items_json, total, note)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                form.room_number.trim(),
                form.guest_name.as_deref().unwrap_or("").trim(),
                form.items_json,
                form.total,
                form.note.as_deref().unwrap_or("").trim()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_status(pool: &DbPool, id: i64, status: &str) -> ContentResult<()> {
        if !ORDER_STATUSES.contains(&status) {
            return Err(ContentError::validation("Unknown order status"));
        }
        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE room_orders SET status = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![status, id],
        )?;
        if changed == 0 {
            return Err(ContentError::NotFound("order"));
        }
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> ContentResult<()> {
        let conn = pool.get()?;
        let changed = conn.execute("DELETE FROM room_orders WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(ContentError::NotFound("order"));
        }
        Ok(())
    }
}
