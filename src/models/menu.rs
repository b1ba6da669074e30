use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::uploads;

pub const MENU_CATEGORIES: &[&str] = &["breakfast", "starters", "mains", "desserts", "drinks"];

/// A room-service menu entry.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_file: Option<String>,
    pub is_active: bool,
    pub position: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct MenuItemForm {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image_file: Option<String>,
    pub is_active: bool,
}

impl MenuItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(MenuItem {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            price: row.get("price")?,
            category: row.get("category")?,
            image_file: row.get("image_file")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM menu_items WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(pool: &DbPool, category: Option<&str>) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        match category {
            Some(cat) => {
                let mut stmt = match conn.prepare(
                    "SELECT * FROM menu_items WHERE category = ?1 ORDER BY position, id",
                ) {
                    Ok(s) => s,
                    Err(_) => return vec![],
                };
                stmt.query_map(params![cat], Self::from_row)
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
                    .unwrap_or_default()
            }
            None => {
                let mut stmt =
                    match conn.prepare("SELECT * FROM menu_items ORDER BY category, position, id") {
                        Ok(s) => s,
                        Err(_) => return vec![],
                    };
                stmt.query_map([], Self::from_row)
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
                    .unwrap_or_default()
            }
        }
    }

    fn validate(form: &MenuItemForm) -> ContentResult<()> {
        if form.name.trim().is_empty() {
            return Err(ContentError::validation("Name is required"));
        }
        if form.price < 0.0 {
            return Err(ContentError::validation("Price cannot be negative"));
        }
        if !MENU_CATEGORIES.contains(&form.category.as_str()) {
            return Err(ContentError::validation("Unknown menu category"));
        }
        Ok(())
    }

    pub fn create(pool: &DbPool, form: &MenuItemForm) -> ContentResult<i64> {
        Self::validate(form)?;
        let conn = pool.get()?;
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM menu_items WHERE category = ?1",
            params![form.category],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO menu_items (name, description, price, category, image_file, is_active, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                form.name.trim(),
                form.description.as_deref().unwrap_or("").trim(),
                form.price,
                form.category,
                form.image_file,
                form.is_active as i64,
                position
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(pool: &DbPool, id: i64, form: &MenuItemForm) -> ContentResult<()> {
        let item = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("menu item"))?;
        Self::validate(form)?;

        let new_image = form
            .image_file
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let (image_file, replaced) = match new_image {
            Some(new) => (Some(new.to_string()), item.image_file.clone()),
            None => (item.image_file.clone(), None),
        };

        let conn = pool.get()?;
        conn.execute(
            "UPDATE menu_items SET name = ?1, description = ?2, price = ?3, category = ?4,
             image_file = ?5, is_active = ?6 WHERE id = ?7",
            params![
                form.name.trim(),
                form.description.as_deref().unwrap_or("").trim(),
                form.price,
                form.category,
                image_file,
                form.is_active as i64,
                id
            ],
        )?;
        if let Some(old) = replaced {
            uploads::delete_file(pool, &old);
        }
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> ContentResult<()> {
        let item = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("menu item"))?;
        let conn = pool.get()?;
        conn.execute("DELETE FROM menu_items WHERE id = ?1", params![id])?;
        if let Some(file) = item.image_file {
            uploads::delete_file(pool, &file);
        }
        Ok(())
    }

    /// Reorder within one category, same protocol as the section collections.
    pub fn reorder(pool: &DbPool, category: &str, ordered_ids: &[i64]) -> ContentResult<()> {
        if ordered_ids.is_empty() {
            return Ok(());
        }
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        for (index, id) in ordered_ids.iter().enumerate() {
            tx.execute(
                "UPDATE menu_items SET position = ?1 WHERE id = ?2 AND category = ?3",
                params![index as i64, id, category],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
