use std::collections::HashMap;

use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::icons;
use crate::models::section::Section;
use crate::models::LANGS;

/// An ordered icon+label+description entry owned by a section with
/// `has_services`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Service {
    pub id: i64,
    pub section_id: i64,
    pub icon_code: String,
    pub label: String,
    pub description: String,
    pub is_active: bool,
    pub position: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceTranslation {
    pub label: String,
    pub description: String,
}

/// A language's translation row is written only when its label (the primary
/// field) is non-empty; update replaces the whole set.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceForm {
    pub icon_code: Option<String>,
    pub label: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub translations: HashMap<String, ServiceTranslation>,
}

impl Service {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Service {
            id: row.get("id")?,
            section_id: row.get("section_id")?,
            icon_code: row.get("icon_code")?,
            label: row.get("label")?,
            description: row.get("description")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM section_services WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list_for_section(pool: &DbPool, section_id: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn
            .prepare("SELECT * FROM section_services WHERE section_id = ?1 ORDER BY position, id")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![section_id], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn translations(pool: &DbPool, service_id: i64) -> HashMap<String, ServiceTranslation> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return HashMap::new(),
        };
        let mut stmt = match conn.prepare(
            "SELECT lang, label, description FROM section_service_translations WHERE service_id = ?1",
        ) {
            Ok(s) => s,
            Err(_) => return HashMap::new(),
        };
        stmt.query_map(params![service_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                ServiceTranslation {
                    label: row.get(1)?,
                    description: row.get(2)?,
                },
            ))
        })
        .map(|rows| rows.filter_map(|r| r.ok()).collect())
        .unwrap_or_default()
    }

    fn validate(form: &ServiceForm) -> ContentResult<String> {
        let icon_code = form
            .icon_code
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ContentError::validation("Icon is required"))?;
        if icons::find_icon(icon_code).is_none() {
            return Err(ContentError::validation("Unknown icon"));
        }
        if form.label.trim().is_empty() {
            return Err(ContentError::validation("Label is required"));
        }
        Ok(icon_code.to_string())
    }

    pub fn create(pool: &DbPool, section_code: &str, form: &ServiceForm) -> ContentResult<i64> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;
        if !section.has_services {
            return Err(ContentError::validation(
                "This section does not support services",
            ));
        }
        let icon_code = Self::validate(form)?;

        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        let position =
            crate::models::next_position(&tx, "section_services", "section_id", section.id)?;
        tx.execute(
            "INSERT INTO section_services (section_id, icon_code, label, description, is_active, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                section.id,
                icon_code,
                form.label.trim(),
                form.description.as_deref().unwrap_or("").trim(),
                form.is_active as i64,
                position
            ],
        )?;
        let id = tx.last_insert_rowid();
        write_translations(&tx, id, &form.translations)?;
        tx.commit()?;
        Ok(id)
    }

    pub fn update(pool: &DbPool, id: i64, form: &ServiceForm) -> ContentResult<()> {
        let service = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("service"))?;
        let icon_code = Self::validate(form)?;

        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE section_services SET icon_code = ?1, label = ?2, description = ?3, is_active = ?4
             WHERE id = ?5",
            params![
                icon_code,
                form.label.trim(),
                form.description.as_deref().unwrap_or("").trim(),
                form.is_active as i64,
                service.id
            ],
        )?;
        tx.execute(
            "DELETE FROM section_service_translations WHERE service_id = ?1",
            params![service.id],
        )?;
        write_translations(&tx, service.id, &form.translations)?;
        tx.commit()?;
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> ContentResult<()> {
        let service = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("service"))?;
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM section_service_translations WHERE service_id = ?1",
            params![service.id],
        )?;
        tx.execute(
            "DELETE FROM section_services WHERE id = ?1",
            params![service.id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn reorder(pool: &DbPool, section_code: &str, ordered_ids: &[i64]) -> ContentResult<()> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;
        crate::models::reorder_children(
            pool,
            "section_services",
            "section_id",
            section.id,
            ordered_ids,
        )
    }
}

fn write_translations(
    tx: &rusqlite::Transaction,
    service_id: i64,
    translations: &HashMap<String, ServiceTranslation>,
) -> ContentResult<()> {
    for lang in LANGS {
        let Some(tr) = translations.get(*lang) else {
            continue;
        };
        if tr.label.trim().is_empty() {
            continue;
        }
        tx.execute(
            "INSERT INTO section_service_translations (service_id, lang, label, description)
             VALUES (?1, ?2, ?3, ?4)",
            params![service_id, lang, tr.label.trim(), tr.description.trim()],
        )?;
    }
    Ok(())
}
