use std::collections::HashMap;

use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::icons;
use crate::models::section::Section;
use crate::models::LANGS;

/// An ordered icon+label entry owned by a section with `has_features`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Feature {
    pub id: i64,
    pub section_id: i64,
    pub icon_code: String,
    pub label: String,
    pub is_active: bool,
    pub position: i64,
    pub created_at: NaiveDateTime,
}

/// Translations map language code to the translated label. Only languages
/// with a non-empty label get a row; submitting an empty label on update
/// clears that language (read-back falls back to the default-language label).
#[derive(Debug, Default, Deserialize)]
pub struct FeatureForm {
    pub icon_code: Option<String>,
    pub label: String,
    pub is_active: bool,
    pub translations: HashMap<String, String>,
}

impl Feature {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Feature {
            id: row.get("id")?,
            section_id: row.get("section_id")?,
            icon_code: row.get("icon_code")?,
            label: row.get("label")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM section_features WHERE id = ?1",
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
            .prepare("SELECT * FROM section_features WHERE section_id = ?1 ORDER BY position, id")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![section_id], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    /// Translated labels by language code. Missing languages are absent from
    /// the map (callers fall back to the default label).
    pub fn translations(pool: &DbPool, feature_id: i64) -> HashMap<String, String> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return HashMap::new(),
        };
        let mut stmt = match conn
            .prepare("SELECT lang, label FROM section_feature_translations WHERE feature_id = ?1")
        {
            Ok(s) => s,
            Err(_) => return HashMap::new(),
        };
        stmt.query_map(params![feature_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map(|rows| rows.filter_map(|r| r.ok()).collect())
        .unwrap_or_default()
    }

    fn validate(form: &FeatureForm) -> ContentResult<String> {
        // Checklist forms omit the icon picker; the stored code defaults to
        // "check" so round-trips stay lossless.
        let icon_code = form
            .icon_code
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(catalog::CHECKLIST_ICON)
            .to_string();
        if icons::find_icon(&icon_code).is_none() {
            return Err(ContentError::validation("Unknown icon"));
        }
        if form.label.trim().is_empty() {
            return Err(ContentError::validation("Label is required"));
        }
        Ok(icon_code)
    }

    pub fn create(pool: &DbPool, section_code: &str, form: &FeatureForm) -> ContentResult<i64> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;
        if !section.has_features {
            return Err(ContentError::validation(
                "This section does not support features",
            ));
        }
        let icon_code = Self::validate(form)?;

        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        let position =
            crate::models::next_position(&tx, "section_features", "section_id", section.id)?;
        tx.execute(
            "INSERT INTO section_features (section_id, icon_code, label, is_active, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                section.id,
                icon_code,
                form.label.trim(),
                form.is_active as i64,
                position
            ],
        )?;
        let id = tx.last_insert_rowid();
        write_translations(&tx, id, &form.translations)?;
        tx.commit()?;
        Ok(id)
    }

    /// Update re-validates the required fields and fully replaces the
    /// translation set: a language submitted empty loses its row.
    pub fn update(pool: &DbPool, id: i64, form: &FeatureForm) -> ContentResult<()> {
        let feature = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("feature"))?;
        let icon_code = Self::validate(form)?;

        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE section_features SET icon_code = ?1, label = ?2, is_active = ?3 WHERE id = ?4",
            params![icon_code, form.label.trim(), form.is_active as i64, feature.id],
        )?;
        tx.execute(
            "DELETE FROM section_feature_translations WHERE feature_id = ?1",
            params![feature.id],
        )?;
        write_translations(&tx, feature.id, &form.translations)?;
        tx.commit()?;
        Ok(())
    }

    /// Idempotent: a second delete of the same id reports not-found.
    pub fn delete(pool: &DbPool, id: i64) -> ContentResult<()> {
        let feature = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("feature"))?;
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM section_feature_translations WHERE feature_id = ?1",
            params![feature.id],
        )?;
        tx.execute(
            "DELETE FROM section_features WHERE id = ?1",
            params![feature.id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn reorder(pool: &DbPool, section_code: &str, ordered_ids: &[i64]) -> ContentResult<()> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;
        crate::models::reorder_children(
            pool,
            "section_features",
            "section_id",
            section.id,
            ordered_ids,
        )
    }
}

fn write_translations(
    tx: &rusqlite::Transaction,
    feature_id: i64,
    translations: &HashMap<String, String>,
) -> ContentResult<()> {
    for lang in LANGS {
        let label = translations.get(*lang).map(|s| s.trim()).unwrap_or("");
        if label.is_empty() {
            continue;
        }
        tx.execute(
            "INSERT INTO section_feature_translations (feature_id, lang, label) VALUES (?1, ?2, ?3)",
            params![feature_id, lang, label],
        )?;
    }
    Ok(())
}
