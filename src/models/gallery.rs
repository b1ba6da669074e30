use std::collections::HashMap;

use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::models::section::Section;
use crate::models::LANGS;
use crate::uploads;

/// An ordered photo owned by a section with `has_gallery`. Like content
/// blocks, the item owns its files: delete removes the image and thumbnail.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GalleryItem {
    pub id: i64,
    pub section_id: i64,
    pub image_file: String,
    pub thumb_file: Option<String>,
    pub title: String,
    pub description: String,
    pub image_alt: String,
    pub is_active: bool,
    pub position: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryTranslation {
    pub title: String,
    pub description: String,
}

/// `image_file`/`thumb_file` name uploads already written to disk. On update
/// they are optional; when present the previous files are deleted after the
/// row moves over. A language's translation row is written only when its
/// title (the primary field) is non-empty.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryForm {
    pub image_file: Option<String>,
    pub thumb_file: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub image_alt: Option<String>,
    pub is_active: bool,
    pub translations: HashMap<String, GalleryTranslation>,
}

impl GalleryItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(GalleryItem {
            id: row.get("id")?,
            section_id: row.get("section_id")?,
            image_file: row.get("image_file")?,
            thumb_file: row.get("thumb_file")?,
            title: row.get("title")?,
            description: row.get("description")?,
            image_alt: row.get("image_alt")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM section_gallery_items WHERE id = ?1",
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
        let mut stmt = match conn.prepare(
            "SELECT * FROM section_gallery_items WHERE section_id = ?1 ORDER BY position, id",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![section_id], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn translations(pool: &DbPool, item_id: i64) -> HashMap<String, GalleryTranslation> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return HashMap::new(),
        };
        let mut stmt = match conn.prepare(
            "SELECT lang, title, description FROM section_gallery_translations WHERE item_id = ?1",
        ) {
            Ok(s) => s,
            Err(_) => return HashMap::new(),
        };
        stmt.query_map(params![item_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                GalleryTranslation {
                    title: row.get(1)?,
                    description: row.get(2)?,
                },
            ))
        })
        .map(|rows| rows.filter_map(|r| r.ok()).collect())
        .unwrap_or_default()
    }

    pub fn create(pool: &DbPool, section_code: &str, form: &GalleryForm) -> ContentResult<i64> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;
        if !section.has_gallery {
            return Err(ContentError::validation(
                "This section does not support a gallery",
            ));
        }
        if form.title.trim().is_empty() {
            return Err(ContentError::validation("Title is required"));
        }
        let image_file = form
            .image_file
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ContentError::validation("An image is required"))?;

        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        let position =
            crate::models::next_position(&tx, "section_gallery_items", "section_id", section.id)?;
        tx.execute(
            "INSERT INTO section_gallery_items (section_id, image_file, thumb_file, title,
             description, image_alt, is_active, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                section.id,
                image_file,
                form.thumb_file,
                form.title.trim(),
                form.description.as_deref().unwrap_or("").trim(),
                form.image_alt.as_deref().unwrap_or(""),
                form.is_active as i64,
                position
            ],
        )?;
        let id = tx.last_insert_rowid();
        write_translations(&tx, id, &form.translations)?;
        tx.commit()?;
        Ok(id)
    }

    pub fn update(pool: &DbPool, id: i64, form: &GalleryForm) -> ContentResult<()> {
        let item = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("gallery item"))?;
        if form.title.trim().is_empty() {
            return Err(ContentError::validation("Title is required"));
        }

        let new_image = form
            .image_file
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let (image_file, thumb_file, old_files) = match new_image {
            Some(new) => {
                let mut old = vec![item.image_file.clone()];
                if let Some(t) = item.thumb_file.clone() {
                    old.push(t);
                }
                (new.to_string(), form.thumb_file.clone(), old)
            }
            None => (item.image_file.clone(), item.thumb_file.clone(), vec![]),
        };

        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE section_gallery_items SET image_file = ?1, thumb_file = ?2, title = ?3,
             description = ?4, image_alt = ?5, is_active = ?6 WHERE id = ?7",
            params![
                image_file,
                thumb_file,
                form.title.trim(),
                form.description.as_deref().unwrap_or("").trim(),
                form.image_alt.as_deref().unwrap_or(""),
                form.is_active as i64,
                item.id
            ],
        )?;
        tx.execute(
            "DELETE FROM section_gallery_translations WHERE item_id = ?1",
            params![item.id],
        )?;
        write_translations(&tx, item.id, &form.translations)?;
        tx.commit()?;

        for old in old_files {
            uploads::delete_file(pool, &old);
        }
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> ContentResult<()> {
        let item = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("gallery item"))?;
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM section_gallery_translations WHERE item_id = ?1",
            params![item.id],
        )?;
        tx.execute(
            "DELETE FROM section_gallery_items WHERE id = ?1",
            params![item.id],
        )?;
        tx.commit()?;

        uploads::delete_file(pool, &item.image_file);
        if let Some(thumb) = item.thumb_file {
            uploads::delete_file(pool, &thumb);
        }
        Ok(())
    }

    pub fn reorder(pool: &DbPool, section_code: &str, ordered_ids: &[i64]) -> ContentResult<()> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;
        crate::models::reorder_children(
            pool,
            "section_gallery_items",
            "section_id",
            section.id,
            ordered_ids,
        )
    }
}

fn write_translations(
    tx: &rusqlite::Transaction,
    item_id: i64,
    translations: &HashMap<String, GalleryTranslation>,
) -> ContentResult<()> {
    for lang in LANGS {
        let Some(tr) = translations.get(*lang) else {
            continue;
        };
        if tr.title.trim().is_empty() {
            continue;
        }
        tx.execute(
            "INSERT INTO section_gallery_translations (item_id, lang, title, description)
             VALUES (?1, ?2, ?3, ?4)",
            params![item_id, lang, tr.title.trim(), tr.description.trim()],
        )?;
    }
    Ok(())
}
