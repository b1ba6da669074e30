use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::catalog::ImageMode;
use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::models::section::Section;
use crate::uploads;

/// An ordered title/description/image/link record owned by a section.
/// The block owns its uploaded file: deleting the block or replacing its
/// image removes the old file from disk.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentBlock {
    pub id: i64,
    pub section_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_file: Option<String>,
    pub image_alt: String,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub is_active: bool,
    pub position: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Form payload for create/update. `image_file` is the filename of an upload
/// already written to disk (file-then-row ordering); `remove_image` asks for
/// the current image to be dropped on update.
#[derive(Debug, Default, Deserialize)]
pub struct BlockForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_file: Option<String>,
    pub image_alt: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub is_active: bool,
    pub remove_image: bool,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ContentBlock {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ContentBlock {
            id: row.get("id")?,
            section_id: row.get("section_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            image_file: row.get("image_file")?,
            image_alt: row.get("image_alt")?,
            link_url: row.get("link_url")?,
            link_text: row.get("link_text")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM content_blocks WHERE id = ?1",
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
            .prepare("SELECT * FROM content_blocks WHERE section_id = ?1 ORDER BY position, id")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![section_id], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count_for_section(pool: &DbPool, section_id: i64) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row(
            "SELECT COUNT(*) FROM content_blocks WHERE section_id = ?1",
            params![section_id],
            |row| row.get(0),
        )
        .unwrap_or(0)
    }

    /// Create a block under a section. The section's image mode and
    /// `max_blocks` cap are enforced here; fields the section's flags do not
    /// permit are dropped before storage, not persisted.
    pub fn create(pool: &DbPool, section_code: &str, form: &BlockForm) -> ContentResult<i64> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;

        let image_file = non_empty(&form.image_file);
        match section.image_mode() {
            ImageMode::Required if image_file.is_none() => {
                return Err(ContentError::validation(
                    "This section requires an image for every block",
                ));
            }
            ImageMode::Forbidden if image_file.is_some() => {
                return Err(ContentError::validation(
                    "This section does not accept images",
                ));
            }
            _ => {}
        }

        if let Some(max) = section.max_blocks {
            if Self::count_for_section(pool, section.id) >= max {
                return Err(ContentError::validation(format!(
                    "This section holds at most {} blocks",
                    max
                )));
            }
        }

        let title = if section.has_title { non_empty(&form.title) } else { None };
        let description = if section.has_description {
            non_empty(&form.description)
        } else {
            None
        };
        let (link_url, link_text) = if section.has_link {
            (non_empty(&form.link_url), non_empty(&form.link_text))
        } else {
            (None, None)
        };

        let conn = pool.get()?;
        let position =
            crate::models::next_position(&conn, "content_blocks", "section_id", section.id)?;

        conn.execute(
            "INSERT INTO content_blocks (section_id, title, description, image_file, image_alt,
             link_url, link_text, is_active, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                section.id,
                title,
                description,
                image_file,
                form.image_alt.as_deref().unwrap_or(""),
                link_url,
                link_text,
                form.is_active as i64,
                position,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Update a block. Replacing the image deletes the old file only after
    /// the row update succeeds; removing the image outright is rejected when
    /// the section's mode is `required`.
    pub fn update(pool: &DbPool, id: i64, form: &BlockForm) -> ContentResult<()> {
        let block = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("block"))?;
        let section =
            Section::find_by_id(pool, block.section_id).ok_or(ContentError::NotFound("section"))?;

        let new_image = non_empty(&form.image_file);
        let mode = section.image_mode();

        if mode == ImageMode::Forbidden && new_image.is_some() {
            return Err(ContentError::validation(
                "This section does not accept images",
            ));
        }
        if mode == ImageMode::Required && form.remove_image && new_image.is_none() {
            return Err(ContentError::validation(
                "This section requires an image for every block",
            ));
        }

        let (image_file, replaced_file) = if let Some(new) = new_image {
            (Some(new), block.image_file.clone())
        } else if form.remove_image {
            (None, block.image_file.clone())
        } else {
            (block.image_file.clone(), None)
        };

        let title = if section.has_title { non_empty(&form.title) } else { None };
        let description = if section.has_description {
            non_empty(&form.description)
        } else {
            None
        };
        let (link_url, link_text) = if section.has_link {
            (non_empty(&form.link_url), non_empty(&form.link_text))
        } else {
            (None, None)
        };

        let conn = pool.get()?;
        conn.execute(
            "UPDATE content_blocks SET title = ?1, description = ?2, image_file = ?3,
             image_alt = ?4, link_url = ?5, link_text = ?6, is_active = ?7,
             updated_at = CURRENT_TIMESTAMP WHERE id = ?8",
            params![
                title,
                description,
                image_file,
                form.image_alt.as_deref().unwrap_or(""),
                link_url,
                link_text,
                form.is_active as i64,
                id,
            ],
        )?;

        // Old file goes only after the row points elsewhere
        if let Some(old) = replaced_file {
            uploads::delete_file(pool, &old);
        }
        Ok(())
    }

    /// Delete a block and its backing file. A second delete of the same id
    /// reports not-found; a file already missing from disk is logged and
    /// ignored.
    pub fn delete(pool: &DbPool, id: i64) -> ContentResult<()> {
        let block = Self::find_by_id(pool, id).ok_or(ContentError::NotFound("block"))?;
        let conn = pool.get()?;
        conn.execute("DELETE FROM content_blocks WHERE id = ?1", params![id])?;
        if let Some(file) = block.image_file {
            uploads::delete_file(pool, &file);
        }
        Ok(())
    }

    pub fn reorder(pool: &DbPool, section_code: &str, ordered_ids: &[i64]) -> ContentResult<()> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;
        crate::models::reorder_children(pool, "content_blocks", "section_id", section.id, ordered_ids)
    }
}
