use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, ImageMode, SectionTemplate};
use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::uploads;

/// A named, positioned slot on a public page, governed by a template.
/// Capability flags are copied from the template at creation and are the
/// single authority for which sub-entity panels the admin UI shows.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub page: String,
    pub template_type: String,
    pub image_mode: String,
    pub has_title: bool,
    pub has_description: bool,
    pub has_link: bool,
    pub has_features: bool,
    pub has_services: bool,
    pub has_gallery: bool,
    pub has_overlay: bool,
    pub max_blocks: Option<i64>,
    pub background_color: Option<String>,
    pub image_position: Option<String>,
    pub position: i64,
    pub is_dynamic: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Sections of one page, used by `list_by_page`.
#[derive(Debug, Serialize)]
pub struct PageSections {
    pub page: String,
    pub sections: Vec<Section>,
}

impl Section {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Section {
            id: row.get("id")?,
            code: row.get("code")?,
            name: row.get("name")?,
            page: row.get("page")?,
            template_type: row.get("template_type")?,
            image_mode: row.get("image_mode")?,
            has_title: row.get::<_, i64>("has_title")? != 0,
            has_description: row.get::<_, i64>("has_description")? != 0,
            has_link: row.get::<_, i64>("has_link")? != 0,
            has_features: row.get::<_, i64>("has_features")? != 0,
            has_services: row.get::<_, i64>("has_services")? != 0,
            has_gallery: row.get::<_, i64>("has_gallery")? != 0,
            has_overlay: row.get::<_, i64>("has_overlay")? != 0,
            max_blocks: row.get("max_blocks")?,
            background_color: row.get("background_color")?,
            image_position: row.get("image_position")?,
            position: row.get("position")?,
            is_dynamic: row.get::<_, i64>("is_dynamic")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn image_mode(&self) -> ImageMode {
        ImageMode::parse(&self.image_mode)
    }

    pub fn template(&self) -> Option<&'static SectionTemplate> {
        catalog::find_template(&self.template_type)
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM sections WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn find_by_code(pool: &DbPool, code: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM sections WHERE code = ?1",
            params![code],
            Self::from_row,
        )
        .ok()
    }

    pub fn list_for_page(pool: &DbPool, page: &str) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn
            .prepare("SELECT * FROM sections WHERE page = ?1 ORDER BY position, id")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![page], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    /// All sections grouped by page in position order, seeded and
    /// admin-created alike. Pages come out in name order.
    pub fn list_by_page(pool: &DbPool) -> Vec<PageSections> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare("SELECT * FROM sections ORDER BY page, position, id") {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let all: Vec<Section> = stmt
            .query_map([], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default();

        let mut groups: Vec<PageSections> = Vec::new();
        for section in all {
            match groups.iter_mut().find(|g| g.page == section.page) {
                Some(group) => group.sections.push(section),
                None => groups.push(PageSections {
                    page: section.page.clone(),
                    sections: vec![section],
                }),
            }
        }
        groups
    }

    /// Create an admin-defined section. Capability flags are derived from the
    /// template catalog server-side; the section code is a slug of the name
    /// with a numeric disambiguator when taken.
    pub fn create_dynamic(
        pool: &DbPool,
        page: &str,
        template_code: &str,
        name: &str,
    ) -> ContentResult<Section> {
        let page = page.trim();
        let name = name.trim();
        if page.is_empty() {
            return Err(ContentError::validation("Page is required"));
        }
        if name.is_empty() {
            return Err(ContentError::validation("Section name is required"));
        }
        let tpl = catalog::find_template(template_code)
            .ok_or_else(|| ContentError::validation("Unknown section template"))?;

        let conn = pool.get()?;

        let base = slug::slugify(name).replace('-', "_");
        let base = if base.is_empty() { "section".to_string() } else { base };
        let mut code = base.clone();
        let mut n = 1;
        while Self::code_taken(&conn, &code)? {
            n += 1;
            code = format!("{}_{}", base, n);
        }

        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM sections WHERE page = ?1",
            params![page],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO sections (code, name, page, template_type, image_mode,
             has_title, has_description, has_link, has_features, has_services,
             has_gallery, has_overlay, max_blocks, position, is_dynamic)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 1)",
            params![
                code,
                name,
                page,
                tpl.code,
                tpl.image_mode.as_str(),
                tpl.has_title as i64,
                tpl.has_description as i64,
                tpl.has_link as i64,
                tpl.has_features as i64,
                tpl.has_services as i64,
                tpl.has_gallery as i64,
                tpl.has_overlay as i64,
                tpl.max_blocks,
                position,
            ],
        )?;

        Self::find_by_code(pool, &code).ok_or(ContentError::NotFound("section"))
    }

    fn code_taken(conn: &rusqlite::Connection, code: &str) -> ContentResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sections WHERE code = ?1",
            params![code],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn rename_dynamic(pool: &DbPool, code: &str, new_name: &str) -> ContentResult<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ContentError::validation("Section name is required"));
        }
        let section = Self::find_by_code(pool, code).ok_or(ContentError::NotFound("section"))?;
        if !section.is_dynamic {
            return Err(ContentError::validation("Seeded sections cannot be renamed"));
        }
        let conn = pool.get()?;
        conn.execute(
            "UPDATE sections SET name = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![new_name, section.id],
        )?;
        Ok(())
    }

    /// Delete an admin-created section and everything it owns. Rows go in one
    /// transaction; backing image files are removed best-effort afterwards so
    /// a crash can only leave orphaned files, never dangling rows.
    pub fn delete_dynamic(pool: &DbPool, code: &str) -> ContentResult<()> {
        let section = Self::find_by_code(pool, code).ok_or(ContentError::NotFound("section"))?;
        if !section.is_dynamic {
            return Err(ContentError::validation("Seeded sections cannot be deleted"));
        }

        let mut conn = pool.get()?;
        let tx = conn.transaction()?;

        let mut files: Vec<String> = Vec::new();
        {
            let mut stmt = tx.prepare(
                "SELECT image_file FROM content_blocks WHERE section_id = ?1 AND image_file IS NOT NULL",
            )?;
            let rows = stmt.query_map(params![section.id], |row| row.get::<_, String>(0))?;
            for f in rows {
                files.push(f?);
            }
            let mut stmt = tx.prepare(
                "SELECT image_file, thumb_file FROM section_gallery_items WHERE section_id = ?1",
            )?;
            let rows = stmt.query_map(params![section.id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?;
            for r in rows {
                let (image, thumb) = r?;
                files.push(image);
                if let Some(t) = thumb {
                    files.push(t);
                }
            }
        }

        tx.execute(
            "DELETE FROM section_feature_translations WHERE feature_id IN
             (SELECT id FROM section_features WHERE section_id = ?1)",
            params![section.id],
        )?;
        tx.execute(
            "DELETE FROM section_features WHERE section_id = ?1",
            params![section.id],
        )?;
        tx.execute(
            "DELETE FROM section_service_translations WHERE service_id IN
             (SELECT id FROM section_services WHERE section_id = ?1)",
            params![section.id],
        )?;
        tx.execute(
            "DELETE FROM section_services WHERE section_id = ?1",
            params![section.id],
        )?;
        tx.execute(
            "DELETE FROM section_gallery_translations WHERE item_id IN
             (SELECT id FROM section_gallery_items WHERE section_id = ?1)",
            params![section.id],
        )?;
        tx.execute(
            "DELETE FROM section_gallery_items WHERE section_id = ?1",
            params![section.id],
        )?;
        tx.execute(
            "DELETE FROM section_overlay_translations WHERE section_id = ?1",
            params![section.id],
        )?;
        tx.execute(
            "DELETE FROM section_overlays WHERE section_id = ?1",
            params![section.id],
        )?;
        tx.execute(
            "DELETE FROM content_blocks WHERE section_id = ?1",
            params![section.id],
        )?;
        tx.execute("DELETE FROM sections WHERE id = ?1", params![section.id])?;
        tx.commit()?;

        for file in files {
            uploads::delete_file(pool, &file);
        }
        Ok(())
    }

    /// Reorder a page's sections from a client-submitted code list. Same
    /// protocol as the id-based collections: position = index, codes outside
    /// the page are skipped, last occurrence of a duplicate wins.
    pub fn reorder(pool: &DbPool, page: &str, ordered_codes: &[String]) -> ContentResult<()> {
        if ordered_codes.is_empty() {
            return Ok(());
        }
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        for (index, code) in ordered_codes.iter().enumerate() {
            tx.execute(
                "UPDATE sections SET position = ?1 WHERE code = ?2 AND page = ?3",
                params![index as i64, code, page],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn set_background_color(pool: &DbPool, code: &str, color: &str) -> ContentResult<()> {
        let section = Self::find_by_code(pool, code).ok_or(ContentError::NotFound("section"))?;
        section.require_image_position_support()?;
        let conn = pool.get()?;
        conn.execute(
            "UPDATE sections SET background_color = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![color, section.id],
        )?;
        Ok(())
    }

    pub fn set_image_position(pool: &DbPool, code: &str, position: &str) -> ContentResult<()> {
        let section = Self::find_by_code(pool, code).ok_or(ContentError::NotFound("section"))?;
        section.require_image_position_support()?;
        let conn = pool.get()?;
        conn.execute(
            "UPDATE sections SET image_position = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![position, section.id],
        )?;
        Ok(())
    }

    // Appearance settings are only persisted for templates that place an
    // image next to the text.
    fn require_image_position_support(&self) -> ContentResult<()> {
        match self.template() {
            Some(tpl) if tpl.supports_image_position => Ok(()),
            _ => Err(ContentError::validation(
                "This section template does not support appearance settings",
            )),
        }
    }
}
