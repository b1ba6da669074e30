use std::collections::HashMap;

use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::models::section::Section;
use crate::models::LANGS;

/// Free-text header content (subtitle/title/description) for a section with
/// `has_overlay`, plus the same fields per translation language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayFields {
    pub subtitle: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct Overlay {
    pub section_id: i64,
    pub fields: OverlayFields,
    /// Every language in `LANGS` is present; missing rows read back as empty
    /// strings so templates never need null checks.
    pub translations: HashMap<String, OverlayFields>,
}

impl Overlay {
    pub fn get(pool: &DbPool, section_code: &str) -> ContentResult<Overlay> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;
        if !section.has_overlay {
            return Err(ContentError::validation(
                "This section does not support an overlay",
            ));
        }

        let conn = pool.get()?;
        let fields = conn
            .query_row(
                "SELECT subtitle, title, description FROM section_overlays WHERE section_id = ?1",
                params![section.id],
                |row| {
                    Ok(OverlayFields {
                        subtitle: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .unwrap_or_default();

        let mut translations: HashMap<String, OverlayFields> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                "SELECT lang, subtitle, title, description
                 FROM section_overlay_translations WHERE section_id = ?1",
            )?;
            let rows = stmt.query_map(params![section.id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    OverlayFields {
                        subtitle: row.get(1)?,
                        title: row.get(2)?,
                        description: row.get(3)?,
                    },
                ))
            })?;
            for r in rows {
                let (lang, fields) = r?;
                translations.insert(lang, fields);
            }
        }
        for lang in LANGS {
            translations.entry(lang.to_string()).or_default();
        }

        Ok(Overlay {
            section_id: section.id,
            fields,
            translations,
        })
    }

    /// Upsert the default row and fully replace each language row. Unlike the
    /// feature/service/gallery translations, an all-empty submission for a
    /// language keeps its row with empty strings instead of deleting it —
    /// read-back returns "" rather than falling back to the default language.
    pub fn save(
        pool: &DbPool,
        section_code: &str,
        fields: &OverlayFields,
        translations: &HashMap<String, OverlayFields>,
    ) -> ContentResult<()> {
        let section =
            Section::find_by_code(pool, section_code).ok_or(ContentError::NotFound("section"))?;
        if !section.has_overlay {
            return Err(ContentError::validation(
                "This section does not support an overlay",
            ));
        }

        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO section_overlays (section_id, subtitle, title, description)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(section_id) DO UPDATE SET
               subtitle = ?2, title = ?3, description = ?4, updated_at = CURRENT_TIMESTAMP",
            params![
                section.id,
                fields.subtitle.trim(),
                fields.title.trim(),
                fields.description.trim()
            ],
        )?;

        for lang in LANGS {
            let tr = translations.get(*lang).cloned().unwrap_or_default();
            tx.execute(
                "INSERT INTO section_overlay_translations (section_id, lang, subtitle, title, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(section_id, lang) DO UPDATE SET
                   subtitle = ?3, title = ?4, description = ?5",
                params![
                    section.id,
                    lang,
                    tr.subtitle.trim(),
                    tr.title.trim(),
                    tr.description.trim()
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
