use std::fs;
use std::path::Path;

use image::imageops::FilterType;

use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::models::settings::Setting;

/// Result of storing an uploaded image.
pub struct StoredImage {
    pub file_name: String,
    pub thumb_name: Option<String>,
}

pub fn storage_path(pool: &DbPool) -> String {
    Setting::get_or(pool, "uploads_storage_path", "website/uploads/")
}

fn allowed_extension(pool: &DbPool, ext: &str) -> bool {
    let allowed = Setting::get_or(pool, "uploads_allowed_types", "jpg,jpeg,png,webp");
    allowed
        .split(',')
        .map(str::trim)
        .any(|a| a.eq_ignore_ascii_case(ext))
}

/// Save an uploaded image under a fresh UUID name. When `with_thumb` is set a
/// resized copy is written alongside it (gallery items keep a thumbnail, other
/// images are served as-is).
pub fn save_upload(
    pool: &DbPool,
    file_bytes: &[u8],
    original_filename: &str,
    with_thumb: bool,
) -> ContentResult<StoredImage> {
    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !allowed_extension(pool, &ext) {
        return Err(ContentError::Upload(format!(
            "File type .{ext} is not allowed"
        )));
    }

    let max_mb = Setting::get_i64(pool, "uploads_max_mb").max(1) as usize;
    if file_bytes.len() > max_mb * 1024 * 1024 {
        return Err(ContentError::Upload(format!(
            "File exceeds the {max_mb} MB limit"
        )));
    }

    // Decode before anything touches disk so a corrupt file never leaves a
    // stray upload behind.
    let img = image::load_from_memory(file_bytes)
        .map_err(|e| ContentError::Upload(format!("Unreadable image: {e}")))?;

    let storage = storage_path(pool);
    fs::create_dir_all(&storage).map_err(|e| ContentError::Upload(e.to_string()))?;

    let file_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
    let full_path = format!("{storage}{file_name}");
    fs::write(&full_path, file_bytes).map_err(|e| ContentError::Upload(e.to_string()))?;

    let thumb_name = if with_thumb {
        let dims = Setting::get_or(pool, "uploads_thumb_size", "300x300");
        let (w, h) = parse_dimensions(&dims);
        let thumb = img.resize(w, h, FilterType::Lanczos3);
        let name = format!("thumb_{file_name}");
        thumb
            .save(format!("{storage}{name}"))
            .map_err(|e| ContentError::Upload(e.to_string()))?;
        Some(name)
    } else {
        None
    };

    Ok(StoredImage {
        file_name,
        thumb_name,
    })
}

/// Best-effort removal of a stored upload. Rows are the source of truth, so a
/// missing file is only logged.
pub fn delete_file(pool: &DbPool, file_name: &str) {
    if file_name.is_empty() {
        return;
    }
    let full_path = format!("{}{}", storage_path(pool), file_name);
    if let Err(e) = fs::remove_file(&full_path) {
        log::warn!("could not remove upload {full_path}: {e}");
    }
}

fn parse_dimensions(s: &str) -> (u32, u32) {
    let mut parts = s.split('x');
    match (parts.next(), parts.next()) {
        (Some(w), Some(h)) => (w.parse().unwrap_or(300), h.parse().unwrap_or(300)),
        _ => (300, 300),
    }
}
