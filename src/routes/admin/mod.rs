use rocket::fs::TempFile;
use rocket::tokio::io::AsyncReadExt;

use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::uploads::{self, StoredImage};
use crate::AdminSlug;

pub mod api;
pub mod blocks;
pub mod dashboard;
pub mod features;
pub mod gallery;
pub mod menu;
pub mod messages;
pub mod orders;
pub mod overlay;
pub mod sections;
pub mod services;
pub mod settings;

/// Helper: the admin base path from managed state.
pub(crate) fn admin_base(slug: &AdminSlug) -> String {
    format!("/{}", slug.0)
}

/// Read a multipart upload into memory and store it through the uploads
/// module. The original filename is kept only for its extension.
pub(crate) async fn save_image(
    pool: &DbPool,
    file: &mut TempFile<'_>,
    with_thumb: bool,
) -> ContentResult<StoredImage> {
    let name = file
        .raw_name()
        .map(|rn| rn.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .or_else(|| {
            file.content_type()
                .and_then(|ct| ct.extension())
                .map(|e| format!("upload.{}", e))
        })
        .ok_or_else(|| ContentError::Upload("Missing filename".to_string()))?;

    let mut stream = file
        .open()
        .await
        .map_err(|e| ContentError::Upload(e.to_string()))?;
    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| ContentError::Upload(e.to_string()))?;

    uploads::save_upload(pool, &bytes, &name, with_thumb)
}

/// Pass a store result through, dropping the named files when the store
/// refused the mutation. Uploads hit disk before the row write, so a rejected
/// call would otherwise strand the fresh file in the uploads directory.
pub(crate) fn discard_on_err<T>(
    pool: &DbPool,
    result: ContentResult<T>,
    files: &[Option<String>],
) -> ContentResult<T> {
    if result.is_err() {
        for file in files.iter().flatten() {
            uploads::delete_file(pool, file);
        }
    }
    result
}

/// Reorder payloads arrive as a JSON array whose elements may be numbers or
/// numeric strings depending on the client serializer.
pub(crate) fn parse_ids(raw: &[serde_json::Value]) -> Vec<i64> {
    raw.iter()
        .filter_map(|v| match v {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .collect()
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        dashboard::dashboard,
        sections::sections_list,
        sections::section_edit,
        sections::section_create,
        sections::section_rename,
        sections::section_delete,
        sections::section_appearance,
        blocks::block_create,
        blocks::block_update,
        blocks::block_delete,
        features::feature_create,
        features::feature_update,
        features::feature_delete,
        services::service_create,
        services::service_update,
        services::service_delete,
        gallery::gallery_create,
        gallery::gallery_update,
        gallery::gallery_delete,
        overlay::overlay_save,
        menu::menu_list,
        menu::menu_create,
        menu::menu_update,
        menu::menu_delete,
        orders::orders_list,
        orders::order_status,
        orders::order_delete,
        messages::messages_list,
        messages::message_mark,
        messages::message_delete,
        settings::settings_page,
        settings::settings_save,
    ]
}

pub fn api_routes() -> Vec<rocket::Route> {
    routes![
        api::counts,
        api::sections_reorder,
        api::blocks_reorder,
        api::features_reorder,
        api::services_reorder,
        api::gallery_reorder,
        api::menu_reorder,
    ]
}
