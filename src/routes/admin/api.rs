//! JSON endpoints behind the admin guard: dashboard polling counts and the
//! drag-and-drop reorder protocol. Reorder payloads carry the CSRF token in
//! the body since they are not regular form posts.

use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_ids;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::error::ContentResult;
use crate::models::block::ContentBlock;
use crate::models::feature::Feature;
use crate::models::gallery::GalleryItem;
use crate::models::menu::MenuItem;
use crate::models::message::GuestMessage;
use crate::models::order::RoomOrder;
use crate::models::section::Section;
use crate::models::service::Service;

#[get("/counts")]
pub fn counts(_admin: AdminUser, pool: &State<DbPool>) -> Json<Value> {
    Json(json!({
        "pending_orders": RoomOrder::count(pool, Some("pending")),
        "unread_messages": GuestMessage::unread_count(pool),
    }))
}

fn respond(result: ContentResult<()>) -> Json<Value> {
    match result {
        Ok(()) => Json(json!({ "ok": true })),
        Err(e) => Json(json!({ "ok": false, "error": e.user_message() })),
    }
}

#[derive(Debug, Deserialize)]
pub struct SectionReorderPayload {
    pub csrf_token: String,
    pub page: String,
    pub codes: Vec<String>,
}

#[post("/sections/reorder", data = "<payload>")]
pub fn sections_reorder(
    admin: AdminUser,
    pool: &State<DbPool>,
    payload: Json<SectionReorderPayload>,
) -> Json<Value> {
    respond(
        admin
            .verify_csrf(&payload.csrf_token)
            .and_then(|()| Section::reorder(pool, &payload.page, &payload.codes)),
    )
}

#[derive(Debug, Deserialize)]
pub struct ChildReorderPayload {
    pub csrf_token: String,
    pub section: String,
    pub ids: Vec<Value>,
}

#[post("/blocks/reorder", data = "<payload>")]
pub fn blocks_reorder(
    admin: AdminUser,
    pool: &State<DbPool>,
    payload: Json<ChildReorderPayload>,
) -> Json<Value> {
    respond(admin.verify_csrf(&payload.csrf_token).and_then(|()| {
        ContentBlock::reorder(pool, &payload.section, &parse_ids(&payload.ids))
    }))
}

#[post("/features/reorder", data = "<payload>")]
pub fn features_reorder(
    admin: AdminUser,
    pool: &State<DbPool>,
    payload: Json<ChildReorderPayload>,
) -> Json<Value> {
    respond(admin.verify_csrf(&payload.csrf_token).and_then(|()| {
        Feature::reorder(pool, &payload.section, &parse_ids(&payload.ids))
    }))
}

#[post("/services/reorder", data = "<payload>")]
pub fn services_reorder(
    admin: AdminUser,
    pool: &State<DbPool>,
    payload: Json<ChildReorderPayload>,
) -> Json<Value> {
    respond(admin.verify_csrf(&payload.csrf_token).and_then(|()| {
        Service::reorder(pool, &payload.section, &parse_ids(&payload.ids))
    }))
}

#[post("/gallery/reorder", data = "<payload>")]
pub fn gallery_reorder(
    admin: AdminUser,
    pool: &State<DbPool>,
    payload: Json<ChildReorderPayload>,
) -> Json<Value> {
    respond(admin.verify_csrf(&payload.csrf_token).and_then(|()| {
        GalleryItem::reorder(pool, &payload.section, &parse_ids(&payload.ids))
    }))
}

#[derive(Debug, Deserialize)]
pub struct MenuReorderPayload {
    pub csrf_token: String,
    pub category: String,
    pub ids: Vec<Value>,
}

#[post("/menu/reorder", data = "<payload>")]
pub fn menu_reorder(
    admin: AdminUser,
    pool: &State<DbPool>,
    payload: Json<MenuReorderPayload>,
) -> Json<Value> {
    respond(admin.verify_csrf(&payload.csrf_token).and_then(|()| {
        MenuItem::reorder(pool, &payload.category, &parse_ids(&payload.ids))
    }))
}
