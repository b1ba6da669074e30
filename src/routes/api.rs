//! Guest-facing JSON endpoints: the room-service menu, order placement and
//! the contact form. Everything else is behind the admin guard.

use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::db::DbPool;
use crate::models::menu::MenuItem;
use crate::models::message::{GuestMessage, GuestMessageForm};
use crate::models::order::{RoomOrder, RoomOrderForm};
use crate::models::settings::Setting;
use crate::rate_limit::RateLimiter;

#[get("/menu")]
pub fn menu(pool: &State<DbPool>) -> Json<Value> {
    let items: Vec<MenuItem> = MenuItem::list(pool, None)
        .into_iter()
        .filter(|i| i.is_active)
        .collect();
    Json(json!({ "items": items }))
}

#[derive(Debug, Deserialize)]
pub struct OrderPayload {
    pub room_number: String,
    pub guest_name: Option<String>,
    pub items: Vec<Value>,
    pub total: f64,
    pub note: Option<String>,
}

#[post("/orders", data = "<payload>")]
pub fn place_order(
    payload: Json<OrderPayload>,
    pool: &State<DbPool>,
    limiter: &State<RateLimiter>,
    client_ip: Option<std::net::IpAddr>,
) -> Json<Value> {
    if !Setting::get_bool(pool, "room_service_enabled") {
        return Json(json!({ "ok": false, "error": "Room service is currently unavailable" }));
    }

    let ip = client_ip.map(|a| a.to_string()).unwrap_or_default();
    let rate_key = format!("order:{}", auth::hash_ip(&ip));
    if !limiter.check_and_record(&rate_key, 10, std::time::Duration::from_secs(600)) {
        return Json(json!({ "ok": false, "error": "Too many orders, please wait a moment" }));
    }

    let form = RoomOrderForm {
        room_number: payload.room_number.clone(),
        guest_name: payload.guest_name.clone(),
        items_json: Value::Array(payload.items.clone()).to_string(),
        total: payload.total,
        note: payload.note.clone(),
    };
    match RoomOrder::create(pool, &form) {
        Ok(id) => Json(json!({ "ok": true, "order_id": id })),
        Err(e) => Json(json!({ "ok": false, "error": e.user_message() })),
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub body: String,
}

#[post("/contact", data = "<payload>")]
pub fn contact(
    payload: Json<ContactPayload>,
    pool: &State<DbPool>,
    limiter: &State<RateLimiter>,
    client_ip: Option<std::net::IpAddr>,
) -> Json<Value> {
    let ip = client_ip.map(|a| a.to_string()).unwrap_or_default();
    let rate_key = format!("contact:{}", auth::hash_ip(&ip));
    if !limiter.check_and_record(&rate_key, 5, std::time::Duration::from_secs(600)) {
        return Json(json!({ "ok": false, "error": "Too many messages, please wait a moment" }));
    }

    let form = GuestMessageForm {
        name: payload.name.clone(),
        email: payload.email.clone(),
        phone: payload.phone.clone(),
        subject: payload.subject.clone(),
        body: payload.body.clone(),
    };
    match GuestMessage::create(pool, &form) {
        Ok(_) => Json(json!({ "ok": true })),
        Err(e) => Json(json!({ "ok": false, "error": e.user_message() })),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![menu, place_order, contact]
}
