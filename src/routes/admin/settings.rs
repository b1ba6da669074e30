use std::collections::HashMap;

use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::admin_base;
use crate::auth::{self, AdminUser};
use crate::db::DbPool;
use crate::models::settings::Setting;
use crate::AdminSlug;

// Only keys the settings page owns may be written through it.
const EDITABLE_KEYS: &[&str] = &[
    "site_name",
    "site_url",
    "admin_email",
    "timezone",
    "session_expiry_hours",
    "login_rate_limit",
    "uploads_max_mb",
    "room_service_enabled",
    "room_service_hours",
    "orders_poll_seconds",
];

#[get("/settings")]
pub fn settings_page(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = json!({
        "page_title": "Settings",
        "admin_base": admin_base(slug),
        "csrf_token": admin.csrf_token,
        "flash": flash.map(|f| json!({ "kind": f.kind(), "message": f.message() })),
        "settings": Setting::all(pool),
    });
    Template::render("admin/settings", &context)
}

#[derive(FromForm)]
pub struct SettingsForm {
    pub values: HashMap<String, String>,
    pub new_password: Option<String>,
    pub csrf_token: String,
}

#[post("/settings", data = "<form>")]
pub fn settings_save(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    form: Form<SettingsForm>,
) -> Flash<Redirect> {
    let back = format!("{}/settings", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }

    let filtered: HashMap<String, String> = form
        .values
        .iter()
        .filter(|(k, _)| EDITABLE_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if let Err(e) = Setting::set_many(pool, &filtered) {
        return Flash::error(Redirect::to(back), e.user_message());
    }

    if let Some(password) = form.new_password.as_deref().filter(|p| !p.is_empty()) {
        if password.len() < 8 {
            return Flash::error(
                Redirect::to(back),
                "Password must be at least 8 characters",
            );
        }
        let hash = match auth::hash_password(password) {
            Ok(h) => h,
            Err(e) => return Flash::error(Redirect::to(back), e.user_message()),
        };
        if let Err(e) = Setting::set(pool, "admin_password_hash", &hash) {
            return Flash::error(Redirect::to(back), e.user_message());
        }
    }

    Flash::success(Redirect::to(back), "Settings saved")
}
