use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::admin_base;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::message::GuestMessage;
use crate::models::settings::Setting;
use crate::AdminSlug;

#[get("/messages?<unread>&<page>")]
pub fn messages_list(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    unread: Option<bool>,
    page: Option<i64>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let per_page = 20i64;
    let current_page = page.unwrap_or(1).max(1);
    let offset = (current_page - 1) * per_page;
    let unread_only = unread.unwrap_or(false);

    let total = GuestMessage::count(pool);
    let total_pages = (total as f64 / per_page as f64).ceil() as i64;

    let context = json!({
        "page_title": "Guest messages",
        "admin_base": admin_base(slug),
        "csrf_token": admin.csrf_token,
        "messages": GuestMessage::list(pool, unread_only, per_page, offset),
        "unread_only": unread_only,
        "unread_count": GuestMessage::unread_count(pool),
        "current_page": current_page,
        "total_pages": total_pages,
        "total": total,
        "flash": flash.map(|f| json!({ "kind": f.kind(), "message": f.message() })),
        "settings": Setting::all(pool),
    });
    Template::render("admin/messages/list", &context)
}

#[derive(FromForm)]
pub struct MarkForm {
    pub read: bool,
    pub csrf_token: String,
}

#[post("/messages/<id>/mark", data = "<form>")]
pub fn message_mark(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<MarkForm>,
) -> Flash<Redirect> {
    let back = format!("{}/messages", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match GuestMessage::set_read(pool, id, form.read) {
        Ok(()) => Flash::success(Redirect::to(back), "Message updated"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct CsrfForm {
    pub csrf_token: String,
}

#[post("/messages/<id>/delete", data = "<form>")]
pub fn message_delete(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    let back = format!("{}/messages", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match GuestMessage::delete(pool, id) {
        Ok(()) => Flash::success(Redirect::to(back), "Message deleted"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}
