use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::admin_base;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::order::{RoomOrder, ORDER_STATUSES};
use crate::models::settings::Setting;
use crate::AdminSlug;

#[get("/orders?<status>&<page>")]
pub fn orders_list(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    status: Option<String>,
    page: Option<i64>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let per_page = 20i64;
    let current_page = page.unwrap_or(1).max(1);
    let offset = (current_page - 1) * per_page;

    let total = RoomOrder::count(pool, status.as_deref());
    let total_pages = (total as f64 / per_page as f64).ceil() as i64;

    let context = json!({
        "page_title": "Room-service orders",
        "admin_base": admin_base(slug),
        "csrf_token": admin.csrf_token,
        "orders": RoomOrder::list(pool, status.as_deref(), per_page, offset),
        "statuses": ORDER_STATUSES,
        "status_filter": status,
        "current_page": current_page,
        "total_pages": total_pages,
        "total": total,
        "count_pending": RoomOrder::count(pool, Some("pending")),
        "poll_seconds": Setting::get_i64(pool, "orders_poll_seconds").max(5),
        "flash": flash.map(|f| json!({ "kind": f.kind(), "message": f.message() })),
        "settings": Setting::all(pool),
    });
    Template::render("admin/orders/list", &context)
}

#[derive(FromForm)]
pub struct StatusForm {
    pub status: String,
    pub csrf_token: String,
}

#[post("/orders/<id>/status", data = "<form>")]
pub fn order_status(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<StatusForm>,
) -> Flash<Redirect> {
    let back = format!("{}/orders", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match RoomOrder::update_status(pool, id, &form.status) {
        Ok(()) => Flash::success(Redirect::to(back), "Order updated"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct CsrfForm {
    pub csrf_token: String,
}

#[post("/orders/<id>/delete", data = "<form>")]
pub fn order_delete(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    let back = format!("{}/orders", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match RoomOrder::delete(pool, id) {
        Ok(()) => Flash::success(Redirect::to(back), "Order deleted"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}
