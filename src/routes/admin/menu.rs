use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{admin_base, discard_on_err, save_image};
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::menu::{MenuItem, MenuItemForm, MENU_CATEGORIES};
use crate::models::settings::Setting;
use crate::AdminSlug;

#[get("/menu?<category>")]
pub fn menu_list(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    category: Option<String>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = json!({
        "page_title": "Room-service menu",
        "admin_base": admin_base(slug),
        "csrf_token": admin.csrf_token,
        "items": MenuItem::list(pool, category.as_deref()),
        "categories": MENU_CATEGORIES,
        "category_filter": category,
        "flash": flash.map(|f| json!({ "kind": f.kind(), "message": f.message() })),
        "settings": Setting::all(pool),
    });
    Template::render("admin/menu/list", &context)
}

#[derive(FromForm)]
pub struct MenuItemFormData<'f> {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image: Option<TempFile<'f>>,
    pub is_active: bool,
    pub csrf_token: String,
}

async fn resolve_upload(
    pool: &DbPool,
    form: &mut MenuItemFormData<'_>,
) -> Result<Option<String>, String> {
    match form.image.as_mut() {
        Some(f) if f.len() > 0 => match save_image(pool, f, false).await {
            Ok(stored) => Ok(Some(stored.file_name)),
            Err(e) => Err(e.user_message()),
        },
        _ => Ok(None),
    }
}

#[post("/menu/new", data = "<form>")]
pub async fn menu_create(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    mut form: Form<MenuItemFormData<'_>>,
) -> Flash<Redirect> {
    let back = format!("{}/menu", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    let image_file = match resolve_upload(pool, &mut form).await {
        Ok(f) => f,
        Err(msg) => return Flash::error(Redirect::to(back), msg),
    };
    let item_form = MenuItemForm {
        name: form.name.clone(),
        description: form.description.clone(),
        price: form.price,
        category: form.category.clone(),
        image_file,
        is_active: form.is_active,
    };
    let stored = [item_form.image_file.clone()];
    match discard_on_err(pool, MenuItem::create(pool, &item_form), &stored) {
        Ok(_) => Flash::success(Redirect::to(back), "Menu item added"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[post("/menu/<id>/edit", data = "<form>")]
pub async fn menu_update(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    mut form: Form<MenuItemFormData<'_>>,
) -> Flash<Redirect> {
    let back = format!("{}/menu", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    let image_file = match resolve_upload(pool, &mut form).await {
        Ok(f) => f,
        Err(msg) => return Flash::error(Redirect::to(back), msg),
    };
    let item_form = MenuItemForm {
        name: form.name.clone(),
        description: form.description.clone(),
        price: form.price,
        category: form.category.clone(),
        image_file,
        is_active: form.is_active,
    };
    let stored = [item_form.image_file.clone()];
    match discard_on_err(pool, MenuItem::update(pool, id, &item_form), &stored) {
        Ok(()) => Flash::success(Redirect::to(back), "Menu item saved"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct CsrfForm {
    pub csrf_token: String,
}

#[post("/menu/<id>/delete", data = "<form>")]
pub fn menu_delete(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    let back = format!("{}/menu", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match MenuItem::delete(pool, id) {
        Ok(()) => Flash::success(Redirect::to(back), "Menu item deleted"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}
