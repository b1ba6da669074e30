use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::admin_base;
use crate::auth::AdminUser;
use crate::catalog;
use crate::db::DbPool;
use crate::icons;
use crate::models::block::ContentBlock;
use crate::models::feature::Feature;
use crate::models::gallery::GalleryItem;
use crate::models::overlay::Overlay;
use crate::models::section::Section;
use crate::models::service::Service;
use crate::models::settings::Setting;
use crate::models::LANGS;
use crate::AdminSlug;

#[get("/sections")]
pub fn sections_list(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = json!({
        "page_title": "Page sections",
        "admin_base": admin_base(slug),
        "csrf_token": admin.csrf_token,
        "pages": Section::list_by_page(pool),
        "templates": catalog::TEMPLATES,
        "flash": flash.map(|f| json!({ "kind": f.kind(), "message": f.message() })),
        "settings": Setting::all(pool),
    });
    Template::render("admin/sections/list", &context)
}

#[get("/sections/<code>")]
pub fn section_edit(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    code: &str,
    flash: Option<FlashMessage<'_>>,
) -> Option<Template> {
    let section = Section::find_by_code(pool, code)?;

    let blocks = ContentBlock::list_for_section(pool, section.id);
    let features: Vec<_> = Feature::list_for_section(pool, section.id)
        .into_iter()
        .map(|f| {
            let translations = Feature::translations(pool, f.id);
            json!({ "feature": f, "translations": translations })
        })
        .collect();
    let services: Vec<_> = Service::list_for_section(pool, section.id)
        .into_iter()
        .map(|s| {
            let translations = Service::translations(pool, s.id);
            json!({ "service": s, "translations": translations })
        })
        .collect();
    let gallery: Vec<_> = GalleryItem::list_for_section(pool, section.id)
        .into_iter()
        .map(|g| {
            let translations = GalleryItem::translations(pool, g.id);
            json!({ "item": g, "translations": translations })
        })
        .collect();
    let overlay = if section.has_overlay {
        Overlay::get(pool, &section.code).ok()
    } else {
        None
    };

    let context = json!({
        "page_title": section.name,
        "admin_base": admin_base(slug),
        "csrf_token": admin.csrf_token,
        "section": section,
        "template": section.template(),
        "blocks": blocks,
        "features": features,
        "services": services,
        "gallery": gallery,
        "overlay": overlay,
        "icons": icons::ICONS,
        "icon_categories": icons::icon_categories(),
        "langs": LANGS,
        "flash": flash.map(|f| json!({ "kind": f.kind(), "message": f.message() })),
        "settings": Setting::all(pool),
    });
    Some(Template::render("admin/sections/edit", &context))
}

#[derive(FromForm)]
pub struct NewSectionForm {
    pub page: String,
    pub template_type: String,
    pub name: String,
    pub csrf_token: String,
}

#[post("/sections/new", data = "<form>")]
pub fn section_create(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    form: Form<NewSectionForm>,
) -> Flash<Redirect> {
    let list_url = format!("{}/sections", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(list_url), e.user_message());
    }
    match Section::create_dynamic(pool, &form.page, &form.template_type, &form.name) {
        Ok(section) => Flash::success(
            Redirect::to(format!("{}/sections/{}", admin_base(slug), section.code)),
            "Section created",
        ),
        Err(e) => Flash::error(Redirect::to(list_url), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct RenameForm {
    pub name: String,
    pub csrf_token: String,
}

#[post("/sections/<code>/rename", data = "<form>")]
pub fn section_rename(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    code: &str,
    form: Form<RenameForm>,
) -> Flash<Redirect> {
    let back = format!("{}/sections/{}", admin_base(slug), code);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match Section::rename_dynamic(pool, code, &form.name) {
        Ok(()) => Flash::success(Redirect::to(back), "Section renamed"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct CsrfOnlyForm {
    pub csrf_token: String,
}

#[post("/sections/<code>/delete", data = "<form>")]
pub fn section_delete(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    code: &str,
    form: Form<CsrfOnlyForm>,
) -> Flash<Redirect> {
    let list_url = format!("{}/sections", admin_base(slug));
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(list_url), e.user_message());
    }
    match Section::delete_dynamic(pool, code) {
        Ok(()) => Flash::success(Redirect::to(list_url), "Section deleted"),
        Err(e) => Flash::error(Redirect::to(list_url), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct AppearanceForm {
    pub background_color: Option<String>,
    pub image_position: Option<String>,
    pub csrf_token: String,
}

#[post("/sections/<code>/appearance", data = "<form>")]
pub fn section_appearance(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    code: &str,
    form: Form<AppearanceForm>,
) -> Flash<Redirect> {
    let back = format!("{}/sections/{}", admin_base(slug), code);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    if let Some(color) = form.background_color.as_deref() {
        if let Err(e) = Section::set_background_color(pool, code, color) {
            return Flash::error(Redirect::to(back), e.user_message());
        }
    }
    if let Some(position) = form.image_position.as_deref() {
        if let Err(e) = Section::set_image_position(pool, code, position) {
            return Flash::error(Redirect::to(back), e.user_message());
        }
    }
    Flash::success(Redirect::to(back), "Appearance saved")
}
