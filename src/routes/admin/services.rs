use std::collections::HashMap;

use rocket::form::Form;
use rocket::response::{Flash, Redirect};
use rocket::State;

use super::admin_base;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::section::Section;
use crate::models::service::{Service, ServiceForm, ServiceTranslation};
use crate::AdminSlug;

#[derive(FromForm)]
pub struct ServiceFormData {
    pub icon_code: Option<String>,
    pub label: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub label_en: Option<String>,
    pub description_en: Option<String>,
    pub label_es: Option<String>,
    pub description_es: Option<String>,
    pub label_it: Option<String>,
    pub description_it: Option<String>,
    pub csrf_token: String,
}

impl ServiceFormData {
    fn to_form(&self) -> ServiceForm {
        let mut translations = HashMap::new();
        for (lang, label, description) in [
            ("en", &self.label_en, &self.description_en),
            ("es", &self.label_es, &self.description_es),
            ("it", &self.label_it, &self.description_it),
        ] {
            if let Some(l) = label {
                translations.insert(
                    lang.to_string(),
                    ServiceTranslation {
                        label: l.clone(),
                        description: description.clone().unwrap_or_default(),
                    },
                );
            }
        }
        ServiceForm {
            icon_code: self.icon_code.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            is_active: self.is_active,
            translations,
        }
    }
}

fn back_for_service(pool: &DbPool, slug: &AdminSlug, id: i64) -> String {
    Service::find_by_id(pool, id)
        .and_then(|s| Section::find_by_id(pool, s.section_id))
        .map(|s| format!("{}/sections/{}", admin_base(slug), s.code))
        .unwrap_or_else(|| format!("{}/sections", admin_base(slug)))
}

#[post("/sections/<code>/services/new", data = "<form>")]
pub fn service_create(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    code: &str,
    form: Form<ServiceFormData>,
) -> Flash<Redirect> {
    let back = format!("{}/sections/{}", admin_base(slug), code);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match Service::create(pool, code, &form.to_form()) {
        Ok(_) => Flash::success(Redirect::to(back), "Service added"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[post("/services/<id>/edit", data = "<form>")]
pub fn service_update(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<ServiceFormData>,
) -> Flash<Redirect> {
    let back = back_for_service(pool, slug, id);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match Service::update(pool, id, &form.to_form()) {
        Ok(()) => Flash::success(Redirect::to(back), "Service saved"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct CsrfForm {
    pub csrf_token: String,
}

#[post("/services/<id>/delete", data = "<form>")]
pub fn service_delete(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    let back = back_for_service(pool, slug, id);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match Service::delete(pool, id) {
        Ok(()) => Flash::success(Redirect::to(back), "Service deleted"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}
