use std::collections::HashMap;

use rocket::form::Form;
use rocket::response::{Flash, Redirect};
use rocket::State;

use super::admin_base;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::feature::{Feature, FeatureForm};
use crate::models::section::Section;
use crate::AdminSlug;

/// The admin form carries one label field per translation language.
#[derive(FromForm)]
pub struct FeatureFormData {
    pub icon_code: Option<String>,
    pub label: String,
    pub is_active: bool,
    pub label_en: Option<String>,
    pub label_es: Option<String>,
    pub label_it: Option<String>,
    pub csrf_token: String,
}

impl FeatureFormData {
    fn to_form(&self) -> FeatureForm {
        let mut translations = HashMap::new();
        for (lang, label) in [
            ("en", &self.label_en),
            ("es", &self.label_es),
            ("it", &self.label_it),
        ] {
            if let Some(l) = label {
                translations.insert(lang.to_string(), l.clone());
            }
        }
        FeatureForm {
            icon_code: self.icon_code.clone(),
            label: self.label.clone(),
            is_active: self.is_active,
            translations,
        }
    }
}

fn back_for_feature(pool: &DbPool, slug: &AdminSlug, id: i64) -> String {
    Feature::find_by_id(pool, id)
        .and_then(|f| Section::find_by_id(pool, f.section_id))
        .map(|s| format!("{}/sections/{}", admin_base(slug), s.code))
        .unwrap_or_else(|| format!("{}/sections", admin_base(slug)))
}

#[post("/sections/<code>/features/new", data = "<form>")]
pub fn feature_create(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    code: &str,
    form: Form<FeatureFormData>,
) -> Flash<Redirect> {
    let back = format!("{}/sections/{}", admin_base(slug), code);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match Feature::create(pool, code, &form.to_form()) {
        Ok(_) => Flash::success(Redirect::to(back), "Feature added"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[post("/features/<id>/edit", data = "<form>")]
pub fn feature_update(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<FeatureFormData>,
) -> Flash<Redirect> {
    let back = back_for_feature(pool, slug, id);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match Feature::update(pool, id, &form.to_form()) {
        Ok(()) => Flash::success(Redirect::to(back), "Feature saved"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct CsrfForm {
    pub csrf_token: String,
}

#[post("/features/<id>/delete", data = "<form>")]
pub fn feature_delete(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    let back = back_for_feature(pool, slug, id);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match Feature::delete(pool, id) {
        Ok(()) => Flash::success(Redirect::to(back), "Feature deleted"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}
