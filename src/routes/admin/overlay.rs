use std::collections::HashMap;

use rocket::form::Form;
use rocket::response::{Flash, Redirect};
use rocket::State;

use super::admin_base;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::overlay::{Overlay, OverlayFields};
use crate::AdminSlug;

#[derive(FromForm)]
pub struct OverlayFormData {
    pub subtitle: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub subtitle_en: Option<String>,
    pub title_en: Option<String>,
    pub description_en: Option<String>,
    pub subtitle_es: Option<String>,
    pub title_es: Option<String>,
    pub description_es: Option<String>,
    pub subtitle_it: Option<String>,
    pub title_it: Option<String>,
    pub description_it: Option<String>,
    pub csrf_token: String,
}

fn fields(
    subtitle: &Option<String>,
    title: &Option<String>,
    description: &Option<String>,
) -> OverlayFields {
    OverlayFields {
        subtitle: subtitle.clone().unwrap_or_default(),
        title: title.clone().unwrap_or_default(),
        description: description.clone().unwrap_or_default(),
    }
}

#[post("/sections/<code>/overlay", data = "<form>")]
pub fn overlay_save(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    code: &str,
    form: Form<OverlayFormData>,
) -> Flash<Redirect> {
    let back = format!("{}/sections/{}", admin_base(slug), code);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }

    let default_fields = fields(&form.subtitle, &form.title, &form.description);
    let mut translations: HashMap<String, OverlayFields> = HashMap::new();
    translations.insert(
        "en".to_string(),
        fields(&form.subtitle_en, &form.title_en, &form.description_en),
    );
    translations.insert(
        "es".to_string(),
        fields(&form.subtitle_es, &form.title_es, &form.description_es),
    );
    translations.insert(
        "it".to_string(),
        fields(&form.subtitle_it, &form.title_it, &form.description_it),
    );

    match Overlay::save(pool, code, &default_fields, &translations) {
        Ok(()) => Flash::success(Redirect::to(back), "Text saved"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}
