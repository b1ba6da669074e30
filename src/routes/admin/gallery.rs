use std::collections::HashMap;

use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::response::{Flash, Redirect};
use rocket::State;

use super::{admin_base, discard_on_err, save_image};
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::gallery::{GalleryForm, GalleryItem, GalleryTranslation};
use crate::models::section::Section;
use crate::AdminSlug;

#[derive(FromForm)]
pub struct GalleryFormData<'f> {
    pub image: Option<TempFile<'f>>,
    pub title: String,
    pub description: Option<String>,
    pub image_alt: Option<String>,
    pub is_active: bool,
    pub title_en: Option<String>,
    pub description_en: Option<String>,
    pub title_es: Option<String>,
    pub description_es: Option<String>,
    pub title_it: Option<String>,
    pub description_it: Option<String>,
    pub csrf_token: String,
}

impl GalleryFormData<'_> {
    fn to_form(&self, image_file: Option<String>, thumb_file: Option<String>) -> GalleryForm {
        let mut translations = HashMap::new();
        for (lang, title, description) in [
            ("en", &self.title_en, &self.description_en),
            ("es", &self.title_es, &self.description_es),
            ("it", &self.title_it, &self.description_it),
        ] {
            if let Some(t) = title {
                translations.insert(
                    lang.to_string(),
                    GalleryTranslation {
                        title: t.clone(),
                        description: description.clone().unwrap_or_default(),
                    },
                );
            }
        }
        GalleryForm {
            image_file,
            thumb_file,
            title: self.title.clone(),
            description: self.description.clone(),
            image_alt: self.image_alt.clone(),
            is_active: self.is_active,
            translations,
        }
    }
}

/// Gallery uploads get a thumbnail alongside the original.
async fn resolve_upload(
    pool: &DbPool,
    form: &mut GalleryFormData<'_>,
) -> Result<(Option<String>, Option<String>), String> {
    match form.image.as_mut() {
        Some(f) if f.len() > 0 => match save_image(pool, f, true).await {
            Ok(stored) => Ok((Some(stored.file_name), stored.thumb_name)),
            Err(e) => Err(e.user_message()),
        },
        _ => Ok((None, None)),
    }
}

fn back_for_item(pool: &DbPool, slug: &AdminSlug, id: i64) -> String {
    GalleryItem::find_by_id(pool, id)
        .and_then(|g| Section::find_by_id(pool, g.section_id))
        .map(|s| format!("{}/sections/{}", admin_base(slug), s.code))
        .unwrap_or_else(|| format!("{}/sections", admin_base(slug)))
}

#[post("/sections/<code>/gallery/new", data = "<form>")]
pub async fn gallery_create(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    code: &str,
    mut form: Form<GalleryFormData<'_>>,
) -> Flash<Redirect> {
    let back = format!("{}/sections/{}", admin_base(slug), code);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    let (image_file, thumb_file) = match resolve_upload(pool, &mut form).await {
        Ok(files) => files,
        Err(msg) => return Flash::error(Redirect::to(back), msg),
    };
    let gallery_form = form.to_form(image_file, thumb_file);
    let stored = [
        gallery_form.image_file.clone(),
        gallery_form.thumb_file.clone(),
    ];
    match discard_on_err(pool, GalleryItem::create(pool, code, &gallery_form), &stored) {
        Ok(_) => Flash::success(Redirect::to(back), "Photo added"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[post("/gallery/<id>/edit", data = "<form>")]
pub async fn gallery_update(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    mut form: Form<GalleryFormData<'_>>,
) -> Flash<Redirect> {
    let back = back_for_item(pool, slug, id);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    let (image_file, thumb_file) = match resolve_upload(pool, &mut form).await {
        Ok(files) => files,
        Err(msg) => return Flash::error(Redirect::to(back), msg),
    };
    let gallery_form = form.to_form(image_file, thumb_file);
    let stored = [
        gallery_form.image_file.clone(),
        gallery_form.thumb_file.clone(),
    ];
    match discard_on_err(pool, GalleryItem::update(pool, id, &gallery_form), &stored) {
        Ok(()) => Flash::success(Redirect::to(back), "Photo saved"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct CsrfForm {
    pub csrf_token: String,
}

#[post("/gallery/<id>/delete", data = "<form>")]
pub fn gallery_delete(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    let back = back_for_item(pool, slug, id);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match GalleryItem::delete(pool, id) {
        Ok(()) => Flash::success(Redirect::to(back), "Photo deleted"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}
