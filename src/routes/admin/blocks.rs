use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::response::{Flash, Redirect};
use rocket::State;

use super::{admin_base, discard_on_err, save_image};
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::block::{BlockForm, ContentBlock};
use crate::models::section::Section;
use crate::AdminSlug;

#[derive(FromForm)]
pub struct BlockFormData<'f> {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<TempFile<'f>>,
    pub image_alt: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub is_active: bool,
    pub remove_image: bool,
    pub csrf_token: String,
}

async fn resolve_upload(
    pool: &DbPool,
    form: &mut BlockFormData<'_>,
) -> Result<Option<String>, String> {
    match form.image.as_mut() {
        Some(f) if f.len() > 0 => match save_image(pool, f, false).await {
            Ok(stored) => Ok(Some(stored.file_name)),
            Err(e) => Err(e.user_message()),
        },
        _ => Ok(None),
    }
}

#[post("/sections/<code>/blocks/new", data = "<form>")]
pub async fn block_create(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    code: &str,
    mut form: Form<BlockFormData<'_>>,
) -> Flash<Redirect> {
    let back = format!("{}/sections/{}", admin_base(slug), code);
    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    let image_file = match resolve_upload(pool, &mut form).await {
        Ok(f) => f,
        Err(msg) => return Flash::error(Redirect::to(back), msg),
    };

    let block_form = BlockForm {
        title: form.title.clone(),
        description: form.description.clone(),
        image_file,
        image_alt: form.image_alt.clone(),
        link_url: form.link_url.clone(),
        link_text: form.link_text.clone(),
        is_active: form.is_active,
        remove_image: false,
    };
    let stored = [block_form.image_file.clone()];
    match discard_on_err(pool, ContentBlock::create(pool, code, &block_form), &stored) {
        Ok(_) => Flash::success(Redirect::to(back), "Block added"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[post("/blocks/<id>/edit", data = "<form>")]
pub async fn block_update(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    mut form: Form<BlockFormData<'_>>,
) -> Flash<Redirect> {
    let back = ContentBlock::find_by_id(pool, id)
        .and_then(|b| Section::find_by_id(pool, b.section_id))
        .map(|s| format!("{}/sections/{}", admin_base(slug), s.code))
        .unwrap_or_else(|| format!("{}/sections", admin_base(slug)));

    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    let image_file = match resolve_upload(pool, &mut form).await {
        Ok(f) => f,
        Err(msg) => return Flash::error(Redirect::to(back), msg),
    };

    let block_form = BlockForm {
        title: form.title.clone(),
        description: form.description.clone(),
        image_file,
        image_alt: form.image_alt.clone(),
        link_url: form.link_url.clone(),
        link_text: form.link_text.clone(),
        is_active: form.is_active,
        remove_image: form.remove_image,
    };
    let stored = [block_form.image_file.clone()];
    match discard_on_err(pool, ContentBlock::update(pool, id, &block_form), &stored) {
        Ok(()) => Flash::success(Redirect::to(back), "Block saved"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}

#[derive(FromForm)]
pub struct CsrfForm {
    pub csrf_token: String,
}

#[post("/blocks/<id>/delete", data = "<form>")]
pub fn block_delete(
    admin: AdminUser,
    pool: &State<DbPool>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    let back = ContentBlock::find_by_id(pool, id)
        .and_then(|b| Section::find_by_id(pool, b.section_id))
        .map(|s| format!("{}/sections/{}", admin_base(slug), s.code))
        .unwrap_or_else(|| format!("{}/sections", admin_base(slug)));

    if let Err(e) = admin.verify_csrf(&form.csrf_token) {
        return Flash::error(Redirect::to(back), e.user_message());
    }
    match ContentBlock::delete(pool, id) {
        Ok(()) => Flash::success(Redirect::to(back), "Block deleted"),
        Err(e) => Flash::error(Redirect::to(back), e.user_message()),
    }
}
