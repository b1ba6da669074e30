use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::admin_base;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::block::ContentBlock;
use crate::models::gallery::GalleryItem;
use crate::models::message::GuestMessage;
use crate::models::order::RoomOrder;
use crate::models::section::Section;
use crate::models::settings::Setting;
use crate::AdminSlug;

#[get("/")]
pub fn dashboard(admin: AdminUser, pool: &State<DbPool>, slug: &State<AdminSlug>) -> Template {
    let pages = Section::list_by_page(pool);
    let section_total: usize = pages.iter().map(|p| p.sections.len()).sum();
    let mut block_total: i64 = 0;
    let mut gallery_total: usize = 0;
    for page in &pages {
        for section in &page.sections {
            block_total += ContentBlock::count_for_section(pool, section.id);
            if section.has_gallery {
                gallery_total += GalleryItem::list_for_section(pool, section.id).len();
            }
        }
    }

    let context = json!({
        "page_title": "Dashboard",
        "admin_base": admin_base(slug),
        "csrf_token": admin.csrf_token,
        "pages": pages,
        "section_total": section_total,
        "block_total": block_total,
        "gallery_total": gallery_total,
        "unread_messages": GuestMessage::unread_count(pool),
        "pending_orders": RoomOrder::count(pool, Some("pending")),
        "recent_orders": RoomOrder::list(pool, None, 5, 0),
        "recent_messages": GuestMessage::list(pool, false, 5, 0),
        "settings": Setting::all(pool),
    });

    Template::render("admin/dashboard", &context)
}
