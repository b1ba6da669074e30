#![cfg(test)]

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::collections::HashMap;

use crate::auth;
use crate::catalog::{self, ImageMode};
use crate::db::{run_migrations, seed_defaults, DbPool};
use crate::error::ContentError;
use crate::icons;
use crate::models::block::{BlockForm, ContentBlock};
use crate::models::feature::{Feature, FeatureForm};
use crate::models::gallery::{GalleryForm, GalleryItem, GalleryTranslation};
use crate::models::menu::{MenuItem, MenuItemForm};
use crate::models::message::{GuestMessage, GuestMessageForm};
use crate::models::order::{RoomOrder, RoomOrderForm};
use crate::models::overlay::{Overlay, OverlayFields};
use crate::models::section::Section;
use crate::models::service::{Service, ServiceForm, ServiceTranslation};
use crate::models::settings::Setting;
use crate::models::LANGS;
use crate::rate_limit::RateLimiter;
use crate::routes::admin::discard_on_err;

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Create a fresh in-memory SQLite pool with all migrations + seed defaults
/// applied. Uses a named shared-cache in-memory DB so multiple connections see
/// the same data. Pre-seeds admin_password_hash with a fast bcrypt hash to
/// avoid the expensive DEFAULT_COST hash in seed_defaults, and points the
/// uploads path at a per-test temp directory so file ownership tests can poke
/// the filesystem safely.
fn test_pool() -> DbPool {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:testdb_{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri);
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("Failed to create test pool");
    {
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    }
    run_migrations(&pool).expect("Failed to run migrations");
    {
        let conn = pool.get().unwrap();
        let fast = bcrypt::hash("admin", 4).unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES ('admin_password_hash', ?1)",
            rusqlite::params![fast],
        )
        .unwrap();
    }
    seed_defaults(&pool).expect("Failed to seed defaults");

    let dir = std::env::temp_dir().join(format!("concierge_test_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    Setting::set(&pool, "uploads_storage_path", &format!("{}/", dir.display())).unwrap();
    pool
}

/// Drop a dummy image file into the pool's uploads directory.
fn touch_upload(pool: &DbPool, name: &str) -> std::path::PathBuf {
    let dir = Setting::get(pool, "uploads_storage_path").unwrap();
    let path = std::path::PathBuf::from(format!("{}{}", dir, name));
    std::fs::write(&path, b"not really an image").unwrap();
    path
}

fn block_form(title: &str, image_file: Option<&str>) -> BlockForm {
    BlockForm {
        title: Some(title.to_string()),
        description: None,
        image_file: image_file.map(str::to_string),
        image_alt: None,
        link_url: None,
        link_text: None,
        is_active: true,
        remove_image: false,
    }
}

fn feature_form(label: &str, icon: Option<&str>) -> FeatureForm {
    FeatureForm {
        icon_code: icon.map(str::to_string),
        label: label.to_string(),
        is_active: true,
        translations: HashMap::new(),
    }
}

// ═══════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════

#[test]
fn settings_set_and_get() {
    let pool = test_pool();
    Setting::set(&pool, "test_key", "hello").unwrap();
    assert_eq!(Setting::get(&pool, "test_key"), Some("hello".to_string()));
    assert_eq!(Setting::get_or(&pool, "missing", "fallback"), "fallback");
}

#[test]
fn settings_upsert_overwrites() {
    let pool = test_pool();
    Setting::set(&pool, "key", "first").unwrap();
    Setting::set(&pool, "key", "second").unwrap();
    assert_eq!(Setting::get(&pool, "key"), Some("second".to_string()));
}

// ═══════════════════════════════════════════════════════════
// Template & icon catalogs
// ═══════════════════════════════════════════════════════════

#[test]
fn template_catalog_lookup() {
    let hero = catalog::find_template("hero").unwrap();
    assert_eq!(hero.image_mode, ImageMode::Required);
    assert!(hero.has_overlay);
    assert_eq!(hero.max_blocks, Some(1));
    assert!(catalog::find_template("carousel").is_none());

    let checklist = catalog::find_template("checklist").unwrap();
    assert!(checklist.has_features);
    assert_eq!(checklist.image_mode, ImageMode::Forbidden);
}

#[test]
fn image_mode_parse_defaults_to_optional() {
    assert_eq!(ImageMode::parse("required"), ImageMode::Required);
    assert_eq!(ImageMode::parse("forbidden"), ImageMode::Forbidden);
    assert_eq!(ImageMode::parse("garbage"), ImageMode::Optional);
}

#[test]
fn icon_catalog_lookup() {
    assert!(icons::find_icon("check").is_some());
    assert!(icons::find_icon("wifi").is_some());
    assert!(icons::find_icon("no-such-icon").is_none());
    assert!(icons::icon_categories().contains(&"amenities"));
}

// ═══════════════════════════════════════════════════════════
// Seeding & Section Registry
// ═══════════════════════════════════════════════════════════

#[test]
fn seed_creates_static_sections_with_template_flags() {
    let pool = test_pool();
    let hero = Section::find_by_code(&pool, "home_hero").unwrap();
    assert!(!hero.is_dynamic);
    assert!(hero.has_overlay);
    assert_eq!(hero.image_mode(), ImageMode::Required);
    assert_eq!(hero.max_blocks, Some(1));

    let services = Section::find_by_code(&pool, "home_services").unwrap();
    assert!(services.has_services);
    assert_eq!(services.image_mode(), ImageMode::Forbidden);
}

#[test]
fn seed_is_idempotent() {
    let pool = test_pool();
    let before = Section::list_by_page(&pool)
        .iter()
        .map(|p| p.sections.len())
        .sum::<usize>();
    seed_defaults(&pool).unwrap();
    let after = Section::list_by_page(&pool)
        .iter()
        .map(|p| p.sections.len())
        .sum::<usize>();
    assert_eq!(before, after);
}

#[test]
fn create_dynamic_derives_flags_and_position() {
    let pool = test_pool();
    let before = Section::list_for_page(&pool, "home").len() as i64;
    let section = Section::create_dynamic(&pool, "home", "services_grid", "Extra services").unwrap();
    assert!(section.is_dynamic);
    assert!(section.has_services);
    assert!(!section.has_gallery);
    assert_eq!(section.image_mode(), ImageMode::Forbidden);
    assert_eq!(section.position, before);
}

#[test]
fn create_dynamic_disambiguates_codes() {
    let pool = test_pool();
    let first = Section::create_dynamic(&pool, "home", "text_image", "Summer Offers").unwrap();
    let second = Section::create_dynamic(&pool, "home", "text_image", "Summer Offers").unwrap();
    assert_eq!(first.code, "summer_offers");
    assert_eq!(second.code, "summer_offers_2");
}

#[test]
fn create_dynamic_rejects_bad_input() {
    let pool = test_pool();
    assert!(matches!(
        Section::create_dynamic(&pool, "home", "carousel", "Nope"),
        Err(ContentError::Validation(_))
    ));
    assert!(matches!(
        Section::create_dynamic(&pool, "", "text_image", "Nope"),
        Err(ContentError::Validation(_))
    ));
    assert!(matches!(
        Section::create_dynamic(&pool, "home", "text_image", "   "),
        Err(ContentError::Validation(_))
    ));
}

#[test]
fn rename_only_touches_dynamic_sections() {
    let pool = test_pool();
    assert!(matches!(
        Section::rename_dynamic(&pool, "home_hero", "New name"),
        Err(ContentError::Validation(_))
    ));

    let section = Section::create_dynamic(&pool, "home", "text_image", "Old name").unwrap();
    Section::rename_dynamic(&pool, &section.code, "New name").unwrap();
    assert_eq!(
        Section::find_by_code(&pool, &section.code).unwrap().name,
        "New name"
    );
}

#[test]
fn sections_reorder_within_page() {
    let pool = test_pool();
    let mut codes: Vec<String> = Section::list_for_page(&pool, "home")
        .iter()
        .map(|s| s.code.clone())
        .collect();
    codes.reverse();
    // A code from another page rides along and must be skipped.
    codes.push("rooms_hero".to_string());

    Section::reorder(&pool, "home", &codes).unwrap();

    let after: Vec<String> = Section::list_for_page(&pool, "home")
        .iter()
        .map(|s| s.code.clone())
        .collect();
    assert_eq!(after, codes[..codes.len() - 1].to_vec());

    let rooms_hero = Section::find_by_code(&pool, "rooms_hero").unwrap();
    assert_eq!(rooms_hero.position, 0);
}

#[test]
fn appearance_gated_by_template_support() {
    let pool = test_pool();
    // services_grid has no image placement
    assert!(matches!(
        Section::set_background_color(&pool, "home_services", "#fafafa"),
        Err(ContentError::Validation(_))
    ));

    Section::set_background_color(&pool, "home_intro", "#fafafa").unwrap();
    Section::set_image_position(&pool, "home_intro", "left").unwrap();
    let intro = Section::find_by_code(&pool, "home_intro").unwrap();
    assert_eq!(intro.background_color.as_deref(), Some("#fafafa"));
    assert_eq!(intro.image_position.as_deref(), Some("left"));
}

#[test]
fn list_by_page_groups_in_position_order() {
    let pool = test_pool();
    let pages = Section::list_by_page(&pool);
    let home = pages.iter().find(|p| p.page == "home").unwrap();
    let positions: Vec<i64> = home.sections.iter().map(|s| s.position).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

// ═══════════════════════════════════════════════════════════
// Content blocks: image mode, max_blocks, field visibility
// ═══════════════════════════════════════════════════════════

#[test]
fn required_image_mode_rejects_missing_image() {
    let pool = test_pool();
    let result = ContentBlock::create(&pool, "home_hero", &block_form("No image", None));
    assert!(matches!(result, Err(ContentError::Validation(_))));
    let hero = Section::find_by_code(&pool, "home_hero").unwrap();
    assert_eq!(ContentBlock::count_for_section(&pool, hero.id), 0);
}

#[test]
fn forbidden_image_mode_rejects_image_on_create_and_update() {
    let pool = test_pool();
    let section = Section::create_dynamic(&pool, "rooms", "features_list", "Highlights").unwrap();

    assert!(matches!(
        ContentBlock::create(&pool, &section.code, &block_form("X", Some("a.jpg"))),
        Err(ContentError::Validation(_))
    ));

    let id = ContentBlock::create(&pool, &section.code, &block_form("X", None)).unwrap();
    assert!(matches!(
        ContentBlock::update(&pool, id, &block_form("X", Some("a.jpg"))),
        Err(ContentError::Validation(_))
    ));
    assert!(ContentBlock::find_by_id(&pool, id).unwrap().image_file.is_none());
}

#[test]
fn max_blocks_cap_is_enforced() {
    let pool = test_pool();
    // banner caps at a single block
    let section = Section::create_dynamic(&pool, "contact", "banner", "Promo").unwrap();
    ContentBlock::create(&pool, &section.code, &block_form("First", None)).unwrap();
    assert!(matches!(
        ContentBlock::create(&pool, &section.code, &block_form("Second", None)),
        Err(ContentError::Validation(_))
    ));
    assert_eq!(ContentBlock::count_for_section(&pool, section.id), 1);
}

#[test]
fn fields_without_capability_flag_are_dropped() {
    let pool = test_pool();
    // hero has neither title nor description
    touch_upload(&pool, "hero.jpg");
    let id = ContentBlock::create(&pool, "home_hero", &block_form("Ignored", Some("hero.jpg"))).unwrap();
    let block = ContentBlock::find_by_id(&pool, id).unwrap();
    assert!(block.title.is_none());
    assert_eq!(block.image_file.as_deref(), Some("hero.jpg"));
}

#[test]
fn block_image_replace_deletes_old_file_after_row_update() {
    let pool = test_pool();
    let section = Section::create_dynamic(&pool, "home", "text_image", "Story").unwrap();
    let old = touch_upload(&pool, "old.jpg");
    let id = ContentBlock::create(&pool, &section.code, &block_form("Story", Some("old.jpg"))).unwrap();

    touch_upload(&pool, "new.jpg");
    ContentBlock::update(&pool, id, &block_form("Story", Some("new.jpg"))).unwrap();

    let block = ContentBlock::find_by_id(&pool, id).unwrap();
    assert_eq!(block.image_file.as_deref(), Some("new.jpg"));
    assert!(!old.exists());
}

#[test]
fn block_remove_image_rejected_when_required() {
    let pool = test_pool();
    touch_upload(&pool, "hero.jpg");
    let id = ContentBlock::create(&pool, "home_hero", &block_form("", Some("hero.jpg"))).unwrap();

    let mut form = block_form("", None);
    form.remove_image = true;
    assert!(matches!(
        ContentBlock::update(&pool, id, &form),
        Err(ContentError::Validation(_))
    ));
    assert!(ContentBlock::find_by_id(&pool, id).unwrap().image_file.is_some());
}

#[test]
fn rejected_create_discards_stored_upload() {
    let pool = test_pool();
    // forbidden-mode section: the store refuses the block, so the file the
    // handler already wrote must not stay behind
    let section = Section::create_dynamic(&pool, "rooms", "features_list", "Perks").unwrap();
    let stray = touch_upload(&pool, "stray.jpg");
    let form = block_form("X", Some("stray.jpg"));
    let result = discard_on_err(
        &pool,
        ContentBlock::create(&pool, &section.code, &form),
        &[form.image_file.clone()],
    );
    assert!(matches!(result, Err(ContentError::Validation(_))));
    assert!(!stray.exists());
    assert_eq!(ContentBlock::count_for_section(&pool, section.id), 0);

    // accepted mutations keep their file
    let story = Section::create_dynamic(&pool, "rooms", "text_image", "Story").unwrap();
    let kept = touch_upload(&pool, "kept.jpg");
    let form = block_form("Y", Some("kept.jpg"));
    discard_on_err(
        &pool,
        ContentBlock::create(&pool, &story.code, &form),
        &[form.image_file.clone()],
    )
    .unwrap();
    assert!(kept.exists());
}

#[test]
fn rejected_create_over_cap_discards_stored_upload() {
    let pool = test_pool();
    let section = Section::create_dynamic(&pool, "contact", "banner", "Promo").unwrap();
    ContentBlock::create(&pool, &section.code, &block_form("First", None)).unwrap();

    let stray = touch_upload(&pool, "second.jpg");
    let form = block_form("Second", Some("second.jpg"));
    let result = discard_on_err(
        &pool,
        ContentBlock::create(&pool, &section.code, &form),
        &[form.image_file.clone()],
    );
    assert!(matches!(result, Err(ContentError::Validation(_))));
    assert!(!stray.exists());
    assert_eq!(ContentBlock::count_for_section(&pool, section.id), 1);
}

#[test]
fn block_delete_removes_file_and_is_idempotent() {
    let pool = test_pool();
    let section = Section::create_dynamic(&pool, "home", "text_image", "Story").unwrap();
    let file = touch_upload(&pool, "story.jpg");
    let id = ContentBlock::create(&pool, &section.code, &block_form("Story", Some("story.jpg"))).unwrap();

    ContentBlock::delete(&pool, id).unwrap();
    assert!(!file.exists());
    assert!(matches!(
        ContentBlock::delete(&pool, id),
        Err(ContentError::NotFound("block"))
    ));
}

// ═══════════════════════════════════════════════════════════
// Reorder protocol
// ═══════════════════════════════════════════════════════════

#[test]
fn reorder_full_permutation_and_identity() {
    let pool = test_pool();
    let section = Section::create_dynamic(&pool, "home", "text_image", "Paragraphs").unwrap();
    let ids: Vec<i64> = (0..4)
        .map(|i| ContentBlock::create(&pool, &section.code, &block_form(&format!("B{i}"), None)).unwrap())
        .collect();

    let mut reversed = ids.clone();
    reversed.reverse();
    ContentBlock::reorder(&pool, &section.code, &reversed).unwrap();

    let after: Vec<i64> = ContentBlock::list_for_section(&pool, section.id)
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(after, reversed);
    let positions: Vec<i64> = ContentBlock::list_for_section(&pool, section.id)
        .iter()
        .map(|b| b.position)
        .collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);

    // identity permutation is a fixpoint
    ContentBlock::reorder(&pool, &section.code, &after).unwrap();
    let again: Vec<i64> = ContentBlock::list_for_section(&pool, section.id)
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(again, after);
}

#[test]
fn reorder_empty_list_is_noop() {
    let pool = test_pool();
    let section = Section::create_dynamic(&pool, "home", "text_image", "Paragraphs").unwrap();
    let id = ContentBlock::create(&pool, &section.code, &block_form("Only", None)).unwrap();
    ContentBlock::reorder(&pool, &section.code, &[]).unwrap();
    assert_eq!(ContentBlock::find_by_id(&pool, id).unwrap().position, 0);
}

#[test]
fn reorder_skips_foreign_ids() {
    let pool = test_pool();
    let ours = Section::create_dynamic(&pool, "home", "text_image", "Ours").unwrap();
    let theirs = Section::create_dynamic(&pool, "home", "text_image", "Theirs").unwrap();
    let our_id = ContentBlock::create(&pool, &ours.code, &block_form("A", None)).unwrap();
    let their_id = ContentBlock::create(&pool, &theirs.code, &block_form("B", None)).unwrap();

    ContentBlock::reorder(&pool, &ours.code, &[their_id, our_id]).unwrap();

    // foreign block untouched, ours got its index
    assert_eq!(ContentBlock::find_by_id(&pool, their_id).unwrap().position, 0);
    assert_eq!(ContentBlock::find_by_id(&pool, our_id).unwrap().position, 1);
}

#[test]
fn reorder_duplicate_ids_last_occurrence_wins() {
    let pool = test_pool();
    let section = Section::create_dynamic(&pool, "home", "text_image", "Dupes").unwrap();
    let a = ContentBlock::create(&pool, &section.code, &block_form("A", None)).unwrap();
    let b = ContentBlock::create(&pool, &section.code, &block_form("B", None)).unwrap();

    // a appears at index 0 and again at index 2: the later write sticks
    ContentBlock::reorder(&pool, &section.code, &[a, b, a]).unwrap();
    assert_eq!(ContentBlock::find_by_id(&pool, a).unwrap().position, 2);
    assert_eq!(ContentBlock::find_by_id(&pool, b).unwrap().position, 1);
}

// ═══════════════════════════════════════════════════════════
// Features / services: validation, translations, scenario D
// ═══════════════════════════════════════════════════════════

#[test]
fn feature_requires_label_and_known_icon() {
    let pool = test_pool();
    assert!(matches!(
        Feature::create(&pool, "rooms_included", &feature_form("  ", None)),
        Err(ContentError::Validation(_))
    ));
    assert!(matches!(
        Feature::create(&pool, "rooms_included", &feature_form("Wi-Fi", Some("bogus"))),
        Err(ContentError::Validation(_))
    ));
    // sections without the flag refuse features
    assert!(matches!(
        Feature::create(&pool, "home_intro", &feature_form("Wi-Fi", Some("wifi"))),
        Err(ContentError::Validation(_))
    ));
}

#[test]
fn checklist_feature_defaults_to_check_icon() {
    let pool = test_pool();
    let id = Feature::create(&pool, "rooms_included", &feature_form("Towels", None)).unwrap();
    assert_eq!(Feature::find_by_id(&pool, id).unwrap().icon_code, "check");
}

#[test]
fn feature_translation_empty_label_clears_row() {
    let pool = test_pool();
    let mut form = feature_form("Wi-Fi gratuit", Some("wifi"));
    form.translations.insert("en".to_string(), "Free Wi-Fi".to_string());
    form.translations.insert("es".to_string(), "".to_string());
    let id = Feature::create(&pool, "rooms_included", &form).unwrap();

    let stored = Feature::translations(&pool, id);
    assert_eq!(stored.get("en").map(String::as_str), Some("Free Wi-Fi"));
    assert!(!stored.contains_key("es"));

    // full replace on update: clearing en removes the row, fallback applies
    form.translations.remove("en");
    Feature::update(&pool, id, &form).unwrap();
    assert!(Feature::translations(&pool, id).is_empty());
}

#[test]
fn feature_delete_is_idempotent() {
    let pool = test_pool();
    let id = Feature::create(&pool, "rooms_included", &feature_form("Towels", None)).unwrap();
    Feature::delete(&pool, id).unwrap();
    assert!(matches!(
        Feature::delete(&pool, id),
        Err(ContentError::NotFound("feature"))
    ));
}

#[test]
fn feature_reverse_reorder_then_delete_keeps_order() {
    let pool = test_pool();
    let section = Section::find_by_code(&pool, "rooms_included").unwrap();
    let ids: Vec<i64> = (0..5)
        .map(|i| Feature::create(&pool, "rooms_included", &feature_form(&format!("F{i}"), None)).unwrap())
        .collect();

    let mut reversed = ids.clone();
    reversed.reverse();
    Feature::reorder(&pool, "rooms_included", &reversed).unwrap();

    let listed: Vec<i64> = Feature::list_for_section(&pool, section.id)
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(listed, reversed);
    let positions: Vec<i64> = Feature::list_for_section(&pool, section.id)
        .iter()
        .map(|f| f.position)
        .collect();
    assert_eq!(positions, vec![0, 1, 2, 3, 4]);

    // drop the middle one: relative order of the survivors holds and
    // positions stay unique and ascending
    Feature::delete(&pool, reversed[2]).unwrap();
    let survivors: Vec<i64> = Feature::list_for_section(&pool, section.id)
        .iter()
        .map(|f| f.id)
        .collect();
    let expected: Vec<i64> = reversed
        .iter()
        .copied()
        .filter(|id| *id != reversed[2])
        .collect();
    assert_eq!(survivors, expected);
    let positions: Vec<i64> = Feature::list_for_section(&pool, section.id)
        .iter()
        .map(|f| f.position)
        .collect();
    let mut deduped = positions.clone();
    deduped.dedup();
    assert_eq!(positions, deduped);
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn service_requires_icon_explicitly() {
    let pool = test_pool();
    let form = ServiceForm {
        icon_code: None,
        label: "Breakfast".to_string(),
        description: Some("Served 7-10".to_string()),
        is_active: true,
        translations: HashMap::new(),
    };
    assert!(matches!(
        Service::create(&pool, "home_services", &form),
        Err(ContentError::Validation(_))
    ));
}

#[test]
fn service_translations_roundtrip() {
    let pool = test_pool();
    let mut form = ServiceForm {
        icon_code: Some("breakfast".to_string()),
        label: "Petit déjeuner".to_string(),
        description: Some("Servi de 7h à 10h".to_string()),
        is_active: true,
        translations: HashMap::new(),
    };
    form.translations.insert(
        "it".to_string(),
        ServiceTranslation {
            label: "Colazione".to_string(),
            description: "Dalle 7 alle 10".to_string(),
        },
    );
    let id = Service::create(&pool, "home_services", &form).unwrap();

    let stored = Service::translations(&pool, id);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored.get("it").unwrap().label, "Colazione");
}

// ═══════════════════════════════════════════════════════════
// Gallery
// ═══════════════════════════════════════════════════════════

fn gallery_form(title: &str, image: Option<&str>) -> GalleryForm {
    GalleryForm {
        image_file: image.map(str::to_string),
        thumb_file: None,
        title: title.to_string(),
        description: None,
        image_alt: None,
        is_active: true,
        translations: HashMap::new(),
    }
}

#[test]
fn gallery_create_requires_title_and_image() {
    let pool = test_pool();
    assert!(matches!(
        GalleryItem::create(&pool, "home_gallery", &gallery_form("", Some("p.jpg"))),
        Err(ContentError::Validation(_))
    ));
    assert!(matches!(
        GalleryItem::create(&pool, "home_gallery", &gallery_form("Pool", None)),
        Err(ContentError::Validation(_))
    ));
}

#[test]
fn gallery_delete_removes_files_and_is_idempotent() {
    let pool = test_pool();
    let image = touch_upload(&pool, "pool.jpg");
    let thumb = touch_upload(&pool, "thumb_pool.jpg");
    let mut form = gallery_form("Pool", Some("pool.jpg"));
    form.thumb_file = Some("thumb_pool.jpg".to_string());
    let id = GalleryItem::create(&pool, "home_gallery", &form).unwrap();

    GalleryItem::delete(&pool, id).unwrap();
    assert!(!image.exists());
    assert!(!thumb.exists());
    assert!(matches!(
        GalleryItem::delete(&pool, id),
        Err(ContentError::NotFound("gallery item"))
    ));
}

#[test]
fn rejected_gallery_create_discards_image_and_thumb() {
    let pool = test_pool();
    let image = touch_upload(&pool, "terrace.jpg");
    let thumb = touch_upload(&pool, "thumb_terrace.jpg");
    // missing title gets the item refused after both files are on disk
    let mut form = gallery_form("", Some("terrace.jpg"));
    form.thumb_file = Some("thumb_terrace.jpg".to_string());
    let stored = [form.image_file.clone(), form.thumb_file.clone()];
    let result = discard_on_err(&pool, GalleryItem::create(&pool, "home_gallery", &form), &stored);
    assert!(matches!(result, Err(ContentError::Validation(_))));
    assert!(!image.exists());
    assert!(!thumb.exists());
}

#[test]
fn gallery_update_without_new_image_keeps_old_file() {
    let pool = test_pool();
    let image = touch_upload(&pool, "lobby.jpg");
    let id = GalleryItem::create(&pool, "home_gallery", &gallery_form("Lobby", Some("lobby.jpg"))).unwrap();

    let mut form = gallery_form("Lobby at night", None);
    form.translations.insert(
        "en".to_string(),
        GalleryTranslation {
            title: "The lobby".to_string(),
            description: String::new(),
        },
    );
    GalleryItem::update(&pool, id, &form).unwrap();

    let item = GalleryItem::find_by_id(&pool, id).unwrap();
    assert_eq!(item.image_file, "lobby.jpg");
    assert_eq!(item.title, "Lobby at night");
    assert!(image.exists());
    assert_eq!(
        GalleryItem::translations(&pool, id).get("en").unwrap().title,
        "The lobby"
    );
}

// ═══════════════════════════════════════════════════════════
// Overlay: scenario A and the empty-translation asymmetry
// ═══════════════════════════════════════════════════════════

#[test]
fn overlay_save_and_get_with_empty_translations() {
    let pool = test_pool();
    let fields = OverlayFields {
        subtitle: "Welcome".to_string(),
        title: "Stay with us".to_string(),
        description: String::new(),
    };
    Overlay::save(&pool, "home_hero", &fields, &HashMap::new()).unwrap();

    let overlay = Overlay::get(&pool, "home_hero").unwrap();
    assert_eq!(overlay.fields.subtitle, "Welcome");
    assert_eq!(overlay.fields.title, "Stay with us");
    for lang in LANGS {
        let tr = overlay.translations.get(*lang).unwrap();
        assert_eq!(tr.subtitle, "");
        assert_eq!(tr.title, "");
        assert_eq!(tr.description, "");
    }
}

#[test]
fn overlay_empty_language_keeps_a_row() {
    let pool = test_pool();
    let fields = OverlayFields {
        subtitle: "Bienvenue".to_string(),
        title: "Notre hôtel".to_string(),
        description: String::new(),
    };
    let mut translations = HashMap::new();
    translations.insert(
        "en".to_string(),
        OverlayFields {
            subtitle: "Welcome".to_string(),
            title: "Our hotel".to_string(),
            description: String::new(),
        },
    );
    Overlay::save(&pool, "home_hero", &fields, &translations).unwrap();

    // unlike feature/service/gallery translations, the all-empty languages
    // still have rows holding empty strings
    let section = Section::find_by_code(&pool, "home_hero").unwrap();
    let conn = pool.get().unwrap();
    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM section_overlay_translations WHERE section_id = ?1",
            rusqlite::params![section.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, LANGS.len() as i64);

    let overlay = Overlay::get(&pool, "home_hero").unwrap();
    assert_eq!(overlay.translations.get("en").unwrap().subtitle, "Welcome");
    assert_eq!(overlay.translations.get("es").unwrap().subtitle, "");
}

#[test]
fn overlay_rejected_without_capability() {
    let pool = test_pool();
    assert!(matches!(
        Overlay::get(&pool, "home_intro"),
        Err(ContentError::Validation(_))
    ));
    assert!(matches!(
        Overlay::get(&pool, "no_such_section"),
        Err(ContentError::NotFound("section"))
    ));
}

// ═══════════════════════════════════════════════════════════
// Cascade delete
// ═══════════════════════════════════════════════════════════

#[test]
fn section_delete_cascades_rows_and_files() {
    let pool = test_pool();
    let section = Section::create_dynamic(&pool, "home", "gallery", "Garden").unwrap();
    let f1 = touch_upload(&pool, "g1.jpg");
    let f2 = touch_upload(&pool, "g2.jpg");
    let mut form = gallery_form("One", Some("g1.jpg"));
    form.translations.insert(
        "en".to_string(),
        GalleryTranslation {
            title: "One".to_string(),
            description: String::new(),
        },
    );
    let item = GalleryItem::create(&pool, &section.code, &form).unwrap();
    GalleryItem::create(&pool, &section.code, &gallery_form("Two", Some("g2.jpg"))).unwrap();

    Section::delete_dynamic(&pool, &section.code).unwrap();

    assert!(Section::find_by_code(&pool, &section.code).is_none());
    assert!(GalleryItem::list_for_section(&pool, section.id).is_empty());
    assert!(GalleryItem::translations(&pool, item).is_empty());
    assert!(!f1.exists());
    assert!(!f2.exists());
}

#[test]
fn seeded_sections_cannot_be_deleted() {
    let pool = test_pool();
    assert!(matches!(
        Section::delete_dynamic(&pool, "home_hero"),
        Err(ContentError::Validation(_))
    ));
    assert!(Section::find_by_code(&pool, "home_hero").is_some());
}

// ═══════════════════════════════════════════════════════════
// Auth, CSRF, rate limiting
// ═══════════════════════════════════════════════════════════

#[test]
fn session_lifecycle_and_csrf_token() {
    let pool = test_pool();
    let session_id = auth::create_session(&pool, None, None).unwrap();
    let token = auth::session_csrf_token(&pool, &session_id).unwrap();
    assert_eq!(token.len(), 64); // 32 random bytes, hex

    let admin = auth::AdminUser {
        session_id: session_id.clone(),
        csrf_token: token.clone(),
    };
    assert!(admin.verify_csrf(&token).is_ok());
    assert!(matches!(admin.verify_csrf("wrong"), Err(ContentError::Csrf)));
    assert!(matches!(admin.verify_csrf(""), Err(ContentError::Csrf)));
    assert_eq!(admin.verify_csrf("x").unwrap_err().user_message(), "session expired");

    auth::destroy_session(&pool, &session_id).unwrap();
    assert!(auth::session_csrf_token(&pool, &session_id).is_none());
}

#[test]
fn expired_sessions_do_not_validate() {
    let pool = test_pool();
    let conn = pool.get().unwrap();
    let past = chrono::Utc::now().naive_utc() - chrono::Duration::hours(1);
    conn.execute(
        "INSERT INTO sessions (id, csrf_token, created_at, expires_at) VALUES ('stale', 'tok', ?1, ?1)",
        rusqlite::params![past],
    )
    .unwrap();
    assert!(auth::session_csrf_token(&pool, "stale").is_none());

    auth::cleanup_expired_sessions(&pool).unwrap();
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM sessions WHERE id = 'stale'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn password_verify_roundtrip() {
    let hash = bcrypt::hash("hunter2", 4).unwrap();
    assert!(auth::verify_password("hunter2", &hash));
    assert!(!auth::verify_password("hunter3", &hash));
    assert!(!auth::verify_password("hunter2", "not-a-hash"));
}

#[test]
fn rate_limiter_blocks_after_max_attempts() {
    let limiter = RateLimiter::new();
    let window = std::time::Duration::from_secs(60);
    for _ in 0..3 {
        assert!(limiter.check_and_record("login:abc", 3, window));
    }
    assert!(!limiter.check_and_record("login:abc", 3, window));
    // other keys are unaffected
    assert!(limiter.check_and_record("login:def", 3, window));
}

#[test]
fn rate_limiter_cleanup_drops_stale_keys() {
    let limiter = RateLimiter::new();
    let window = std::time::Duration::from_secs(60);
    assert!(limiter.check_and_record("login:abc", 1, window));
    assert!(!limiter.check_and_record("login:abc", 1, window));

    // with a zero max age every recorded attempt is stale
    limiter.cleanup(std::time::Duration::from_secs(0));
    assert!(limiter.check_and_record("login:abc", 1, window));
}

// ═══════════════════════════════════════════════════════════
// Room-service menu & orders, guest messages
// ═══════════════════════════════════════════════════════════

fn menu_form(name: &str, category: &str, price: f64) -> MenuItemForm {
    MenuItemForm {
        name: name.to_string(),
        description: None,
        price,
        category: category.to_string(),
        image_file: None,
        is_active: true,
    }
}

#[test]
fn menu_item_validation() {
    let pool = test_pool();
    assert!(matches!(
        MenuItem::create(&pool, &menu_form("", "mains", 12.0)),
        Err(ContentError::Validation(_))
    ));
    assert!(matches!(
        MenuItem::create(&pool, &menu_form("Soup", "brunch", 8.0)),
        Err(ContentError::Validation(_))
    ));
    assert!(matches!(
        MenuItem::create(&pool, &menu_form("Soup", "starters", -1.0)),
        Err(ContentError::Validation(_))
    ));
    MenuItem::create(&pool, &menu_form("Soup", "starters", 8.0)).unwrap();
}

#[test]
fn menu_reorder_is_scoped_to_category() {
    let pool = test_pool();
    let a = MenuItem::create(&pool, &menu_form("Soup", "starters", 8.0)).unwrap();
    let b = MenuItem::create(&pool, &menu_form("Salad", "starters", 9.0)).unwrap();
    let other = MenuItem::create(&pool, &menu_form("Steak", "mains", 24.0)).unwrap();

    MenuItem::reorder(&pool, "starters", &[b, a, other]).unwrap();

    let starters: Vec<i64> = MenuItem::list(&pool, Some("starters")).iter().map(|i| i.id).collect();
    assert_eq!(starters, vec![b, a]);
    assert_eq!(MenuItem::find_by_id(&pool, other).unwrap().position, 0);
}

#[test]
fn order_create_validates_input() {
    let pool = test_pool();
    let mut form = RoomOrderForm {
        room_number: "  ".to_string(),
        guest_name: None,
        items_json: "[]".to_string(),
        total: 0.0,
        note: None,
    };
    assert!(matches!(
        RoomOrder::create(&pool, &form),
        Err(ContentError::Validation(_))
    ));

    form.room_number = "204".to_string();
    form.items_json = "{broken".to_string();
    assert!(matches!(
        RoomOrder::create(&pool, &form),
        Err(ContentError::Validation(_))
    ));

    form.items_json = r#"[{"name":"Soup","qty":1,"price":8.0}]"#.to_string();
    form.total = 8.0;
    let id = RoomOrder::create(&pool, &form).unwrap();
    assert_eq!(RoomOrder::find_by_id(&pool, id).unwrap().status, "pending");
}

#[test]
fn order_status_workflow() {
    let pool = test_pool();
    let form = RoomOrderForm {
        room_number: "310".to_string(),
        guest_name: Some("Dupont".to_string()),
        items_json: "[]".to_string(),
        total: 0.0,
        note: None,
    };
    let id = RoomOrder::create(&pool, &form).unwrap();

    RoomOrder::update_status(&pool, id, "preparing").unwrap();
    RoomOrder::update_status(&pool, id, "delivered").unwrap();
    assert_eq!(RoomOrder::find_by_id(&pool, id).unwrap().status, "delivered");

    assert!(matches!(
        RoomOrder::update_status(&pool, id, "eaten"),
        Err(ContentError::Validation(_))
    ));
    assert!(matches!(
        RoomOrder::update_status(&pool, 9999, "pending"),
        Err(ContentError::NotFound("order"))
    ));
    assert_eq!(RoomOrder::count(&pool, Some("pending")), 0);
}

#[test]
fn message_read_toggle_and_counts() {
    let pool = test_pool();
    let form = GuestMessageForm {
        name: "Rossi".to_string(),
        email: Some("rossi@example.com".to_string()),
        phone: None,
        subject: Some("Late arrival".to_string()),
        body: "We land at 23:40, is check-in possible?".to_string(),
    };
    let id = GuestMessage::create(&pool, &form).unwrap();
    assert_eq!(GuestMessage::unread_count(&pool), 1);

    GuestMessage::set_read(&pool, id, true).unwrap();
    assert_eq!(GuestMessage::unread_count(&pool), 0);
    GuestMessage::set_read(&pool, id, false).unwrap();
    assert_eq!(GuestMessage::unread_count(&pool), 1);

    GuestMessage::delete(&pool, id).unwrap();
    assert!(matches!(
        GuestMessage::delete(&pool, id),
        Err(ContentError::NotFound("message"))
    ));
}

#[test]
fn message_requires_name_and_body() {
    let pool = test_pool();
    let form = GuestMessageForm {
        name: String::new(),
        email: None,
        phone: None,
        subject: None,
        body: "hello".to_string(),
    };
    assert!(matches!(
        GuestMessage::create(&pool, &form),
        Err(ContentError::Validation(_))
    ));
}
