use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::catalog;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool() -> Result<DbPool, Box<dyn std::error::Error>> {
    init_pool_at("website/db/concierge.db")
}

pub fn init_pool_at(path: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Page sections. Capability flags are copied from the template
        -- catalog at creation time and never changed afterwards.
        CREATE TABLE IF NOT EXISTS sections (
            id INTEGER PRIMARY KEY,
            code TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            page TEXT NOT NULL,
            template_type TEXT NOT NULL,
            image_mode TEXT NOT NULL DEFAULT 'optional',
            has_title INTEGER NOT NULL DEFAULT 0,
            has_description INTEGER NOT NULL DEFAULT 0,
            has_link INTEGER NOT NULL DEFAULT 0,
            has_features INTEGER NOT NULL DEFAULT 0,
            has_services INTEGER NOT NULL DEFAULT 0,
            has_gallery INTEGER NOT NULL DEFAULT 0,
            has_overlay INTEGER NOT NULL DEFAULT 0,
            max_blocks INTEGER,
            background_color TEXT,
            image_position TEXT,
            position INTEGER NOT NULL DEFAULT 0,
            is_dynamic INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Ordered content blocks owned by a section
        CREATE TABLE IF NOT EXISTS content_blocks (
            id INTEGER PRIMARY KEY,
            section_id INTEGER NOT NULL,
            title TEXT,
            description TEXT,
            image_file TEXT,
            image_alt TEXT NOT NULL DEFAULT '',
            link_url TEXT,
            link_text TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            position INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (section_id) REFERENCES sections(id)
        );

        -- Features (icon + label)
        CREATE TABLE IF NOT EXISTS section_features (
            id INTEGER PRIMARY KEY,
            section_id INTEGER NOT NULL,
            icon_code TEXT NOT NULL,
            label TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            position INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (section_id) REFERENCES sections(id)
        );

        CREATE TABLE IF NOT EXISTS section_feature_translations (
            id INTEGER PRIMARY KEY,
            feature_id INTEGER NOT NULL,
            lang TEXT NOT NULL,
            label TEXT NOT NULL DEFAULT '',
            UNIQUE(feature_id, lang),
            FOREIGN KEY (feature_id) REFERENCES section_features(id)
        );

        -- Services (icon + label + description)
        CREATE TABLE IF NOT EXISTS section_services (
            id INTEGER PRIMARY KEY,
            section_id INTEGER NOT NULL,
            icon_code TEXT NOT NULL,
            label TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            position INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (section_id) REFERENCES sections(id)
        );

        CREATE TABLE IF NOT EXISTS section_service_translations (
            id INTEGER PRIMARY KEY,
            service_id INTEGER NOT NULL,
            lang TEXT NOT NULL,
            label TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            UNIQUE(service_id, lang),
            FOREIGN KEY (service_id) REFERENCES section_services(id)
        );

        -- Gallery items (image + title + description)
        CREATE TABLE IF NOT EXISTS section_gallery_items (
            id INTEGER PRIMARY KEY,
            section_id INTEGER NOT NULL,
            image_file TEXT NOT NULL,
            thumb_file TEXT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            image_alt TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            position INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (section_id) REFERENCES sections(id)
        );

        CREATE TABLE IF NOT EXISTS section_gallery_translations (
            id INTEGER PRIMARY KEY,
            item_id INTEGER NOT NULL,
            lang TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            UNIQUE(item_id, lang),
            FOREIGN KEY (item_id) REFERENCES section_gallery_items(id)
        );

        -- Overlay header text (1:1 with sections that have has_overlay)
        CREATE TABLE IF NOT EXISTS section_overlays (
            id INTEGER PRIMARY KEY,
            section_id INTEGER UNIQUE NOT NULL,
            subtitle TEXT NOT NULL DEFAULT '',
            title TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (section_id) REFERENCES sections(id)
        );

        CREATE TABLE IF NOT EXISTS section_overlay_translations (
            id INTEGER PRIMARY KEY,
            section_id INTEGER NOT NULL,
            lang TEXT NOT NULL,
            subtitle TEXT NOT NULL DEFAULT '',
            title TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            UNIQUE(section_id, lang),
            FOREIGN KEY (section_id) REFERENCES sections(id)
        );

        -- Room-service menu
        CREATE TABLE IF NOT EXISTS menu_items (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL DEFAULT 0,
            category TEXT NOT NULL DEFAULT 'mains',
            image_file TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            position INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Room-service orders
        CREATE TABLE IF NOT EXISTS room_orders (
            id INTEGER PRIMARY KEY,
            room_number TEXT NOT NULL,
            guest_name TEXT NOT NULL DEFAULT '',
            items_json TEXT NOT NULL DEFAULT '[]',
            total REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending',
            note TEXT NOT NULL DEFAULT '',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Guest messages from the contact form
        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            subject TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Settings (key-value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );

        -- Admin sessions. The csrf_token is issued with the session and
        -- checked on every mutating POST.
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            csrf_token TEXT NOT NULL,
            created_at DATETIME NOT NULL,
            expires_at DATETIME NOT NULL,
            ip_address TEXT,
            user_agent TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_sections_page ON sections(page, position);
        CREATE INDEX IF NOT EXISTS idx_blocks_section ON content_blocks(section_id, position);
        CREATE INDEX IF NOT EXISTS idx_features_section ON section_features(section_id, position);
        CREATE INDEX IF NOT EXISTS idx_services_section ON section_services(section_id, position);
        CREATE INDEX IF NOT EXISTS idx_gallery_section ON section_gallery_items(section_id, position);
        CREATE INDEX IF NOT EXISTS idx_orders_status ON room_orders(status);
        CREATE INDEX IF NOT EXISTS idx_messages_read ON messages(is_read);
        ",
    )?;

    Ok(())
}

pub fn seed_defaults(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let defaults = vec![
        // General
        ("site_name", "Hotel"),
        ("site_url", "http://localhost:8000"),
        ("admin_slug", "admin"),
        ("admin_email", ""),
        ("timezone", "Europe/Paris"),
        // Languages: default-language text lives on the main rows,
        // translations are stored per language code
        ("default_language", "fr"),
        ("translation_languages", "en,es,it"),
        // Security
        ("session_expiry_hours", "24"),
        ("login_rate_limit", "5"),
        // Uploads
        ("uploads_storage_path", "website/uploads/"),
        ("uploads_max_mb", "5"),
        ("uploads_allowed_types", "jpg,jpeg,png,webp"),
        ("uploads_thumb_size", "300x300"),
        // Room service
        ("room_service_enabled", "true"),
        ("room_service_hours", "07:00-22:00"),
        ("orders_poll_seconds", "30"),
    ];

    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    // Seed admin password if not set
    let admin_exists: i64 = conn.query_row(
        "SELECT COUNT(*) FROM settings WHERE key = 'admin_password_hash'",
        [],
        |row| row.get(0),
    )?;

    if admin_exists == 0 {
        // Default password: "admin" — user MUST change on first login
        let hash =
            bcrypt::hash("admin", bcrypt::DEFAULT_COST).expect("Failed to hash default password");
        conn.execute(
            "INSERT INTO settings (key, value) VALUES ('admin_password_hash', ?1)",
            params![hash],
        )?;
    }

    // Seed the static section set if the table is empty. Flags come from the
    // template catalog, same derivation as admin-created sections.
    let section_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM sections", [], |row| row.get(0))?;

    if section_count == 0 {
        let statics: &[(&str, &str, &str, &str)] = &[
            // (code, name, page, template)
            ("home_hero", "Welcome hero", "home", "hero"),
            ("home_intro", "Introduction", "home", "text_image"),
            ("home_services", "Our services", "home", "services_grid"),
            ("home_gallery", "The hotel in pictures", "home", "gallery"),
            ("rooms_hero", "Rooms hero", "rooms", "hero"),
            ("rooms_intro", "Rooms and suites", "rooms", "text_image"),
            ("rooms_included", "Included with every stay", "rooms", "checklist"),
            ("dining_intro", "Bar and breakfast", "dining", "text_image"),
            ("dining_menu_cards", "Menu highlights", "dining", "cards"),
            ("contact_hero", "Contact hero", "contact", "hero"),
            ("contact_cta", "Book your stay", "contact", "banner"),
        ];

        let mut position_by_page: std::collections::HashMap<&str, i64> =
            std::collections::HashMap::new();

        for (code, name, page, template_code) in statics {
            let tpl = catalog::find_template(template_code)
                .expect("static section references unknown template");
            let position = position_by_page.entry(page).or_insert(0);
            conn.execute(
                "INSERT INTO sections (code, name, page, template_type, image_mode,
                 has_title, has_description, has_link, has_features, has_services,
                 has_gallery, has_overlay, max_blocks, position, is_dynamic)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0)",
                params![
                    code,
                    name,
                    page,
                    tpl.code,
                    tpl.image_mode.as_str(),
                    tpl.has_title as i64,
                    tpl.has_description as i64,
                    tpl.has_link as i64,
                    tpl.has_features as i64,
                    tpl.has_services as i64,
                    tpl.has_gallery as i64,
                    tpl.has_overlay as i64,
                    tpl.max_blocks,
                    *position,
                ],
            )?;
            *position += 1;
        }
    }

    Ok(())
}
