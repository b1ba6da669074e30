#[macro_use]
extern crate rocket;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket_dyn_templates::Template;

mod auth;
mod catalog;
mod db;
mod error;
mod icons;
mod models;
mod rate_limit;
mod routes;
mod uploads;

#[cfg(test)]
mod tests;

use models::settings::Setting;
use rate_limit::RateLimiter;

/// Holds the admin URL slug, read from DB at startup.
/// Shared via Rocket managed state so routes and fairings can access it.
pub struct AdminSlug(pub String);

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info {
            name: "No-Cache Admin Pages",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        let slug = req
            .rocket()
            .state::<AdminSlug>()
            .map(|s| s.0.as_str())
            .unwrap_or("admin");
        let prefix = format!("/{}", slug);
        if req.uri().path().starts_with(&*prefix) {
            res.set_header(Header::new(
                "Cache-Control",
                "no-store, no-cache, must-revalidate, max-age=0",
            ));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let _ = std::fs::create_dir_all("website/db");

    let pool = db::init_pool().expect("Failed to initialize database pool");
    db::run_migrations(&pool).expect("Failed to run database migrations");
    db::seed_defaults(&pool).expect("Failed to seed defaults");

    let uploads_dir = Setting::get_or(&pool, "uploads_storage_path", "website/uploads/");
    let _ = std::fs::create_dir_all(&uploads_dir);

    let admin_slug = Setting::get_or(&pool, "admin_slug", "admin");
    let admin_mount = format!("/{}", admin_slug);
    let admin_api_mount = format!("/{}/api", admin_slug);

    log::info!("admin panel mounted at {}", admin_mount);

    rocket::build()
        .manage(pool)
        .manage(AdminSlug(admin_slug))
        .manage(RateLimiter::new())
        .attach(Template::fairing())
        .attach(NoCacheAdmin)
        .mount("/static", FileServer::from("website/static"))
        .mount("/uploads", FileServer::from(uploads_dir))
        .mount("/api", routes::api::routes())
        .mount(&admin_api_mount, routes::admin::api_routes())
        .mount(&admin_mount, routes::admin::routes())
        .mount(&admin_mount, routes::auth::routes())
        .register("/", catchers![not_found, server_error])
}
