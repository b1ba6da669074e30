use std::collections::HashMap;

use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::State;
use rocket_dyn_templates::Template;
use serde::Deserialize;

use crate::auth;
use crate::db::DbPool;
use crate::models::settings::Setting;
use crate::rate_limit::RateLimiter;
use crate::AdminSlug;

#[derive(Debug, FromForm, Deserialize)]
pub struct LoginForm {
    pub password: String,
}

#[get("/login")]
pub fn login_page(pool: &State<DbPool>, admin_slug: &State<AdminSlug>) -> Template {
    let mut context: HashMap<String, String> = HashMap::new();
    context.insert("site_name".to_string(), Setting::get_or(pool, "site_name", "Hotel"));
    context.insert("admin_slug".to_string(), admin_slug.0.clone());
    Template::render("admin/login", &context)
}

#[post("/login", data = "<form>")]
pub fn login_submit(
    form: Form<LoginForm>,
    pool: &State<DbPool>,
    admin_slug: &State<AdminSlug>,
    limiter: &State<RateLimiter>,
    client_ip: Option<std::net::IpAddr>,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, Template> {
    let render_error = |msg: &str| {
        let mut ctx = HashMap::new();
        ctx.insert("error".to_string(), msg.to_string());
        ctx.insert("site_name".to_string(), Setting::get_or(pool, "site_name", "Hotel"));
        ctx.insert("admin_slug".to_string(), admin_slug.0.clone());
        Template::render("admin/login", &ctx)
    };

    let ip = client_ip.map(|a| a.to_string()).unwrap_or_default();
    let ip_hash = auth::hash_ip(&ip);
    let rate_key = format!("login:{}", ip_hash);
    let max_attempts = Setting::get_i64(pool, "login_rate_limit").max(1) as u64;
    let window = std::time::Duration::from_secs(15 * 60);

    if !limiter.check_and_record(&rate_key, max_attempts, window) {
        return Err(render_error(
            "Too many login attempts. Please try again in 15 minutes.",
        ));
    }

    let stored_hash = Setting::get(pool, "admin_password_hash").unwrap_or_default();
    if !auth::verify_password(&form.password, &stored_hash) {
        return Err(render_error("Invalid password"));
    }

    match auth::create_session(pool, Some(&ip_hash), None) {
        Ok(session_id) => {
            auth::set_session_cookie(cookies, &session_id);
            let _ = auth::cleanup_expired_sessions(pool);
            limiter.cleanup(std::time::Duration::from_secs(60 * 60));
            Ok(Redirect::to(format!("/{}", admin_slug.0)))
        }
        Err(e) => {
            log::error!("session creation failed: {e}");
            Err(render_error("Could not start a session. Please try again."))
        }
    }
}

#[get("/logout")]
pub fn logout(
    pool: &State<DbPool>,
    admin_slug: &State<AdminSlug>,
    cookies: &CookieJar<'_>,
) -> Redirect {
    if let Some(session_id) = auth::session_cookie_value(cookies) {
        let _ = auth::destroy_session(pool, &session_id);
    }
    auth::clear_session_cookie(cookies);
    Redirect::to(format!("/{}/login", admin_slug.0))
}

/// Catch-all for any admin route that failed the AdminUser guard.
#[get("/<_path..>", rank = 99)]
pub fn admin_redirect_to_login(
    _path: std::path::PathBuf,
    admin_slug: &State<AdminSlug>,
) -> Redirect {
    Redirect::to(format!("/{}/login", admin_slug.0))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![login_page, login_submit, logout, admin_redirect_to_login]
}
