use chrono::{Duration, Utc};
use rand::RngCore;
use rocket::http::{Cookie, CookieJar, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use rusqlite::params;
use sha2::{Digest, Sha256};

use crate::db::DbPool;
use crate::error::{ContentError, ContentResult};
use crate::models::settings::Setting;

const SESSION_COOKIE: &str = "concierge_session";

/// Guard that ensures the request carries a valid admin session. Carries the
/// session's CSRF token so pages can embed it and mutating handlers can check
/// the submitted copy against it.
pub struct AdminUser {
    pub session_id: String,
    pub csrf_token: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let pool = match request.guard::<&State<DbPool>>().await {
            Outcome::Success(p) => p,
            _ => return Outcome::Forward(Status::Unauthorized),
        };

        let cookies = request.cookies();
        let session_id = match cookies.get_private(SESSION_COOKIE) {
            Some(c) => c.value().to_string(),
            None => return Outcome::Forward(Status::Unauthorized),
        };

        match session_csrf_token(pool, &session_id) {
            Some(csrf_token) => Outcome::Success(AdminUser {
                session_id,
                csrf_token,
            }),
            None => {
                cookies.remove_private(Cookie::from(SESSION_COOKIE));
                Outcome::Forward(Status::Unauthorized)
            }
        }
    }
}

impl AdminUser {
    /// Compare a submitted CSRF token against the session's. A mismatch is
    /// indistinguishable from an expired session on purpose.
    pub fn verify_csrf(&self, submitted: &str) -> ContentResult<()> {
        if !submitted.is_empty() && submitted == self.csrf_token {
            Ok(())
        } else {
            Err(ContentError::Csrf)
        }
    }
}

pub fn hash_password(password: &str) -> ContentResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ContentError::Persistence(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn create_session(pool: &DbPool, ip: Option<&str>, ua: Option<&str>) -> ContentResult<String> {
    let conn = pool.get()?;

    let expiry_hours = Setting::get_i64(pool, "session_expiry_hours").max(1);
    let session_id = uuid::Uuid::new_v4().to_string();
    let csrf_token = new_csrf_token();
    let now = Utc::now().naive_utc();
    let expires = now + Duration::hours(expiry_hours);

    conn.execute(
        "INSERT INTO sessions (id, csrf_token, created_at, expires_at, ip_address, user_agent)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![session_id, csrf_token, now, expires, ip, ua],
    )?;

    Ok(session_id)
}

/// The CSRF token of a live session, or None when the session is unknown or
/// past its expiry.
pub fn session_csrf_token(pool: &DbPool, session_id: &str) -> Option<String> {
    let conn = pool.get().ok()?;
    let now = Utc::now().naive_utc();
    conn.query_row(
        "SELECT csrf_token FROM sessions WHERE id = ?1 AND expires_at > ?2",
        params![session_id, now],
        |row| row.get(0),
    )
    .ok()
}

pub fn destroy_session(pool: &DbPool, session_id: &str) -> ContentResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

pub fn cleanup_expired_sessions(pool: &DbPool) -> ContentResult<()> {
    let conn = pool.get()?;
    let now = Utc::now().naive_utc();
    conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])?;
    Ok(())
}

pub fn set_session_cookie(cookies: &CookieJar<'_>, session_id: &str) {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(rocket::http::SameSite::Strict);
    cookie.set_path("/");
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}

pub fn session_cookie_value(cookies: &CookieJar<'_>) -> Option<String> {
    cookies
        .get_private(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

fn new_csrf_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_ip(ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hex::encode(hasher.finalize())
}
