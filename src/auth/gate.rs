//! Session gate: bearer token → user.
//!
//! Expired sessions are deleted when they are read. There is no background
//! sweep, so an expired session that is never presented again stays stored.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::{self, Database, DatabaseError};
use crate::models::User;

/// Extract the session token from the `Authorization` header.
///
/// A `Bearer ` prefix is stripped when present; an empty value counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolve `token` to its user as of `now`.
///
/// `Ok(None)` means unauthenticated: unknown token, expired session (which
/// is deleted as a side effect), or a session whose user no longer exists.
pub fn resolve_user_at(
    conn: &Connection,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<User>, DatabaseError> {
    let Some(session) = db::find_session(conn, token)? else {
        return Ok(None);
    };

    if !session.is_valid_at(now) {
        db::delete_session(conn, token)?;
        tracing::debug!(user_id = %session.user_id, "Expired session removed");
        return Ok(None);
    }

    db::get_user(conn, &session.user_id)
}

/// Resolve an optional token against the store using the current time.
pub fn authenticate(db: &Database, token: Option<&str>) -> Result<Option<User>, DatabaseError> {
    let Some(token) = token else {
        return Ok(None);
    };
    db.with_conn(|conn| resolve_user_at(conn, token, Utc::now()))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::Duration;

    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Session;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn seed(conn: &Connection, now: DateTime<Utc>) -> Session {
        let user = User::new("doc@example.com", "Dr. Who", None);
        db::insert_user_if_absent(conn, &user).unwrap();
        let session = Session::issue(&user.id, "tok-1", now);
        db::insert_session(conn, &session).unwrap();
        session
    }

    #[test]
    fn bearer_prefix_stripped() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
    }

    #[test]
    fn raw_token_accepted() {
        assert_eq!(bearer_token(&headers_with("abc")), Some("abc"));
    }

    #[test]
    fn missing_or_empty_header_is_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
    }

    #[test]
    fn valid_session_resolves_user() {
        let conn = open_memory_database().unwrap();
        let now = Utc::now();
        seed(&conn, now);

        let user = resolve_user_at(&conn, "tok-1", now).unwrap().unwrap();
        assert_eq!(user.email, "doc@example.com");
    }

    #[test]
    fn last_instant_before_expiry_is_accepted() {
        let conn = open_memory_database().unwrap();
        let now = Utc::now();
        let session = seed(&conn, now);

        let just_before = session.expires_at - Duration::milliseconds(1);
        assert!(resolve_user_at(&conn, "tok-1", just_before).unwrap().is_some());
        assert!(db::find_session(&conn, "tok-1").unwrap().is_some());
    }

    #[test]
    fn one_tick_past_expiry_rejects_and_deletes() {
        let conn = open_memory_database().unwrap();
        let now = Utc::now();
        let session = seed(&conn, now);

        let just_after = session.expires_at + Duration::milliseconds(1);
        assert!(resolve_user_at(&conn, "tok-1", just_after).unwrap().is_none());

        // Verify directly against the store
        assert!(db::find_session(&conn, "tok-1").unwrap().is_none());
    }

    #[test]
    fn unknown_token_is_unauthenticated() {
        let conn = open_memory_database().unwrap();
        seed(&conn, Utc::now());
        assert!(resolve_user_at(&conn, "other", Utc::now()).unwrap().is_none());
    }

    #[test]
    fn session_without_user_is_unauthenticated() {
        let conn = open_memory_database().unwrap();
        let now = Utc::now();
        db::insert_session(&conn, &Session::issue("ghost@example.com", "tok-g", now)).unwrap();
        assert!(resolve_user_at(&conn, "tok-g", now).unwrap().is_none());
    }

    #[test]
    fn absent_token_is_unauthenticated() {
        let db = Database::open_in_memory().unwrap();
        assert!(authenticate(&db, None).unwrap().is_none());
    }
}
