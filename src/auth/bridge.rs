//! Auth bridge: provider `session_id` → local session.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::provider::{IdentityError, IdentityProvider};
use super::AuthError;
use crate::db::{self, Database, DatabaseError};
use crate::models::{Session, User, UserProfile};

/// Response of `POST /api/auth/session`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionGrant {
    pub session_token: String,
    pub user: UserProfile,
}

/// Exchange a provider `session_id` for a local session.
///
/// Creates the user on first login (never overwrites an existing one) and
/// always inserts a fresh 7-day session. Earlier sessions are left valid.
pub async fn exchange_session(
    db: &Database,
    provider: &dyn IdentityProvider,
    session_id: &str,
) -> Result<SessionGrant, AuthError> {
    let profile = provider.exchange(session_id).await.map_err(|e| match e {
        IdentityError::Rejected { status } => {
            tracing::warn!(status, "Auth provider rejected session id");
            AuthError::InvalidSession
        }
        other => AuthError::Service(other.to_string()),
    })?;

    let user = User::new(&profile.email, &profile.name, profile.picture.clone());
    let session = Session::issue(&user.id, &profile.session_token, Utc::now());

    let created = db.with_conn(|conn| {
        let created = db::insert_user_if_absent(conn, &user)?;
        db::insert_session(conn, &session)?;
        Ok(created)
    })?;

    info!(user_id = %user.id, new_user = created, "Session established");

    Ok(SessionGrant {
        session_token: profile.session_token,
        user: UserProfile::from(&user),
    })
}

/// End the session behind `token`, if any. Unknown tokens are ignored.
pub fn revoke_session(db: &Database, token: Option<&str>) -> Result<(), DatabaseError> {
    let Some(token) = token else {
        return Ok(());
    };
    let removed = db.with_conn(|conn| db::delete_session(conn, token))?;
    if removed > 0 {
        info!("Session revoked");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::gate::authenticate;
    use crate::auth::provider::MockIdentityProvider;

    #[tokio::test]
    async fn first_login_creates_user_and_session() {
        let db = Database::open_in_memory().unwrap();
        let provider =
            MockIdentityProvider::new().with_session("sid", "doc@example.com", "Dr. Who", "tok");

        let grant = exchange_session(&db, &provider, "sid").await.unwrap();
        assert_eq!(grant.session_token, "tok");
        assert_eq!(grant.user.id, "doc@example.com");

        let user = authenticate(&db, Some("tok")).unwrap().unwrap();
        assert_eq!(user.name, "Dr. Who");
    }

    #[tokio::test]
    async fn repeat_login_keeps_user_and_old_sessions() {
        let db = Database::open_in_memory().unwrap();
        let provider = MockIdentityProvider::new()
            .with_session("sid-1", "doc@example.com", "Dr. Who", "tok-1")
            .with_session("sid-2", "doc@example.com", "Renamed", "tok-2");

        exchange_session(&db, &provider, "sid-1").await.unwrap();
        exchange_session(&db, &provider, "sid-2").await.unwrap();

        // Both tokens stay valid
        assert!(authenticate(&db, Some("tok-1")).unwrap().is_some());
        let user = authenticate(&db, Some("tok-2")).unwrap().unwrap();
        // Stored user is not overwritten
        assert_eq!(user.name, "Dr. Who");

        let count = db
            .with_conn(|conn| db::count_sessions_for_user(conn, "doc@example.com"))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn unknown_session_id_is_invalid_session() {
        let db = Database::open_in_memory().unwrap();
        let provider = MockIdentityProvider::new();
        let err = exchange_session(&db, &provider, "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidSession));
    }

    #[tokio::test]
    async fn transport_failure_is_service_error() {
        let db = Database::open_in_memory().unwrap();
        let provider = MockIdentityProvider::unreachable();
        let err = exchange_session(&db, &provider, "sid").await.unwrap_err();
        assert!(matches!(err, AuthError::Service(_)));
        assert!(err.to_string().starts_with("Auth service error:"));
    }

    #[tokio::test]
    async fn revoke_ends_only_that_session() {
        let db = Database::open_in_memory().unwrap();
        let provider = MockIdentityProvider::new()
            .with_session("sid-1", "doc@example.com", "Dr. Who", "tok-1")
            .with_session("sid-2", "doc@example.com", "Dr. Who", "tok-2");
        exchange_session(&db, &provider, "sid-1").await.unwrap();
        exchange_session(&db, &provider, "sid-2").await.unwrap();

        revoke_session(&db, Some("tok-1")).unwrap();
        assert!(authenticate(&db, Some("tok-1")).unwrap().is_none());
        assert!(authenticate(&db, Some("tok-2")).unwrap().is_some());

        // Absent and unknown tokens are no-ops
        revoke_session(&db, None).unwrap();
        revoke_session(&db, Some("never-issued")).unwrap();
    }
}
