use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime of a local session created by the auth exchange.
pub const SESSION_TTL_DAYS: i64 = 7;

/// A login session. The token is the one issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// New session for `user_id` starting at `now`, valid for [`SESSION_TTL_DAYS`].
    pub fn issue(user_id: &str, session_token: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            session_token: session_token.to_string(),
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            created_at: now,
        }
    }

    /// A session is valid strictly before its expiry instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_sets_seven_day_expiry() {
        let now = Utc::now();
        let session = Session::issue("doc@example.com", "tok", now);
        assert_eq!(session.expires_at - session.created_at, Duration::days(7));
    }

    #[test]
    fn valid_until_expiry_instant() {
        let now = Utc::now();
        let session = Session::issue("doc@example.com", "tok", now);
        assert!(session.is_valid_at(now));
        assert!(session.is_valid_at(session.expires_at - Duration::milliseconds(1)));
        assert!(!session.is_valid_at(session.expires_at));
        assert!(!session.is_valid_at(session.expires_at + Duration::milliseconds(1)));
    }
}
