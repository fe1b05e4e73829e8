use rusqlite::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::Session;

pub fn insert_session(conn: &Connection, session: &Session) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (user_id, session_token, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            session.user_id,
            session.session_token,
            format_timestamp(&session.expires_at),
            format_timestamp(&session.created_at),
        ],
    )?;
    Ok(())
}

/// Find the first session carrying `token`, whether expired or not.
pub fn find_session(conn: &Connection, token: &str) -> Result<Option<Session>, DatabaseError> {
    let result = conn.query_row(
        "SELECT user_id, session_token, expires_at, created_at
         FROM sessions WHERE session_token = ?1 ORDER BY id LIMIT 1",
        params![token],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        },
    );

    match result {
        Ok((user_id, session_token, expires_at, created_at)) => Ok(Some(Session {
            user_id,
            session_token,
            expires_at: parse_timestamp("sessions.expires_at", &expires_at)?,
            created_at: parse_timestamp("sessions.created_at", &created_at)?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Delete every session row carrying `token`. Returns the number removed.
pub fn delete_session(conn: &Connection, token: &str) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM sessions WHERE session_token = ?1",
        params![token],
    )?;
    Ok(deleted)
}

#[cfg(test)]
pub(crate) fn count_sessions_for_user(conn: &Connection, user_id: &str) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sessions WHERE user_id = ?1",
        params![user_id],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}
