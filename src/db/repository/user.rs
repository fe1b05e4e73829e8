use rusqlite::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::User;

pub fn get_user(conn: &Connection, id: &str) -> Result<Option<User>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, email, name, picture, created_at FROM users WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        },
    );

    match result {
        Ok((id, email, name, picture, created_at)) => Ok(Some(User {
            id,
            email,
            name,
            picture,
            created_at: parse_timestamp("users.created_at", &created_at)?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Insert a user unless one with the same id already exists.
/// Existing users are never overwritten. Returns `true` if a row was created.
pub fn insert_user_if_absent(conn: &Connection, user: &User) -> Result<bool, DatabaseError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (id, email, name, picture, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id,
            user.email,
            user.name,
            user.picture,
            format_timestamp(&user.created_at),
        ],
    )?;
    Ok(inserted == 1)
}
