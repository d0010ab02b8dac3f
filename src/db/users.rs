// src/db/users.rs
use crate::domain::user::{normalize_email, Role, User};
use crate::errors::ServerError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::BTreeMap;

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let extra_json: String = row.get(3)?;
    let extra: BTreeMap<String, String> = serde_json::from_str(&extra_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        role: row.get(2)?,
        extra,
    })
}

/// Registers a user. The email is normalized first; a taken email is a conflict.
pub fn create_user(
    conn: &Connection,
    email: &str,
    role: Role,
    extra: &BTreeMap<String, String>,
) -> Result<i64, ServerError> {
    let email = normalize_email(email).map_err(ServerError::BadRequest)?;
    let extra_json = serde_json::to_string(extra).map_err(|_| ServerError::InternalError)?;

    match conn.execute(
        "INSERT INTO users (email, role, extra) VALUES (?1, ?2, ?3)",
        params![email, role, extra_json],
    ) {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
            Err(ServerError::Conflict(format!("{email} is already registered")))
        }
        Err(e) => Err(ServerError::DbError(e.to_string())),
    }
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, ServerError> {
    let email = email.trim().to_lowercase();
    conn.query_row(
        "SELECT id, email, role, extra FROM users WHERE email = ?1",
        [&email],
        user_from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(e.to_string()))
}

/// All users ordered by email.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, ServerError> {
    let mut stmt = conn
        .prepare("SELECT id, email, role, extra FROM users ORDER BY email")
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], user_from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(e.to_string()))
}

/// Returns whether a user with that email existed.
pub fn set_user_role(conn: &Connection, email: &str, role: Role) -> Result<bool, ServerError> {
    let email = email.trim().to_lowercase();
    let changed = conn
        .execute("UPDATE users SET role = ?1 WHERE email = ?2", params![role, email])
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    Ok(changed > 0)
}
