use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

/// Insert a receptionist or doctor account. Returns the new row id.
pub fn insert_staff(
    conn: &Connection,
    name: &str,
    email: &str,
    role: Role,
    password_hash: &str,
) -> Result<i64, DatabaseError> {
    if !role.is_staff() {
        return Err(DatabaseError::InvalidEnum {
            field: "users.role".into(),
            value: role.as_str().into(),
        });
    }
    conn.execute(
        "INSERT INTO users (name, email, role, password) VALUES (?1, ?2, ?3, ?4)",
        params![name, email, role.as_str(), password_hash],
    )
    .map_err(DatabaseError::from_insert)?;
    Ok(conn.last_insert_rowid())
}

/// Role is part of the lookup predicate: a doctor's email never matches a
/// receptionist login.
pub fn find_staff_by_email_and_role(
    conn: &Connection,
    email: &str,
    role: Role,
) -> Result<Option<StaffUser>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, email, role, password FROM users WHERE email = ?1 AND role = ?2",
            params![email, role.as_str()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, name, email, role, password_hash)) => Ok(Some(StaffUser {
            id,
            name,
            email,
            role: Role::from_str(&role)?,
            password_hash,
        })),
        None => Ok(None),
    }
}

pub fn get_staff_profile(
    conn: &Connection,
    id: i64,
    role: Role,
) -> Result<Option<StaffProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            "SELECT id, name, email FROM users WHERE id = ?1 AND role = ?2",
            params![id, role.as_str()],
            |row| {
                Ok(StaffProfile {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(profile)
}
