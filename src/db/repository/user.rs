use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::uuid_column;
use crate::db::DatabaseError;
use crate::models::enums::{Role, Title};
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, role, title, \
     address, birthdate, is_nhs, is_active, date_joined";

/// Raw row with enum columns still as text; parsed by `finish_user`.
struct UserRow {
    user: User,
    role: String,
    title: String,
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        user: User {
            id: uuid_column(row, 0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            role: Role::Patient,
            title: Title::Mx,
            address: row.get(7)?,
            birthdate: row.get(8)?,
            is_nhs: row.get(9)?,
            is_active: row.get(10)?,
            date_joined: row.get(11)?,
        },
        role: row.get(5)?,
        title: row.get(6)?,
    })
}

fn finish_user(parts: UserRow) -> Result<User, DatabaseError> {
    let UserRow { mut user, role, title } = parts;
    user.role = Role::from_str(&role)?;
    user.title = Title::from_str(&title)?;
    Ok(user)
}

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, username, email, first_name, last_name, role, title,
         address, birthdate, is_nhs, is_active, date_joined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            user.id.to_string(),
            user.username,
            user.email,
            user.first_name,
            user.last_name,
            user.role.as_str(),
            user.title.as_str(),
            user.address,
            user.birthdate,
            user.is_nhs as i32,
            user.is_active as i32,
            user.date_joined,
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<User, DatabaseError> {
    let parts = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id.to_string()],
            user_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
                entity_type: "User".into(),
                id: id.to_string(),
            },
            other => DatabaseError::from(other),
        })?;
    finish_user(parts)
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<User, DatabaseError> {
    let parts = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            user_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
                entity_type: "User".into(),
                id: username.into(),
            },
            other => DatabaseError::from(other),
        })?;
    finish_user(parts)
}

/// All users ordered by username, for the admin user list.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))?;
    let rows = stmt.query_map([], user_from_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(finish_user(row?)?);
    }
    Ok(users)
}

/// Username-contains search, optionally restricted to one role and to NHS
/// patients. Staff patient search passes `Some(Role::Patient)`.
pub fn search_users(
    conn: &Connection,
    username_fragment: &str,
    role: Option<Role>,
    nhs_only: bool,
) -> Result<Vec<User>, DatabaseError> {
    let pattern = format!("%{username_fragment}%");
    let role_pattern = match role {
        Some(r) => r.as_str().to_string(),
        None => "%".to_string(),
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE username LIKE ?1 AND role LIKE ?2 AND (is_nhs = 1 OR ?3 = 0)
         ORDER BY username"
    ))?;
    let rows = stmt.query_map(params![pattern, role_pattern, nhs_only as i32], user_from_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(finish_user(row?)?);
    }
    Ok(users)
}

/// Doctors and nurses, for the practitioner picker on the booking form.
pub fn list_practitioners(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE role IN ('doctor', 'nurse') ORDER BY username"
    ))?;
    let rows = stmt.query_map([], user_from_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(finish_user(row?)?);
    }
    Ok(users)
}

/// Update mutable profile fields. Role is immutable and deliberately absent.
pub fn update_user_profile(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET email = ?2, first_name = ?3, last_name = ?4, title = ?5,
         address = ?6, birthdate = ?7, is_nhs = ?8
         WHERE id = ?1",
        params![
            user.id.to_string(),
            user.email,
            user.first_name,
            user.last_name,
            user.title.as_str(),
            user.address,
            user.birthdate,
            user.is_nhs as i32,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: user.id.to_string(),
        });
    }
    Ok(())
}

/// Admin approval: activates a pending account.
pub fn approve_user(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET is_active = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_user(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
