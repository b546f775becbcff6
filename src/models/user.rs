use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Role, Title};

/// Registered account: patients, medical staff, and admins share one table.
/// `role` is an immutable business classification: it gates authorization
/// and pricing and never changes after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub title: Title,
    pub address: String,
    pub birthdate: NaiveDate,
    /// NHS patients are exempt from repeat-prescription payment.
    pub is_nhs: bool,
    /// Staff accounts start inactive until an admin approves them.
    pub is_active: bool,
    pub date_joined: NaiveDateTime,
}

impl User {
    /// "doctor, Dr Jane Doe": role, title, and full name in one line.
    pub fn full_name_and_title(&self) -> String {
        format!(
            "{}, {} {} {}",
            self.role.as_str(),
            self.title.as_str(),
            self.first_name,
            self.last_name
        )
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
