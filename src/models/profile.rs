use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

pub const PROFILE_COLUMNS: &str = "id, email, full_name, role, school_id, class_level, \
    password_hash, is_active, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub school_id: Option<Uuid>,
    pub class_level: Option<i32>,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// Teachers and students always belong to a school.
    pub fn requires_school(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}
