use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const SCHOOL_COLUMNS: &str =
    "id, code, name, city, state, board, is_active, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct School {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub board: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
