use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const SUBJECT_COLUMNS: &str = "id, code, name_en, name_hi, description, icon, parent_id, \
    is_category, display_order, is_active, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: Uuid,
    pub code: String,
    pub name_en: String,
    pub name_hi: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_category: bool,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
