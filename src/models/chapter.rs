use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const CHAPTER_COLUMNS: &str = "id, subject_id, chapter_number, name_en, name_hi, description, \
    is_active, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Chapter {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub chapter_number: i32,
    pub name_en: String,
    pub name_hi: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the per-type active question count of a chapter.
#[derive(Debug, Clone, FromRow)]
pub struct ChapterTypeCount {
    pub chapter_id: Uuid,
    pub question_type: String,
    pub total: i64,
}
