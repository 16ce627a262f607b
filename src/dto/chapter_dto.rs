use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::models::chapter::Chapter;
use crate::models::question::QuestionType;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChapterPayload {
    pub subject_id: Uuid,
    #[validate(range(min = 1))]
    pub chapter_number: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub name_en: String,
    #[validate(length(min = 1, max = 200))]
    pub name_hi: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChapterPayload {
    #[validate(range(min = 1))]
    pub chapter_number: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub name_en: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name_hi: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderChaptersPayload {
    #[validate(length(min = 1))]
    pub chapter_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ChapterListQuery {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterResponse {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub chapter_number: i32,
    pub name_en: String,
    pub name_hi: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub question_counts: BTreeMap<QuestionType, i64>,
    pub total_questions: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChapterResponse {
    pub fn new(chapter: Chapter, question_counts: BTreeMap<QuestionType, i64>) -> Self {
        let total_questions = question_counts.values().sum();
        Self {
            id: chapter.id,
            subject_id: chapter.subject_id,
            chapter_number: chapter.chapter_number,
            name_en: chapter.name_en,
            name_hi: chapter.name_hi,
            description: chapter.description,
            is_active: chapter.is_active,
            question_counts,
            total_questions,
            created_at: chapter.created_at,
            updated_at: chapter.updated_at,
        }
    }
}

/// A chapter with its loaded per-type counts, as produced by the service.
pub struct ChapterWithCounts {
    pub chapter: Chapter,
    pub counts: BTreeMap<QuestionType, i64>,
}

impl From<ChapterWithCounts> for ChapterResponse {
    fn from(value: ChapterWithCounts) -> Self {
        ChapterResponse::new(value.chapter, value.counts)
    }
}
