use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{Difficulty, Question, QuestionType};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionPayload {
    pub chapter_id: Uuid,
    pub question_type: QuestionType,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub marks: Decimal,
    #[validate(length(min = 1))]
    pub question_text_en: String,
    #[validate(length(min = 1))]
    pub question_text_hi: Option<String>,
    #[serde(default)]
    pub answer_data: JsonValue,
    pub explanation: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateQuestionsPayload {
    #[validate(length(min = 1, max = 500), nested)]
    pub questions: Vec<CreateQuestionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionPayload {
    pub chapter_id: Option<Uuid>,
    pub question_type: Option<QuestionType>,
    pub difficulty: Option<Difficulty>,
    pub marks: Option<Decimal>,
    #[validate(length(min = 1))]
    pub question_text_en: Option<String>,
    #[validate(length(min = 1))]
    pub question_text_hi: Option<String>,
    pub answer_data: Option<JsonValue>,
    pub explanation: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub question_type: String,
    pub difficulty: String,
    pub marks: Decimal,
    pub question_text_en: String,
    pub question_text_hi: Option<String>,
    pub answer_data: JsonValue,
    pub explanation: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateResponse {
    pub created: usize,
    pub items: Vec<QuestionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub chapter_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub question_type: Option<QuestionType>,
    pub difficulty: Option<Difficulty>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl From<Question> for QuestionResponse {
    fn from(value: Question) -> Self {
        Self {
            id: value.id,
            chapter_id: value.chapter_id,
            question_type: value.question_type,
            difficulty: value.difficulty,
            marks: value.marks,
            question_text_en: value.question_text_en,
            question_text_hi: value.question_text_hi,
            answer_data: value.answer_data,
            explanation: value.explanation,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_defaults_difficulty_and_accepts_numeric_marks() {
        let payload: CreateQuestionPayload = serde_json::from_value(serde_json::json!({
            "chapterId": Uuid::nil(),
            "questionType": "true_false",
            "marks": 1.5,
            "questionTextEn": "The sun is a star.",
            "answerData": {"correct": true}
        }))
        .unwrap();
        assert_eq!(payload.difficulty, Difficulty::Medium);
        assert_eq!(payload.marks, Decimal::new(15, 1));
        assert_eq!(payload.question_type, QuestionType::TrueFalse);
    }

    #[test]
    fn unknown_question_type_is_rejected() {
        let result: Result<CreateQuestionPayload, _> = serde_json::from_value(serde_json::json!({
            "chapterId": Uuid::nil(),
            "questionType": "essay",
            "marks": 1,
            "questionTextEn": "?"
        }));
        assert!(result.is_err());
    }
}
