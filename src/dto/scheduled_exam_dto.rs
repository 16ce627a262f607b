use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::scheduled_exam::{ExamStatus, ScheduledExam};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduledExamPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub structure_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    #[validate(range(min = 1, max = 12))]
    pub class_level: Option<i32>,
    pub school_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    pub total_marks: Option<Decimal>,
    pub instructions: Option<String>,
    /// Only `draft` (the default) or `scheduled`.
    pub status: Option<ExamStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduledExamPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub school_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    pub total_marks: Option<Decimal>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    pub status: ExamStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduledExamListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<ExamStatus>,
    pub subject_id: Option<Uuid>,
    pub school_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledExamResponse {
    pub id: Uuid,
    pub title: String,
    pub structure_id: Option<Uuid>,
    pub subject_id: Uuid,
    pub class_level: i32,
    pub school_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub total_marks: Decimal,
    pub instructions: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScheduledExam> for ScheduledExamResponse {
    fn from(value: ScheduledExam) -> Self {
        Self {
            id: value.id,
            title: value.title,
            structure_id: value.structure_id,
            subject_id: value.subject_id,
            class_level: value.class_level,
            school_id: value.school_id,
            scheduled_at: value.scheduled_at,
            duration_minutes: value.duration_minutes,
            total_marks: value.total_marks,
            instructions: value.instructions,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
