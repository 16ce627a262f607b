use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::question_dto::QuestionResponse;
use crate::models::exam_structure::{ChapterAllocation, ExamStructure, Section};
use crate::models::question::QuestionType;
use crate::services::section_editor::SectionConfig;

/// Where a section's questions come from, as submitted by the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SourcingPayload {
    Auto,
    Chapters {
        allocations: Vec<ChapterAllocation>,
    },
    /// Let the server spread the count over these chapters.
    Distribute {
        #[serde(rename = "chapterIds")]
        chapter_ids: Vec<Uuid>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SectionPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub instructions: Option<String>,
    pub question_type: QuestionType,
    pub question_count: u32,
    pub marks_per_question: Decimal,
    pub sourcing: SourcingPayload,
}

impl SectionPayload {
    pub fn config(&self) -> SectionConfig {
        SectionConfig {
            title: self.title.clone(),
            instructions: self.instructions.clone(),
            question_type: self.question_type,
            question_count: self.question_count,
            marks_per_question: self.marks_per_question,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamStructurePayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub subject_id: Uuid,
    #[validate(range(min = 1, max = 12))]
    pub class_level: i32,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i32,
    #[validate(length(min = 1, max = 50), nested)]
    pub sections: Vec<SectionPayload>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamStructurePayload {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 12))]
    pub class_level: Option<i32>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    #[validate(length(min = 1, max = 50), nested)]
    pub sections: Option<Vec<SectionPayload>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ExamStructureListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub subject_id: Option<Uuid>,
    pub class_level: Option<i32>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    #[serde(flatten)]
    pub section: Section,
    pub section_marks: Decimal,
}

impl TryFrom<Section> for SectionResponse {
    type Error = crate::error::Error;

    fn try_from(section: Section) -> Result<Self, Self::Error> {
        let section_marks = section.section_marks().ok_or_else(|| {
            crate::error::Error::Internal(format!(
                "section {} has marks out of range",
                section.title
            ))
        })?;
        Ok(Self {
            section,
            section_marks,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamStructureResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub subject_id: Uuid,
    pub class_level: i32,
    pub duration_minutes: i32,
    pub sections: Vec<SectionResponse>,
    pub total_questions: i32,
    pub total_marks: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ExamStructure> for ExamStructureResponse {
    type Error = crate::error::Error;

    fn try_from(value: ExamStructure) -> Result<Self, Self::Error> {
        let sections = value
            .parsed_sections()
            .map_err(|e| {
                crate::error::Error::Internal(format!(
                    "exam structure {} has unreadable sections: {}",
                    value.id, e
                ))
            })?
            .into_iter()
            .map(SectionResponse::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: value.id,
            name: value.name,
            description: value.description,
            subject_id: value.subject_id,
            class_level: value.class_level,
            duration_minutes: value.duration_minutes,
            sections,
            total_questions: value.total_questions,
            total_marks: value.total_marks,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawnSection {
    pub title: String,
    pub question_type: QuestionType,
    pub requested: u32,
    pub drawn: u32,
    pub complete: bool,
    pub marks_per_question: Decimal,
    pub questions: Vec<QuestionResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawnPaperResponse {
    pub structure_id: Uuid,
    pub name: String,
    pub total_marks: Decimal,
    pub complete: bool,
    pub sections: Vec<DrawnSection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sourcing_payload_reads_all_modes() {
        let auto: SourcingPayload = serde_json::from_value(json!({"mode": "auto"})).unwrap();
        assert!(matches!(auto, SourcingPayload::Auto));

        let id = Uuid::new_v4();
        let chapters: SourcingPayload = serde_json::from_value(json!({
            "mode": "chapters",
            "allocations": [{"chapterId": id, "count": 4}]
        }))
        .unwrap();
        match chapters {
            SourcingPayload::Chapters { allocations } => {
                assert_eq!(allocations, vec![ChapterAllocation { chapter_id: id, count: 4 }]);
            }
            other => panic!("unexpected {:?}", other),
        }

        let distribute: SourcingPayload =
            serde_json::from_value(json!({"mode": "distribute", "chapterIds": [id]})).unwrap();
        assert!(matches!(distribute, SourcingPayload::Distribute { chapter_ids } if chapter_ids == vec![id]));
    }

    #[test]
    fn section_response_flattens_and_adds_marks() {
        let section = Section {
            title: "A".into(),
            instructions: None,
            question_type: QuestionType::ShortAnswer,
            question_count: 4,
            marks_per_question: Decimal::new(25, 1),
            sourcing: crate::models::exam_structure::SectionSourcing::Auto,
        };
        let json = serde_json::to_value(SectionResponse::try_from(section).unwrap()).unwrap();
        assert_eq!(json["questionType"], "short_answer");
        assert_eq!(json["sourcing"]["mode"], "auto");
        assert_eq!(json["sectionMarks"], "10.0");
    }
}
