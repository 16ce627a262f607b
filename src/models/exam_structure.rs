use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::question::QuestionType;

pub const EXAM_STRUCTURE_COLUMNS: &str = "id, name, description, subject_id, class_level, \
    duration_minutes, sections, total_questions, total_marks, is_active, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExamStructure {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub subject_id: Uuid,
    pub class_level: i32,
    pub duration_minutes: i32,
    pub sections: JsonValue,
    pub total_questions: i32,
    pub total_marks: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAllocation {
    pub chapter_id: Uuid,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SectionSourcing {
    /// Questions are drawn at random from every chapter of the subject.
    Auto,
    Chapters { allocations: Vec<ChapterAllocation> },
}

/// A finished section as stored inside `exam_structures.sections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub instructions: Option<String>,
    pub question_type: QuestionType,
    pub question_count: u32,
    pub marks_per_question: Decimal,
    pub sourcing: SectionSourcing,
}

impl Section {
    /// `None` when the product does not fit a `Decimal`.
    pub fn section_marks(&self) -> Option<Decimal> {
        self.marks_per_question
            .checked_mul(Decimal::from(self.question_count))
    }
}

impl ExamStructure {
    pub fn parsed_sections(&self) -> serde_json::Result<Vec<Section>> {
        serde_json::from_value(self.sections.clone())
    }
}

/// Question count and marks over all sections, or `None` on overflow.
pub fn totals(sections: &[Section]) -> Option<(i32, Decimal)> {
    sections
        .iter()
        .try_fold((0i32, Decimal::ZERO), |(count, marks), s| {
            let count = count.checked_add(i32::try_from(s.question_count).ok()?)?;
            let marks = marks.checked_add(s.section_marks()?)?;
            Some((count, marks))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(count: u32, marks: Decimal) -> Section {
        Section {
            title: "A".into(),
            instructions: None,
            question_type: QuestionType::ShortAnswer,
            question_count: count,
            marks_per_question: marks,
            sourcing: SectionSourcing::Auto,
        }
    }

    #[test]
    fn totals_add_up_every_section() {
        let sections = [
            section(10, Decimal::new(2, 0)),
            section(2, Decimal::new(5, 0)),
        ];
        assert_eq!(totals(&sections), Some((12, Decimal::new(30, 0))));
        assert_eq!(totals(&[]), Some((0, Decimal::ZERO)));
    }

    #[test]
    fn overflowing_marks_give_none() {
        let huge = section(500, Decimal::MAX);
        assert_eq!(huge.section_marks(), None);
        assert_eq!(totals(&[section(1, Decimal::ONE), huge]), None);
    }
}
