use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::exam_structure::{totals, ChapterAllocation, Section, SectionSourcing};
use crate::models::question::QuestionType;
use crate::services::allocation_service::{AllocationService, ChapterCapacity};
use crate::utils::marks::{check_marks, MAX_QUESTION_MARKS, MAX_TOTAL_MARKS};

pub const MAX_SECTION_QUESTIONS: u32 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct SectionConfig {
    pub title: String,
    pub instructions: Option<String>,
    pub question_type: QuestionType,
    pub question_count: u32,
    pub marks_per_question: Decimal,
}

/// How the author wants the section's questions sourced.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceChoice {
    Auto,
    Chapters(Vec<ChapterAllocation>),
    /// Spread the count over these chapters with the allocator.
    AutoDistribute(Vec<ChapterCapacity<Uuid>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStep {
    Configure,
    Source,
    Review,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EditorError {
    #[error("section editor is at {actual:?}, expected {expected:?}")]
    WrongStep {
        expected: EditorStep,
        actual: EditorStep,
    },
    #[error("{0}")]
    Invalid(String),
}

impl From<EditorError> for crate::error::Error {
    fn from(err: EditorError) -> Self {
        crate::error::Error::BadRequest(err.to_string())
    }
}

/// Authoring flow for one section: configure, then source, then review.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionEditor {
    Configure {
        draft: Option<SectionConfig>,
    },
    Source {
        config: SectionConfig,
        previous: Option<SectionSourcing>,
    },
    Review {
        section: Section,
    },
}

impl Default for SectionEditor {
    fn default() -> Self {
        SectionEditor::Configure { draft: None }
    }
}

impl SectionEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> EditorStep {
        match self {
            SectionEditor::Configure { .. } => EditorStep::Configure,
            SectionEditor::Source { .. } => EditorStep::Source,
            SectionEditor::Review { .. } => EditorStep::Review,
        }
    }

    pub fn configure(self, config: SectionConfig) -> Result<Self, EditorError> {
        if self.step() != EditorStep::Configure {
            return Err(self.wrong_step(EditorStep::Configure));
        }
        check_config(&config)?;
        Ok(SectionEditor::Source {
            config,
            previous: None,
        })
    }

    pub fn source(self, choice: SourceChoice) -> Result<Self, EditorError> {
        let config = match self {
            SectionEditor::Source { config, .. } => config,
            other => return Err(other.wrong_step(EditorStep::Source)),
        };
        let sourcing = resolve_sourcing(config.question_count, choice)?;
        Ok(SectionEditor::Review {
            section: Section {
                title: config.title.trim().to_string(),
                instructions: config.instructions,
                question_type: config.question_type,
                question_count: config.question_count,
                marks_per_question: config.marks_per_question,
                sourcing,
            },
        })
    }

    pub fn back(self) -> Self {
        match self {
            SectionEditor::Configure { draft } => SectionEditor::Configure { draft },
            SectionEditor::Source { config, .. } => SectionEditor::Configure {
                draft: Some(config),
            },
            SectionEditor::Review { section } => SectionEditor::Source {
                config: SectionConfig {
                    title: section.title,
                    instructions: section.instructions,
                    question_type: section.question_type,
                    question_count: section.question_count,
                    marks_per_question: section.marks_per_question,
                },
                previous: Some(section.sourcing),
            },
        }
    }

    pub fn finish(self) -> Result<Section, EditorError> {
        match self {
            SectionEditor::Review { section } => Ok(section),
            other => Err(other.wrong_step(EditorStep::Review)),
        }
    }

    /// Runs the whole flow in one go.
    pub fn build(config: SectionConfig, choice: SourceChoice) -> Result<Section, EditorError> {
        SectionEditor::new()
            .configure(config)?
            .source(choice)?
            .finish()
    }

    fn wrong_step(&self, expected: EditorStep) -> EditorError {
        EditorError::WrongStep {
            expected,
            actual: self.step(),
        }
    }
}

impl SectionConfig {
    fn section_marks(&self) -> Option<Decimal> {
        self.marks_per_question
            .checked_mul(Decimal::from(self.question_count))
    }
}

fn check_config(config: &SectionConfig) -> Result<(), EditorError> {
    if config.title.trim().is_empty() {
        return Err(EditorError::Invalid("section title cannot be empty".into()));
    }
    if config.question_count == 0 || config.question_count > MAX_SECTION_QUESTIONS {
        return Err(EditorError::Invalid(format!(
            "questionCount must be between 1 and {}",
            MAX_SECTION_QUESTIONS
        )));
    }
    check_marks("marksPerQuestion", config.marks_per_question, MAX_QUESTION_MARKS)
        .map_err(EditorError::Invalid)?;
    if !matches!(config.section_marks(), Some(m) if m <= MAX_TOTAL_MARKS) {
        return Err(EditorError::Invalid(format!(
            "section marks must not exceed {}",
            MAX_TOTAL_MARKS
        )));
    }
    Ok(())
}

/// Question count and marks of a whole exam, rejecting totals that do not
/// fit `exam_structures.total_marks`.
pub fn exam_totals(sections: &[Section]) -> Result<(i32, Decimal), EditorError> {
    match totals(sections) {
        Some((count, marks)) if marks <= MAX_TOTAL_MARKS => Ok((count, marks)),
        _ => Err(EditorError::Invalid(format!(
            "total marks must not exceed {}",
            MAX_TOTAL_MARKS
        ))),
    }
}

fn resolve_sourcing(required: u32, choice: SourceChoice) -> Result<SectionSourcing, EditorError> {
    match choice {
        SourceChoice::Auto => Ok(SectionSourcing::Auto),
        SourceChoice::Chapters(allocations) => {
            check_allocations(required, &allocations)?;
            Ok(SectionSourcing::Chapters { allocations })
        }
        SourceChoice::AutoDistribute(capacities) => {
            if capacities.is_empty() {
                return Err(EditorError::Invalid(
                    "select at least one chapter to distribute over".into(),
                ));
            }
            let allocations: Vec<ChapterAllocation> =
                AllocationService::distribute(required, &capacities)
                    .into_iter()
                    .map(|(chapter_id, count)| ChapterAllocation { chapter_id, count })
                    .collect();
            let placed: u32 = allocations.iter().map(|a| a.count).sum();
            if placed < required {
                return Err(EditorError::Invalid(format!(
                    "selected chapters only have {} of {} required questions",
                    placed, required
                )));
            }
            Ok(SectionSourcing::Chapters { allocations })
        }
    }
}

fn check_allocations(required: u32, allocations: &[ChapterAllocation]) -> Result<(), EditorError> {
    if allocations.is_empty() {
        return Err(EditorError::Invalid(
            "chapter sourcing needs at least one chapter".into(),
        ));
    }
    let mut seen = HashSet::new();
    let mut total: u64 = 0;
    for allocation in allocations {
        if allocation.count == 0 {
            return Err(EditorError::Invalid(format!(
                "chapter {} has a zero allocation",
                allocation.chapter_id
            )));
        }
        if !seen.insert(allocation.chapter_id) {
            return Err(EditorError::Invalid(format!(
                "chapter {} is allocated twice",
                allocation.chapter_id
            )));
        }
        total += u64::from(allocation.count);
    }
    if total != u64::from(required) {
        return Err(EditorError::Invalid(format!(
            "chapter allocations add up to {} but the section needs {}",
            total, required
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(count: u32) -> SectionConfig {
        SectionConfig {
            title: " Section A ".into(),
            instructions: None,
            question_type: QuestionType::SingleMcq,
            question_count: count,
            marks_per_question: Decimal::new(2, 0),
        }
    }

    #[test]
    fn happy_path_walks_all_three_steps() {
        let editor = SectionEditor::new();
        assert_eq!(editor.step(), EditorStep::Configure);
        let editor = editor.configure(config(5)).unwrap();
        assert_eq!(editor.step(), EditorStep::Source);
        let editor = editor.source(SourceChoice::Auto).unwrap();
        assert_eq!(editor.step(), EditorStep::Review);
        let section = editor.finish().unwrap();
        assert_eq!(section.title, "Section A");
        assert_eq!(section.sourcing, SectionSourcing::Auto);
        assert_eq!(section.section_marks(), Some(Decimal::new(10, 0)));
    }

    #[test]
    fn steps_cannot_be_skipped() {
        let err = SectionEditor::new().source(SourceChoice::Auto).unwrap_err();
        assert_eq!(
            err,
            EditorError::WrongStep {
                expected: EditorStep::Source,
                actual: EditorStep::Configure
            }
        );
        assert!(SectionEditor::new().finish().is_err());
    }

    #[test]
    fn back_keeps_what_was_entered() {
        let a = Uuid::new_v4();
        let editor = SectionEditor::new()
            .configure(config(3))
            .unwrap()
            .source(SourceChoice::Chapters(vec![ChapterAllocation {
                chapter_id: a,
                count: 3,
            }]))
            .unwrap()
            .back();
        match &editor {
            SectionEditor::Source { config, previous } => {
                assert_eq!(config.question_count, 3);
                assert!(matches!(previous, Some(SectionSourcing::Chapters { .. })));
            }
            other => panic!("unexpected step {:?}", other.step()),
        }
        let editor = editor.back();
        assert!(matches!(editor, SectionEditor::Configure { draft: Some(_) }));
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(SectionEditor::new().configure(config(0)).is_err());
        let mut cfg = config(4);
        cfg.marks_per_question = Decimal::ZERO;
        assert!(SectionEditor::new().configure(cfg).is_err());
        let mut cfg = config(4);
        cfg.title = "   ".into();
        assert!(SectionEditor::new().configure(cfg).is_err());
    }

    #[test]
    fn huge_marks_are_rejected_instead_of_overflowing() {
        let mut cfg = config(MAX_SECTION_QUESTIONS);
        cfg.marks_per_question = Decimal::MAX;
        let err = SectionEditor::build(cfg, SourceChoice::Auto).unwrap_err();
        assert!(err.to_string().contains("marksPerQuestion must not exceed"));

        let mut cfg = config(4);
        cfg.marks_per_question = Decimal::new(2_505, 3);
        assert!(SectionEditor::build(cfg, SourceChoice::Auto).is_err());

        // Each question fits the column, the section total does not.
        let mut cfg = config(MAX_SECTION_QUESTIONS);
        cfg.marks_per_question = MAX_QUESTION_MARKS;
        let err = SectionEditor::build(cfg, SourceChoice::Auto).unwrap_err();
        assert!(err.to_string().contains("section marks"));
    }

    #[test]
    fn exam_totals_are_capped() {
        let mut cfg = config(200);
        cfg.marks_per_question = Decimal::new(2_000, 0);
        let section = SectionEditor::build(cfg, SourceChoice::Auto).unwrap();
        assert_eq!(
            exam_totals(std::slice::from_ref(&section)),
            Ok((200, Decimal::new(400_000, 0)))
        );

        let sections = vec![section.clone(), section.clone(), section];
        let err = exam_totals(&sections).unwrap_err();
        assert!(err.to_string().contains("999999.99"));
    }

    #[test]
    fn explicit_allocations_must_match_the_count() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let short = SourceChoice::Chapters(vec![
            ChapterAllocation { chapter_id: a, count: 2 },
            ChapterAllocation { chapter_id: b, count: 2 },
        ]);
        assert!(SectionEditor::build(config(5), short).is_err());

        let duplicate = SourceChoice::Chapters(vec![
            ChapterAllocation { chapter_id: a, count: 2 },
            ChapterAllocation { chapter_id: a, count: 3 },
        ]);
        assert!(SectionEditor::build(config(5), duplicate).is_err());
    }

    #[test]
    fn auto_distribute_uses_the_allocator() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let section = SectionEditor::build(
            config(10),
            SourceChoice::AutoDistribute(vec![
                ChapterCapacity::new(a, 3),
                ChapterCapacity::new(b, 20),
            ]),
        )
        .unwrap();
        assert_eq!(
            section.sourcing,
            SectionSourcing::Chapters {
                allocations: vec![
                    ChapterAllocation { chapter_id: a, count: 3 },
                    ChapterAllocation { chapter_id: b, count: 7 },
                ]
            }
        );
    }

    #[test]
    fn auto_distribute_fails_when_supply_is_short() {
        let err = SectionEditor::build(
            config(10),
            SourceChoice::AutoDistribute(vec![
                ChapterCapacity::new(Uuid::new_v4(), 2),
                ChapterCapacity::new(Uuid::new_v4(), 2),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("4 of 10"));
    }
}
