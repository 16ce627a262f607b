use crate::dto::common_dto::{like_pattern, Page, PageWindow};
use crate::dto::exam_structure_dto::{
    CreateExamStructurePayload, DrawnPaperResponse, DrawnSection, ExamStructureListQuery,
    SectionPayload, SourcingPayload, UpdateExamStructurePayload,
};
use crate::error::{Error, Result};
use crate::models::exam_structure::{
    ExamStructure, Section, SectionSourcing, EXAM_STRUCTURE_COLUMNS,
};
use crate::models::question::QuestionType;
use crate::services::chapter_service::ChapterService;
use crate::services::question_service::QuestionService;
use crate::services::section_editor::{exam_totals, SectionEditor, SourceChoice};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Clone)]
pub struct ExamStructureService {
    pool: PgPool,
    chapters: ChapterService,
    questions: QuestionService,
}

impl ExamStructureService {
    pub fn new(pool: PgPool, chapters: ChapterService, questions: QuestionService) -> Self {
        Self {
            pool,
            chapters,
            questions,
        }
    }

    pub async fn create(&self, payload: CreateExamStructurePayload) -> Result<ExamStructure> {
        self.ensure_leaf_subject(payload.subject_id).await?;
        let sections = self.build_sections(payload.subject_id, &payload.sections).await?;
        let (total_questions, total_marks) = exam_totals(&sections)?;

        let sql = format!(
            r#"
            INSERT INTO exam_structures (
                name, description, subject_id, class_level, duration_minutes,
                sections, total_questions, total_marks, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, TRUE))
            RETURNING {}
            "#,
            EXAM_STRUCTURE_COLUMNS
        );
        let structure = sqlx::query_as::<_, ExamStructure>(&sql)
            .bind(payload.name.trim())
            .bind(payload.description)
            .bind(payload.subject_id)
            .bind(payload.class_level)
            .bind(payload.duration_minutes)
            .bind(serde_json::to_value(&sections)?)
            .bind(total_questions)
            .bind(total_marks)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            structure_id = %structure.id,
            sections = sections.len(),
            total_marks = %structure.total_marks,
            "exam structure created"
        );
        Ok(structure)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ExamStructure> {
        let sql = format!(
            "SELECT {} FROM exam_structures WHERE id = $1",
            EXAM_STRUCTURE_COLUMNS
        );
        sqlx::query_as::<_, ExamStructure>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Exam structure {} not found", id)))
    }

    pub async fn update(&self, id: Uuid, payload: UpdateExamStructurePayload) -> Result<ExamStructure> {
        let current = self.get_by_id(id).await?;

        let (sections_json, total_questions, total_marks) = match &payload.sections {
            Some(section_payloads) => {
                let sections = self.build_sections(current.subject_id, section_payloads).await?;
                let (count, marks) = exam_totals(&sections)?;
                (Some(serde_json::to_value(&sections)?), Some(count), Some(marks))
            }
            None => (None, None, None),
        };

        let sql = format!(
            r#"
            UPDATE exam_structures
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                class_level = COALESCE($4, class_level),
                duration_minutes = COALESCE($5, duration_minutes),
                sections = COALESCE($6, sections),
                total_questions = COALESCE($7, total_questions),
                total_marks = COALESCE($8, total_marks),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EXAM_STRUCTURE_COLUMNS
        );
        let structure = sqlx::query_as::<_, ExamStructure>(&sql)
            .bind(id)
            .bind(payload.name.map(|n| n.trim().to_string()))
            .bind(payload.description)
            .bind(payload.class_level)
            .bind(payload.duration_minutes)
            .bind(sections_json)
            .bind(total_questions)
            .bind(total_marks)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        Ok(structure)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.get_by_id(id).await?;
        let in_use: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM scheduled_exams WHERE structure_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if in_use > 0 {
            return Err(Error::Conflict(format!(
                "Exam structure is used by {} scheduled exams",
                in_use
            )));
        }
        sqlx::query("DELETE FROM exam_structures WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list(&self, query: ExamStructureListQuery) -> Result<Page<ExamStructure>> {
        let window = PageWindow::from_query(query.page, query.per_page);

        let mut items_query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM exam_structures",
            EXAM_STRUCTURE_COLUMNS
        ));
        push_filters(&mut items_query, &query);
        items_query
            .push(" ORDER BY updated_at DESC, id LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset());
        let items = items_query
            .build_query_as::<ExamStructure>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM exam_structures");
        push_filters(&mut total_query, &query);
        let total = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total, window))
    }

    pub async fn duplicate(&self, id: Uuid) -> Result<ExamStructure> {
        let sql = format!(
            r#"
            INSERT INTO exam_structures (
                name, description, subject_id, class_level, duration_minutes,
                sections, total_questions, total_marks, is_active
            )
            SELECT name || ' (copy)', description, subject_id, class_level, duration_minutes,
                   sections, total_questions, total_marks, is_active
            FROM exam_structures WHERE id = $1
            RETURNING {}
            "#,
            EXAM_STRUCTURE_COLUMNS
        );
        sqlx::query_as::<_, ExamStructure>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Exam structure {} not found", id)))
    }

    /// Assembles a concrete question set for the structure.
    pub async fn draw(&self, id: Uuid) -> Result<DrawnPaperResponse> {
        let structure = self.get_by_id(id).await?;
        let sections = structure.parsed_sections().map_err(|e| {
            Error::Internal(format!(
                "exam structure {} has unreadable sections: {}",
                structure.id, e
            ))
        })?;

        let mut subject_chapters: Option<Vec<Uuid>> = None;
        // A question appears at most once per paper.
        let mut used: Vec<Uuid> = Vec::new();
        let mut drawn_sections = Vec::with_capacity(sections.len());
        for section in sections {
            let mut questions = Vec::new();
            match &section.sourcing {
                SectionSourcing::Chapters { allocations } => {
                    for allocation in allocations {
                        let picked = self
                            .questions
                            .draw_random(
                                &[allocation.chapter_id],
                                section.question_type,
                                allocation.count,
                                &used,
                            )
                            .await?;
                        used.extend(picked.iter().map(|q| q.id));
                        questions.extend(picked);
                    }
                }
                SectionSourcing::Auto => {
                    if subject_chapters.is_none() {
                        subject_chapters = Some(self.active_chapter_ids(structure.subject_id).await?);
                    }
                    let chapter_ids = subject_chapters.as_deref().unwrap_or_default();
                    let picked = self
                        .questions
                        .draw_random(chapter_ids, section.question_type, section.question_count, &used)
                        .await?;
                    used.extend(picked.iter().map(|q| q.id));
                    questions.extend(picked);
                }
            }

            let drawn = questions.len() as u32;
            if drawn < section.question_count {
                tracing::warn!(
                    structure_id = %structure.id,
                    section = %section.title,
                    drawn,
                    requested = section.question_count,
                    "not enough questions to fill section"
                );
            }
            drawn_sections.push(DrawnSection {
                title: section.title,
                question_type: section.question_type,
                requested: section.question_count,
                drawn,
                complete: drawn >= section.question_count,
                marks_per_question: section.marks_per_question,
                questions: questions.into_iter().map(Into::into).collect(),
            });
        }

        Ok(DrawnPaperResponse {
            structure_id: structure.id,
            name: structure.name,
            total_marks: structure.total_marks,
            complete: drawn_sections.iter().all(|s| s.complete),
            sections: drawn_sections,
        })
    }

    /// Runs each submitted section through the editor and checks chapter
    /// allocations against what the question bank holds.
    async fn build_sections(
        &self,
        subject_id: Uuid,
        payloads: &[SectionPayload],
    ) -> Result<Vec<Section>> {
        let mut sections = Vec::with_capacity(payloads.len());
        for (idx, payload) in payloads.iter().enumerate() {
            let at = |e: Error| match e {
                Error::BadRequest(msg) => Error::BadRequest(format!("sections[{}]: {}", idx, msg)),
                other => other,
            };

            let choice = match &payload.sourcing {
                SourcingPayload::Auto => SourceChoice::Auto,
                SourcingPayload::Chapters { allocations } => {
                    SourceChoice::Chapters(allocations.clone())
                }
                SourcingPayload::Distribute { chapter_ids } => {
                    let capacities = self
                        .chapters
                        .availability(Some(subject_id), chapter_ids, payload.question_type)
                        .await
                        .map_err(at)?;
                    SourceChoice::AutoDistribute(capacities)
                }
            };

            let section = SectionEditor::build(payload.config(), choice)
                .map_err(|e| at(e.into()))?;
            sections.push(section);
        }
        self.check_supply(subject_id, &sections).await?;
        Ok(sections)
    }

    /// Checks every chapter can supply what all sections together take from
    /// it for each question type.
    async fn check_supply(&self, subject_id: Uuid, sections: &[Section]) -> Result<()> {
        let demand = chapter_demand(sections);
        let mut types: Vec<QuestionType> = Vec::new();
        for d in &demand {
            if !types.contains(&d.question_type) {
                types.push(d.question_type);
            }
        }

        for question_type in types {
            let wanted: Vec<&ChapterDemand> = demand
                .iter()
                .filter(|d| d.question_type == question_type)
                .collect();
            let ids: Vec<Uuid> = wanted.iter().map(|d| d.chapter_id).collect();
            let capacities = self
                .chapters
                .availability(Some(subject_id), &ids, question_type)
                .await
                .map_err(|e| match e {
                    Error::BadRequest(msg) => {
                        let mut idx: Vec<usize> =
                            wanted.iter().flat_map(|d| d.sections.iter().copied()).collect();
                        idx.sort_unstable();
                        idx.dedup();
                        Error::BadRequest(format!("{}: {}", section_label(&idx), msg))
                    }
                    other => other,
                })?;
            for (d, capacity) in wanted.iter().zip(&capacities) {
                if d.count > capacity.available {
                    return Err(Error::BadRequest(format!(
                        "{}: chapter {} has {} {} questions but {} were allocated",
                        section_label(&d.sections),
                        d.chapter_id,
                        capacity.available,
                        question_type.as_str(),
                        d.count
                    )));
                }
            }
        }
        Ok(())
    }

    async fn ensure_leaf_subject(&self, subject_id: Uuid) -> Result<()> {
        let is_category: Option<bool> =
            sqlx::query_scalar("SELECT is_category FROM subjects WHERE id = $1")
                .bind(subject_id)
                .fetch_optional(&self.pool)
                .await?;
        match is_category {
            None => Err(Error::BadRequest(format!("Subject {} does not exist", subject_id))),
            Some(true) => Err(Error::BadRequest(
                "Exam structures are built for subjects, not categories".into(),
            )),
            Some(false) => Ok(()),
        }
    }

    async fn active_chapter_ids(&self, subject_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar(
            "SELECT id FROM chapters WHERE subject_id = $1 AND is_active ORDER BY chapter_number",
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}

/// What one chapter must supply for one question type, summed over the
/// sections that draw from it.
#[derive(Debug, Clone, PartialEq)]
struct ChapterDemand {
    question_type: QuestionType,
    chapter_id: Uuid,
    count: u32,
    sections: Vec<usize>,
}

fn chapter_demand(sections: &[Section]) -> Vec<ChapterDemand> {
    let mut demand: Vec<ChapterDemand> = Vec::new();
    for (idx, section) in sections.iter().enumerate() {
        let SectionSourcing::Chapters { allocations } = &section.sourcing else {
            continue;
        };
        for allocation in allocations {
            let existing = demand.iter_mut().find(|d| {
                d.question_type == section.question_type && d.chapter_id == allocation.chapter_id
            });
            match existing {
                Some(d) => {
                    d.count = d.count.saturating_add(allocation.count);
                    d.sections.push(idx);
                }
                None => demand.push(ChapterDemand {
                    question_type: section.question_type,
                    chapter_id: allocation.chapter_id,
                    count: allocation.count,
                    sections: vec![idx],
                }),
            }
        }
    }
    demand
}

fn section_label(indices: &[usize]) -> String {
    let list: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
    format!("sections[{}]", list.join(", "))
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ExamStructureListQuery) {
    builder.push(" WHERE TRUE");
    if let Some(subject_id) = query.subject_id {
        builder.push(" AND subject_id = ").push_bind(subject_id);
    }
    if let Some(class_level) = query.class_level {
        builder.push(" AND class_level = ").push_bind(class_level);
    }
    if let Some(is_active) = query.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        builder.push(" AND name ILIKE ").push_bind(like_pattern(search));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exam_structure::ChapterAllocation;
    use rust_decimal::Decimal;

    fn from_chapters(question_type: QuestionType, allocations: &[(Uuid, u32)]) -> Section {
        Section {
            title: "Part".into(),
            instructions: None,
            question_type,
            question_count: allocations.iter().map(|(_, c)| c).sum(),
            marks_per_question: Decimal::ONE,
            sourcing: SectionSourcing::Chapters {
                allocations: allocations
                    .iter()
                    .map(|&(chapter_id, count)| ChapterAllocation { chapter_id, count })
                    .collect(),
            },
        }
    }

    #[test]
    fn demand_adds_up_sections_sharing_a_chapter() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let sections = vec![
            from_chapters(QuestionType::SingleMcq, &[(a, 3)]),
            from_chapters(QuestionType::SingleMcq, &[(a, 3), (b, 1)]),
        ];
        let demand = chapter_demand(&sections);
        assert_eq!(demand.len(), 2);
        assert_eq!(demand[0].chapter_id, a);
        assert_eq!(demand[0].count, 6);
        assert_eq!(demand[0].sections, vec![0, 1]);
        assert_eq!(demand[1].chapter_id, b);
        assert_eq!(demand[1].sections, vec![1]);
        assert_eq!(section_label(&demand[0].sections), "sections[0, 1]");
    }

    #[test]
    fn demand_is_tracked_per_question_type() {
        let a = Uuid::new_v4();
        let mut auto = from_chapters(QuestionType::TrueFalse, &[]);
        auto.question_count = 5;
        auto.sourcing = SectionSourcing::Auto;
        let sections = vec![
            from_chapters(QuestionType::SingleMcq, &[(a, 2)]),
            from_chapters(QuestionType::TrueFalse, &[(a, 4)]),
            auto,
        ];
        let demand = chapter_demand(&sections);
        assert_eq!(demand.len(), 2);
        assert!(demand.iter().all(|d| d.sections.len() == 1 && d.chapter_id == a));
        assert_eq!(demand[1].question_type, QuestionType::TrueFalse);
        assert_eq!(demand[1].count, 4);
    }
}
