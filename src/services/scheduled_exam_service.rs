use crate::dto::common_dto::{Page, PageWindow};
use crate::dto::scheduled_exam_dto::{
    CreateScheduledExamPayload, ScheduledExamListQuery, UpdateScheduledExamPayload,
};
use crate::error::{Error, Result};
use crate::models::exam_structure::{ExamStructure, EXAM_STRUCTURE_COLUMNS};
use crate::models::scheduled_exam::{ExamStatus, ScheduledExam, SCHEDULED_EXAM_COLUMNS};
use crate::utils::marks::{check_marks, MAX_TOTAL_MARKS};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Clone)]
pub struct ScheduledExamService {
    pool: PgPool,
}

/// Column values for a new exam once structure defaults are applied.
#[derive(Debug, PartialEq)]
struct ResolvedExam {
    subject_id: Uuid,
    class_level: i32,
    duration_minutes: i32,
    total_marks: Decimal,
    status: ExamStatus,
}

impl ScheduledExamService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateScheduledExamPayload) -> Result<ScheduledExam> {
        let structure = match payload.structure_id {
            Some(structure_id) => Some(self.load_structure(structure_id).await?),
            None => None,
        };
        let resolved = resolve_new_exam(&payload, structure.as_ref())?;

        let sql = format!(
            r#"
            INSERT INTO scheduled_exams (
                title, structure_id, subject_id, class_level, school_id,
                scheduled_at, duration_minutes, total_marks, instructions, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SCHEDULED_EXAM_COLUMNS
        );
        let exam = sqlx::query_as::<_, ScheduledExam>(&sql)
            .bind(payload.title.trim())
            .bind(payload.structure_id)
            .bind(resolved.subject_id)
            .bind(resolved.class_level)
            .bind(payload.school_id)
            .bind(payload.scheduled_at)
            .bind(resolved.duration_minutes)
            .bind(resolved.total_marks)
            .bind(payload.instructions)
            .bind(resolved.status.as_str())
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            exam_id = %exam.id,
            status = %exam.status,
            structure_id = ?exam.structure_id,
            "scheduled exam created"
        );
        Ok(exam)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ScheduledExam> {
        let sql = format!(
            "SELECT {} FROM scheduled_exams WHERE id = $1",
            SCHEDULED_EXAM_COLUMNS
        );
        sqlx::query_as::<_, ScheduledExam>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Scheduled exam {} not found", id)))
    }

    pub async fn update(&self, id: Uuid, payload: UpdateScheduledExamPayload) -> Result<ScheduledExam> {
        let current = self.get_by_id(id).await?;
        let status = current.current_status().map_err(Error::Internal)?;
        if !status.is_editable() {
            return Err(Error::Conflict(format!(
                "A {} exam can no longer be edited",
                status.as_str()
            )));
        }
        if let Some(marks) = payload.total_marks {
            check_total_marks(marks)?;
        }

        let sql = format!(
            r#"
            UPDATE scheduled_exams
            SET
                title = COALESCE($2, title),
                school_id = COALESCE($3, school_id),
                scheduled_at = COALESCE($4, scheduled_at),
                duration_minutes = COALESCE($5, duration_minutes),
                total_marks = COALESCE($6, total_marks),
                instructions = COALESCE($7, instructions),
                updated_at = NOW()
            WHERE id = $1 AND status = $8
            RETURNING {}
            "#,
            SCHEDULED_EXAM_COLUMNS
        );
        sqlx::query_as::<_, ScheduledExam>(&sql)
            .bind(id)
            .bind(payload.title.map(|t| t.trim().to_string()))
            .bind(payload.school_id)
            .bind(payload.scheduled_at)
            .bind(payload.duration_minutes)
            .bind(payload.total_marks)
            .bind(payload.instructions)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Conflict("Exam status changed while updating".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let current = self.get_by_id(id).await?;
        let status = current.current_status().map_err(Error::Internal)?;
        if !status.is_deletable() {
            return Err(Error::Conflict(format!(
                "A {} exam cannot be deleted",
                status.as_str()
            )));
        }
        let res = sqlx::query("DELETE FROM scheduled_exams WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::Conflict("Exam status changed while deleting".into()));
        }
        tracing::info!(exam_id = %id, "scheduled exam deleted");
        Ok(())
    }

    pub async fn list(&self, query: ScheduledExamListQuery) -> Result<Page<ScheduledExam>> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            check_window(from, to)?;
        }
        let window = PageWindow::from_query(query.page, query.per_page);

        let mut items_query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM scheduled_exams",
            SCHEDULED_EXAM_COLUMNS
        ));
        push_filters(&mut items_query, &query);
        items_query
            .push(" ORDER BY scheduled_at ASC NULLS LAST, created_at DESC LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset());
        let items = items_query
            .build_query_as::<ScheduledExam>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM scheduled_exams");
        push_filters(&mut total_query, &query);
        let total = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total, window))
    }

    pub async fn change_status(&self, id: Uuid, next: ExamStatus) -> Result<ScheduledExam> {
        let current = self.get_by_id(id).await?;
        let status = current.current_status().map_err(Error::Internal)?;
        if !status.can_transition_to(next) {
            return Err(Error::Conflict(format!(
                "Cannot move an exam from {} to {}",
                status.as_str(),
                next.as_str()
            )));
        }
        if next == ExamStatus::Scheduled && current.scheduled_at.is_none() {
            return Err(Error::BadRequest(
                "Set scheduledAt before scheduling the exam".into(),
            ));
        }

        let sql = format!(
            r#"
            UPDATE scheduled_exams
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING {}
            "#,
            SCHEDULED_EXAM_COLUMNS
        );
        let exam = sqlx::query_as::<_, ScheduledExam>(&sql)
            .bind(id)
            .bind(next.as_str())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Conflict("Exam status changed concurrently".into()))?;

        tracing::info!(
            exam_id = %id,
            from = status.as_str(),
            to = next.as_str(),
            "scheduled exam status changed"
        );
        Ok(exam)
    }

    async fn load_structure(&self, structure_id: Uuid) -> Result<ExamStructure> {
        let sql = format!(
            "SELECT {} FROM exam_structures WHERE id = $1",
            EXAM_STRUCTURE_COLUMNS
        );
        sqlx::query_as::<_, ExamStructure>(&sql)
            .bind(structure_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                Error::BadRequest(format!("Exam structure {} does not exist", structure_id))
            })
    }
}

fn resolve_new_exam(
    payload: &CreateScheduledExamPayload,
    structure: Option<&ExamStructure>,
) -> Result<ResolvedExam> {
    let status = payload.status.unwrap_or(ExamStatus::Draft);
    if !matches!(status, ExamStatus::Draft | ExamStatus::Scheduled) {
        return Err(Error::BadRequest(
            "New exams start as draft or scheduled".into(),
        ));
    }
    if status == ExamStatus::Scheduled && payload.scheduled_at.is_none() {
        return Err(Error::BadRequest(
            "scheduledAt is required for a scheduled exam".into(),
        ));
    }

    let missing = |field: &str| {
        Error::BadRequest(format!(
            "{} is required when no structureId is given",
            field
        ))
    };
    let resolved = match structure {
        Some(s) => ResolvedExam {
            subject_id: payload.subject_id.unwrap_or(s.subject_id),
            class_level: payload.class_level.unwrap_or(s.class_level),
            duration_minutes: payload.duration_minutes.unwrap_or(s.duration_minutes),
            total_marks: payload.total_marks.unwrap_or(s.total_marks),
            status,
        },
        None => ResolvedExam {
            subject_id: payload.subject_id.ok_or_else(|| missing("subjectId"))?,
            class_level: payload.class_level.ok_or_else(|| missing("classLevel"))?,
            duration_minutes: payload
                .duration_minutes
                .ok_or_else(|| missing("durationMinutes"))?,
            total_marks: payload.total_marks.ok_or_else(|| missing("totalMarks"))?,
            status,
        },
    };
    check_total_marks(resolved.total_marks)?;
    Ok(resolved)
}

fn check_total_marks(marks: Decimal) -> Result<()> {
    check_marks("totalMarks", marks, MAX_TOTAL_MARKS).map_err(Error::BadRequest)
}

fn check_window(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<()> {
    if from > to {
        return Err(Error::BadRequest("from must not be after to".into()));
    }
    Ok(())
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ScheduledExamListQuery) {
    builder.push(" WHERE TRUE");
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(subject_id) = query.subject_id {
        builder.push(" AND subject_id = ").push_bind(subject_id);
    }
    if let Some(school_id) = query.school_id {
        builder.push(" AND school_id = ").push_bind(school_id);
    }
    if let Some(from) = query.from {
        builder.push(" AND scheduled_at >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        builder.push(" AND scheduled_at <= ").push_bind(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payload() -> CreateScheduledExamPayload {
        CreateScheduledExamPayload {
            title: "Unit test 1".into(),
            structure_id: None,
            subject_id: None,
            class_level: None,
            school_id: None,
            scheduled_at: None,
            duration_minutes: None,
            total_marks: None,
            instructions: None,
            status: None,
        }
    }

    fn structure() -> ExamStructure {
        ExamStructure {
            id: Uuid::new_v4(),
            name: "Physics midterm".into(),
            description: None,
            subject_id: Uuid::new_v4(),
            class_level: 10,
            duration_minutes: 90,
            sections: serde_json::json!([]),
            total_questions: 20,
            total_marks: Decimal::new(40, 0),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn structure_supplies_defaults() {
        let s = structure();
        let mut p = payload();
        p.duration_minutes = Some(60);
        let resolved = resolve_new_exam(&p, Some(&s)).unwrap();
        assert_eq!(resolved.subject_id, s.subject_id);
        assert_eq!(resolved.class_level, 10);
        assert_eq!(resolved.duration_minutes, 60);
        assert_eq!(resolved.total_marks, Decimal::new(40, 0));
        assert_eq!(resolved.status, ExamStatus::Draft);
    }

    #[test]
    fn ad_hoc_exam_needs_every_field() {
        let err = resolve_new_exam(&payload(), None).unwrap_err();
        assert!(err.to_string().contains("subjectId"));

        let mut p = payload();
        p.subject_id = Some(Uuid::new_v4());
        p.class_level = Some(9);
        p.duration_minutes = Some(45);
        p.total_marks = Some(Decimal::new(25, 0));
        assert!(resolve_new_exam(&p, None).is_ok());
    }

    #[test]
    fn only_draft_or_scheduled_on_create() {
        let s = structure();
        let mut p = payload();
        p.status = Some(ExamStatus::Active);
        assert!(resolve_new_exam(&p, Some(&s)).is_err());

        p.status = Some(ExamStatus::Scheduled);
        assert!(resolve_new_exam(&p, Some(&s)).is_err());

        p.scheduled_at = Some(Utc::now() + Duration::days(3));
        assert_eq!(
            resolve_new_exam(&p, Some(&s)).unwrap().status,
            ExamStatus::Scheduled
        );
    }

    #[test]
    fn total_marks_above_the_column_limit_are_rejected() {
        let mut p = payload();
        p.subject_id = Some(Uuid::new_v4());
        p.class_level = Some(9);
        p.duration_minutes = Some(45);
        p.total_marks = Some(Decimal::new(1_000_000, 0));
        let err = resolve_new_exam(&p, None).unwrap_err();
        assert!(err.to_string().contains("totalMarks must not exceed"));

        p.total_marks = Some(Decimal::new(12_345, 3));
        assert!(resolve_new_exam(&p, None).is_err());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        assert!(check_window(now, now + Duration::hours(1)).is_ok());
        assert!(check_window(now + Duration::hours(1), now).is_err());
    }
}
