use crate::dto::common_dto::{like_pattern, Page, PageWindow};
use crate::dto::question_dto::{CreateQuestionPayload, QuestionListQuery, UpdateQuestionPayload};
use crate::error::{Error, Result};
use crate::models::question::{AnswerData, Question, QuestionType, QUESTION_COLUMNS};
use crate::utils::marks::{self, MAX_QUESTION_MARKS};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

/// A payload that passed every check and is ready to insert.
struct PreparedQuestion {
    payload: CreateQuestionPayload,
    answer_data: JsonValue,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateQuestionPayload) -> Result<Question> {
        let prepared = prepare(payload)?;
        let mut conn = self.pool.acquire().await?;
        let question = insert(&mut *conn, prepared).await?;
        tracing::info!(
            question_id = %question.id,
            chapter_id = %question.chapter_id,
            question_type = %question.question_type,
            "question created"
        );
        Ok(question)
    }

    /// Inserts every question or none of them.
    pub async fn bulk_create(&self, payloads: Vec<CreateQuestionPayload>) -> Result<Vec<Question>> {
        let mut prepared = Vec::with_capacity(payloads.len());
        for (idx, payload) in payloads.into_iter().enumerate() {
            let item = prepare(payload).map_err(|e| match e {
                Error::BadRequest(msg) => Error::BadRequest(format!("questions[{}]: {}", idx, msg)),
                other => other,
            })?;
            prepared.push(item);
        }

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(prepared.len());
        for item in prepared {
            created.push(insert(&mut *tx, item).await?);
        }
        tx.commit().await?;

        tracing::info!(count = created.len(), "questions bulk created");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Question> {
        let sql = format!("SELECT {} FROM questions WHERE id = $1", QUESTION_COLUMNS);
        sqlx::query_as::<_, Question>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Question {} not found", id)))
    }

    pub async fn update(&self, id: Uuid, payload: UpdateQuestionPayload) -> Result<Question> {
        let current = self.get_by_id(id).await?;
        let answer_data = resolve_update_answer(&current, &payload)?;
        if let Some(marks) = payload.marks {
            check_marks(marks)?;
        }

        let sql = format!(
            r#"
            UPDATE questions
            SET
                chapter_id = COALESCE($2, chapter_id),
                question_type = COALESCE($3, question_type),
                difficulty = COALESCE($4, difficulty),
                marks = COALESCE($5, marks),
                question_text_en = COALESCE($6, question_text_en),
                question_text_hi = COALESCE($7, question_text_hi),
                answer_data = COALESCE($8, answer_data),
                explanation = COALESCE($9, explanation),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        );
        let question = sqlx::query_as::<_, Question>(&sql)
            .bind(id)
            .bind(payload.chapter_id)
            .bind(payload.question_type.map(|t| t.as_str()))
            .bind(payload.difficulty.map(|d| d.as_str()))
            .bind(payload.marks)
            .bind(payload.question_text_en.map(|t| t.trim().to_string()))
            .bind(payload.question_text_hi)
            .bind(answer_data)
            .bind(payload.explanation)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        Ok(question)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Question {} not found", id)));
        }
        Ok(())
    }

    pub async fn list(&self, query: QuestionListQuery) -> Result<Page<Question>> {
        let window = PageWindow::from_query(query.page, query.per_page);

        let mut items_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM questions", QUESTION_COLUMNS));
        push_filters(&mut items_query, &query);
        items_query
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset());
        let items = items_query
            .build_query_as::<Question>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM questions");
        push_filters(&mut total_query, &query);
        let total = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total, window))
    }

    /// Picks up to `limit` random active questions of a type from the active
    /// chapters given, skipping the ids in `exclude`.
    pub async fn draw_random(
        &self,
        chapter_ids: &[Uuid],
        question_type: QuestionType,
        limit: u32,
        exclude: &[Uuid],
    ) -> Result<Vec<Question>> {
        if chapter_ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
            SELECT {} FROM questions
            WHERE is_active AND question_type = $1 AND chapter_id = ANY($2)
              AND chapter_id IN (SELECT id FROM chapters WHERE is_active)
              AND id <> ALL($4)
            ORDER BY random()
            LIMIT $3
            "#,
            QUESTION_COLUMNS
        );
        let items = sqlx::query_as::<_, Question>(&sql)
            .bind(question_type.as_str())
            .bind(chapter_ids)
            .bind(i64::from(limit))
            .bind(exclude)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }
}

fn prepare(payload: CreateQuestionPayload) -> Result<PreparedQuestion> {
    check_marks(payload.marks)?;
    let answer = AnswerData::parse(payload.question_type, &payload.answer_data)
        .map_err(Error::BadRequest)?;
    Ok(PreparedQuestion {
        answer_data: answer.to_value()?,
        payload,
    })
}

async fn insert(conn: &mut sqlx::PgConnection, item: PreparedQuestion) -> Result<Question> {
    let PreparedQuestion {
        payload,
        answer_data,
    } = item;
    let sql = format!(
        r#"
        INSERT INTO questions (
            chapter_id, question_type, difficulty, marks, question_text_en,
            question_text_hi, answer_data, explanation, is_active
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, TRUE))
        RETURNING {}
        "#,
        QUESTION_COLUMNS
    );
    let question = sqlx::query_as::<_, Question>(&sql)
        .bind(payload.chapter_id)
        .bind(payload.question_type.as_str())
        .bind(payload.difficulty.as_str())
        .bind(payload.marks)
        .bind(payload.question_text_en.trim())
        .bind(payload.question_text_hi)
        .bind(answer_data)
        .bind(payload.explanation)
        .bind(payload.is_active)
        .fetch_one(conn)
        .await?;
    Ok(question)
}

fn check_marks(marks: Decimal) -> Result<()> {
    marks::check_marks("marks", marks, MAX_QUESTION_MARKS).map_err(Error::BadRequest)
}

/// Works out the answer data to store after an update, if it changes.
fn resolve_update_answer(
    current: &Question,
    payload: &UpdateQuestionPayload,
) -> Result<Option<JsonValue>> {
    let current_type: QuestionType = current
        .question_type
        .parse()
        .map_err(Error::Internal)?;
    let target_type = payload.question_type.unwrap_or(current_type);

    match &payload.answer_data {
        Some(raw) => {
            let parsed = AnswerData::parse(target_type, raw).map_err(Error::BadRequest)?;
            Ok(Some(parsed.to_value()?))
        }
        None if target_type != current_type => Err(Error::BadRequest(
            "Changing the question type requires new answerData".into(),
        )),
        None => Ok(None),
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &QuestionListQuery) {
    builder.push(" WHERE TRUE");
    if let Some(chapter_id) = query.chapter_id {
        builder.push(" AND chapter_id = ").push_bind(chapter_id);
    }
    if let Some(subject_id) = query.subject_id {
        builder
            .push(" AND chapter_id IN (SELECT id FROM chapters WHERE subject_id = ")
            .push_bind(subject_id)
            .push(")");
    }
    if let Some(question_type) = query.question_type {
        builder
            .push(" AND question_type = ")
            .push_bind(question_type.as_str());
    }
    if let Some(difficulty) = query.difficulty {
        builder.push(" AND difficulty = ").push_bind(difficulty.as_str());
    }
    if let Some(is_active) = query.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (question_text_en ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR question_text_hi ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;
    use chrono::Utc;
    use serde_json::json;

    fn stored(question_type: QuestionType) -> Question {
        Question {
            id: Uuid::new_v4(),
            chapter_id: Uuid::new_v4(),
            question_type: question_type.as_str().to_string(),
            difficulty: Difficulty::Easy.as_str().to_string(),
            marks: Decimal::ONE,
            question_text_en: "Water boils at 100C at sea level.".into(),
            question_text_hi: None,
            answer_data: json!({"correct": true}),
            explanation: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn type_change_without_answer_data_is_rejected() {
        let payload = UpdateQuestionPayload {
            question_type: Some(QuestionType::FillBlank),
            ..Default::default()
        };
        let err = resolve_update_answer(&stored(QuestionType::TrueFalse), &payload).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn answer_data_is_checked_against_the_new_type() {
        let payload = UpdateQuestionPayload {
            question_type: Some(QuestionType::FillBlank),
            answer_data: Some(json!({"answers": ["100"]})),
            ..Default::default()
        };
        let resolved = resolve_update_answer(&stored(QuestionType::TrueFalse), &payload).unwrap();
        assert_eq!(resolved.unwrap()["answers"][0], "100");
    }

    #[test]
    fn untouched_answer_data_stays_none() {
        let payload = UpdateQuestionPayload {
            marks: Some(Decimal::new(2, 0)),
            ..Default::default()
        };
        assert!(resolve_update_answer(&stored(QuestionType::TrueFalse), &payload)
            .unwrap()
            .is_none());
    }

    #[test]
    fn prepare_rejects_non_positive_marks() {
        let payload = CreateQuestionPayload {
            chapter_id: Uuid::new_v4(),
            question_type: QuestionType::TrueFalse,
            difficulty: Difficulty::Easy,
            marks: Decimal::ZERO,
            question_text_en: "?".into(),
            question_text_hi: None,
            answer_data: json!({"correct": true}),
            explanation: None,
            is_active: None,
        };
        assert!(prepare(payload).is_err());
    }

    #[test]
    fn marks_must_fit_the_column() {
        assert!(check_marks(Decimal::new(999_999, 2)).is_ok());
        let err = check_marks(Decimal::new(10_000, 0)).unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg.contains("must not exceed")));
        assert!(check_marks(Decimal::new(1005, 3)).is_err());
    }
}
