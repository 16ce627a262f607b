use crate::dto::allocation_dto::{AllocationResponse, AutoDistributePayload};
use crate::dto::chapter_dto::{
    ChapterListQuery, ChapterWithCounts, CreateChapterPayload, UpdateChapterPayload,
};
use crate::dto::common_dto::like_pattern;
use crate::error::{Error, Result};
use crate::models::chapter::{Chapter, ChapterTypeCount, CHAPTER_COLUMNS};
use crate::models::question::QuestionType;
use crate::services::allocation_service::{AllocationService, ChapterCapacity};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

#[derive(Clone)]
pub struct ChapterService {
    pool: PgPool,
}

impl ChapterService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateChapterPayload) -> Result<ChapterWithCounts> {
        let is_category: Option<bool> =
            sqlx::query_scalar("SELECT is_category FROM subjects WHERE id = $1")
                .bind(payload.subject_id)
                .fetch_optional(&self.pool)
                .await?;
        match is_category {
            None => {
                return Err(Error::BadRequest(format!(
                    "Subject {} does not exist",
                    payload.subject_id
                )))
            }
            Some(true) => {
                return Err(Error::BadRequest(
                    "Chapters belong to subjects, not categories".into(),
                ))
            }
            Some(false) => {}
        }

        let sql = format!(
            r#"
            INSERT INTO chapters (subject_id, chapter_number, name_en, name_hi, description, is_active)
            VALUES (
                $1,
                COALESCE($2, (SELECT COALESCE(MAX(chapter_number), 0) + 1 FROM chapters WHERE subject_id = $1)),
                $3, $4, $5, COALESCE($6, TRUE)
            )
            RETURNING {}
            "#,
            CHAPTER_COLUMNS
        );
        let chapter = sqlx::query_as::<_, Chapter>(&sql)
            .bind(payload.subject_id)
            .bind(payload.chapter_number)
            .bind(payload.name_en.trim())
            .bind(payload.name_hi)
            .bind(payload.description)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(chapter_id = %chapter.id, subject_id = %chapter.subject_id, "chapter created");
        Ok(ChapterWithCounts {
            chapter,
            counts: BTreeMap::new(),
        })
    }

    pub async fn fetch(&self, id: Uuid) -> Result<Chapter> {
        let sql = format!("SELECT {} FROM chapters WHERE id = $1", CHAPTER_COLUMNS);
        sqlx::query_as::<_, Chapter>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Chapter {} not found", id)))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ChapterWithCounts> {
        let chapter = self.fetch(id).await?;
        let mut counts = self.question_counts(&[id]).await?;
        Ok(ChapterWithCounts {
            counts: counts.remove(&id).unwrap_or_default(),
            chapter,
        })
    }

    pub async fn update(&self, id: Uuid, payload: UpdateChapterPayload) -> Result<ChapterWithCounts> {
        self.fetch(id).await?;

        let sql = format!(
            r#"
            UPDATE chapters
            SET
                chapter_number = COALESCE($2, chapter_number),
                name_en = COALESCE($3, name_en),
                name_hi = COALESCE($4, name_hi),
                description = COALESCE($5, description),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CHAPTER_COLUMNS
        );
        sqlx::query_as::<_, Chapter>(&sql)
            .bind(id)
            .bind(payload.chapter_number)
            .bind(payload.name_en.map(|n| n.trim().to_string()))
            .bind(payload.name_hi)
            .bind(payload.description)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.fetch(id).await?;
        let questions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE chapter_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if questions > 0 {
            return Err(Error::Conflict(format!(
                "Chapter still has {} questions",
                questions
            )));
        }

        sqlx::query("DELETE FROM chapters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_by_subject(
        &self,
        subject_id: Uuid,
        query: ChapterListQuery,
    ) -> Result<Vec<ChapterWithCounts>> {
        let sql = format!(
            r#"
            SELECT {} FROM chapters
            WHERE subject_id = $1
              AND ($2::BOOLEAN IS NULL OR is_active = $2)
              AND ($3::TEXT IS NULL OR name_en ILIKE $3 OR name_hi ILIKE $3)
            ORDER BY chapter_number
            "#,
            CHAPTER_COLUMNS
        );
        let chapters = sqlx::query_as::<_, Chapter>(&sql)
            .bind(subject_id)
            .bind(query.is_active)
            .bind(
                query
                    .search
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .map(like_pattern),
            )
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = chapters.iter().map(|c| c.id).collect();
        let mut counts = self.question_counts(&ids).await?;
        Ok(chapters
            .into_iter()
            .map(|chapter| ChapterWithCounts {
                counts: counts.remove(&chapter.id).unwrap_or_default(),
                chapter,
            })
            .collect())
    }

    /// Renumbers a subject's chapters 1..n in the given order.
    pub async fn reorder(&self, subject_id: Uuid, chapter_ids: Vec<Uuid>) -> Result<Vec<ChapterWithCounts>> {
        let existing: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM chapters WHERE subject_id = $1")
                .bind(subject_id)
                .fetch_all(&self.pool)
                .await?;
        check_reorder_ids(&existing, &chapter_ids)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET CONSTRAINTS chapters_subject_number_key DEFERRED")
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            UPDATE chapters c
            SET chapter_number = ordered.position, updated_at = NOW()
            FROM unnest($1::UUID[]) WITH ORDINALITY AS ordered(id, position)
            WHERE c.id = ordered.id AND c.subject_id = $2
            "#,
        )
        .bind(&chapter_ids)
        .bind(subject_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(subject_id = %subject_id, chapters = chapter_ids.len(), "chapters reordered");
        self.list_by_subject(subject_id, ChapterListQuery::default())
            .await
    }

    /// Active question counts per chapter and type.
    pub async fn question_counts(
        &self,
        chapter_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, BTreeMap<QuestionType, i64>>> {
        if chapter_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, ChapterTypeCount>(
            r#"
            SELECT chapter_id, question_type, COUNT(*) AS total
            FROM questions
            WHERE is_active AND chapter_id = ANY($1)
            GROUP BY chapter_id, question_type
            "#,
        )
        .bind(chapter_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut out: HashMap<Uuid, BTreeMap<QuestionType, i64>> = HashMap::new();
        for row in rows {
            match row.question_type.parse::<QuestionType>() {
                Ok(kind) => {
                    out.entry(row.chapter_id).or_default().insert(kind, row.total);
                }
                Err(e) => tracing::warn!(chapter_id = %row.chapter_id, "skipping count row: {}", e),
            }
        }
        Ok(out)
    }

    /// Per-chapter availability of one question type, in the order given.
    /// Every chapter must be active and, with `subject_id`, belong to that
    /// subject.
    pub async fn availability(
        &self,
        subject_id: Option<Uuid>,
        chapter_ids: &[Uuid],
        question_type: QuestionType,
    ) -> Result<Vec<ChapterCapacity<Uuid>>> {
        if chapter_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(Uuid, Uuid, bool)> =
            sqlx::query_as("SELECT id, subject_id, is_active FROM chapters WHERE id = ANY($1)")
                .bind(chapter_ids)
                .fetch_all(&self.pool)
                .await?;
        check_chapter_rows(subject_id, chapter_ids, &rows)?;

        let counts = self.question_counts(chapter_ids).await?;
        Ok(chapter_ids
            .iter()
            .map(|id| {
                let available = counts
                    .get(id)
                    .and_then(|by_type| by_type.get(&question_type))
                    .copied()
                    .unwrap_or(0);
                ChapterCapacity::new(*id, u32::try_from(available).unwrap_or(u32::MAX))
            })
            .collect())
    }

    pub async fn auto_distribute(&self, payload: AutoDistributePayload) -> Result<AllocationResponse> {
        let mut seen = HashSet::new();
        if let Some(dup) = payload.chapter_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(Error::BadRequest(format!("Chapter {} is listed twice", dup)));
        }
        let capacities = self
            .availability(None, &payload.chapter_ids, payload.question_type)
            .await?;
        let total = AllocationService::total_available(&capacities);
        let result = AllocationService::distribute(payload.required, &capacities);
        Ok(AllocationResponse::new(payload.required, total, result))
    }
}

fn check_chapter_rows(
    subject_id: Option<Uuid>,
    chapter_ids: &[Uuid],
    rows: &[(Uuid, Uuid, bool)],
) -> Result<()> {
    let found: HashMap<Uuid, (Uuid, bool)> = rows
        .iter()
        .map(|&(id, owner, active)| (id, (owner, active)))
        .collect();
    for id in chapter_ids {
        match found.get(id) {
            None => return Err(Error::BadRequest(format!("Chapter {} does not exist", id))),
            Some((owner, _)) if subject_id.is_some_and(|s| s != *owner) => {
                return Err(Error::BadRequest(format!(
                    "Chapter {} belongs to a different subject",
                    id
                )))
            }
            Some((_, false)) => {
                return Err(Error::BadRequest(format!("Chapter {} is inactive", id)))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn check_reorder_ids(existing: &[Uuid], requested: &[Uuid]) -> Result<()> {
    let existing: HashSet<&Uuid> = existing.iter().collect();
    let requested_set: HashSet<&Uuid> = requested.iter().collect();
    if requested_set.len() != requested.len() {
        return Err(Error::BadRequest("Chapter ids must be unique".into()));
    }
    if existing != requested_set {
        return Err(Error::BadRequest(
            "Chapter ids must list every chapter of the subject exactly once".into(),
        ));
    }
    Ok(())
}
