use crate::dto::dashboard_dto::DashboardStats;
use crate::error::Result;
use sqlx::PgPool;
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let (subjects, categories, chapters, questions, exam_structures, schools): (
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM subjects WHERE NOT is_category),
                (SELECT COUNT(*) FROM subjects WHERE is_category),
                (SELECT COUNT(*) FROM chapters),
                (SELECT COUNT(*) FROM questions),
                (SELECT COUNT(*) FROM exam_structures),
                (SELECT COUNT(*) FROM schools)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            subjects,
            categories,
            chapters,
            questions,
            questions_by_type: self
                .grouped("SELECT question_type, COUNT(*) FROM questions GROUP BY question_type")
                .await?,
            exam_structures,
            scheduled_exams_by_status: self
                .grouped("SELECT status, COUNT(*) FROM scheduled_exams GROUP BY status")
                .await?,
            schools,
            profiles_by_role: self
                .grouped("SELECT role, COUNT(*) FROM profiles GROUP BY role")
                .await?,
        })
    }

    async fn grouped(&self, sql: &str) -> Result<BTreeMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().collect())
    }
}
