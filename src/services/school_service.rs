use crate::dto::common_dto::{like_pattern, Page, PageWindow};
use crate::dto::school_dto::{CreateSchoolPayload, SchoolListQuery, UpdateSchoolPayload};
use crate::error::{Error, Result};
use crate::models::school::{School, SCHOOL_COLUMNS};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Clone)]
pub struct SchoolService {
    pool: PgPool,
}

impl SchoolService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateSchoolPayload) -> Result<School> {
        let sql = format!(
            r#"
            INSERT INTO schools (code, name, city, state, board, is_active)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, TRUE))
            RETURNING {}
            "#,
            SCHOOL_COLUMNS
        );
        let school = sqlx::query_as::<_, School>(&sql)
            .bind(payload.code.trim().to_uppercase())
            .bind(payload.name.trim())
            .bind(payload.city)
            .bind(payload.state)
            .bind(payload.board)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(school_id = %school.id, code = %school.code, "school created");
        Ok(school)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<School> {
        let sql = format!("SELECT {} FROM schools WHERE id = $1", SCHOOL_COLUMNS);
        sqlx::query_as::<_, School>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("School {} not found", id)))
    }

    pub async fn update(&self, id: Uuid, payload: UpdateSchoolPayload) -> Result<School> {
        let sql = format!(
            r#"
            UPDATE schools
            SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                board = COALESCE($6, board),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SCHOOL_COLUMNS
        );
        sqlx::query_as::<_, School>(&sql)
            .bind(id)
            .bind(payload.code.map(|c| c.trim().to_uppercase()))
            .bind(payload.name.map(|n| n.trim().to_string()))
            .bind(payload.city)
            .bind(payload.state)
            .bind(payload.board)
            .bind(payload.is_active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("School {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.get_by_id(id).await?;
        let (profiles, exams): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM profiles WHERE school_id = $1),
                (SELECT COUNT(*) FROM scheduled_exams WHERE school_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if profiles > 0 || exams > 0 {
            return Err(Error::Conflict(format!(
                "School still has {} profiles and {} scheduled exams",
                profiles, exams
            )));
        }

        sqlx::query("DELETE FROM schools WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(school_id = %id, "school deleted");
        Ok(())
    }

    pub async fn list(&self, query: SchoolListQuery) -> Result<Page<School>> {
        let window = PageWindow::from_query(query.page, query.per_page);

        let mut items_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM schools", SCHOOL_COLUMNS));
        push_filters(&mut items_query, &query);
        items_query
            .push(" ORDER BY name, code LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset());
        let items = items_query
            .build_query_as::<School>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM schools");
        push_filters(&mut total_query, &query);
        let total = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total, window))
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &SchoolListQuery) {
    builder.push(" WHERE TRUE");
    if let Some(is_active) = query.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR city ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
