use crate::dto::common_dto::{like_pattern, Page, PageWindow};
use crate::dto::subject_dto::{
    build_tree, CreateSubjectPayload, SubjectListQuery, SubjectTreeNode, UpdateSubjectPayload,
};
use crate::error::{Error, Result};
use crate::models::subject::{Subject, SUBJECT_COLUMNS};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Clone)]
pub struct SubjectService {
    pool: PgPool,
}

impl SubjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateSubjectPayload) -> Result<Subject> {
        if let Some(parent_id) = payload.parent_id {
            self.ensure_category_parent(parent_id).await?;
        }

        let sql = format!(
            r#"
            INSERT INTO subjects (
                code, name_en, name_hi, description, icon,
                parent_id, is_category, display_order, is_active
            ) VALUES (
                $1, $2, $3, $4, $5,
                $6, $7,
                COALESCE($8, (SELECT COALESCE(MAX(display_order), 0) + 1
                              FROM subjects WHERE parent_id IS NOT DISTINCT FROM $6)),
                COALESCE($9, TRUE)
            )
            RETURNING {}
            "#,
            SUBJECT_COLUMNS
        );
        let subject = sqlx::query_as::<_, Subject>(&sql)
            .bind(payload.code.trim().to_lowercase())
            .bind(payload.name_en.trim())
            .bind(payload.name_hi)
            .bind(payload.description)
            .bind(payload.icon)
            .bind(payload.parent_id)
            .bind(payload.is_category)
            .bind(payload.display_order)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(subject_id = %subject.id, code = %subject.code, "subject created");
        Ok(subject)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Subject> {
        let sql = format!("SELECT {} FROM subjects WHERE id = $1", SUBJECT_COLUMNS);
        sqlx::query_as::<_, Subject>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Subject {} not found", id)))
    }

    pub async fn update(&self, id: Uuid, payload: UpdateSubjectPayload) -> Result<Subject> {
        let current = self.get_by_id(id).await?;

        if let Some(parent_id) = payload.parent_id {
            if parent_id == id {
                return Err(Error::BadRequest("A subject cannot be its own parent".into()));
            }
            self.ensure_category_parent(parent_id).await?;
            if self.is_ancestor(id, parent_id).await? {
                return Err(Error::BadRequest(
                    "Moving the subject there would create a cycle".into(),
                ));
            }
        }

        match payload.is_category {
            Some(false) if current.is_category => {
                if self.count_children(id).await? > 0 {
                    return Err(Error::Conflict(
                        "Category still has subjects filed under it".into(),
                    ));
                }
            }
            Some(true) if !current.is_category => {
                if self.count_chapters(id).await? > 0 {
                    return Err(Error::Conflict(
                        "Subject with chapters cannot become a category".into(),
                    ));
                }
            }
            _ => {}
        }

        let sql = format!(
            r#"
            UPDATE subjects
            SET
                code = COALESCE($2, code),
                name_en = COALESCE($3, name_en),
                name_hi = COALESCE($4, name_hi),
                description = COALESCE($5, description),
                icon = COALESCE($6, icon),
                parent_id = COALESCE($7, parent_id),
                is_category = COALESCE($8, is_category),
                display_order = COALESCE($9, display_order),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SUBJECT_COLUMNS
        );
        let subject = sqlx::query_as::<_, Subject>(&sql)
            .bind(id)
            .bind(payload.code.map(|c| c.trim().to_lowercase()))
            .bind(payload.name_en.map(|n| n.trim().to_string()))
            .bind(payload.name_hi)
            .bind(payload.description)
            .bind(payload.icon)
            .bind(payload.parent_id)
            .bind(payload.is_category)
            .bind(payload.display_order)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        Ok(subject)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.get_by_id(id).await?;
        if self.count_children(id).await? > 0 {
            return Err(Error::Conflict(
                "Subject still has child subjects".into(),
            ));
        }
        if self.count_chapters(id).await? > 0 {
            return Err(Error::Conflict("Subject still has chapters".into()));
        }

        sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(subject_id = %id, "subject deleted");
        Ok(())
    }

    pub async fn list(&self, query: SubjectListQuery) -> Result<Page<Subject>> {
        let window = PageWindow::from_query(query.page, query.per_page);

        let mut items_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM subjects", SUBJECT_COLUMNS));
        push_filters(&mut items_query, &query);
        items_query
            .push(" ORDER BY display_order, name_en LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset());
        let items = items_query
            .build_query_as::<Subject>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM subjects");
        push_filters(&mut total_query, &query);
        let total: i64 = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total, window))
    }

    pub async fn tree(&self, include_inactive: bool) -> Result<Vec<SubjectTreeNode>> {
        let sql = format!(
            "SELECT {} FROM subjects WHERE ($1 OR is_active) ORDER BY display_order, name_en",
            SUBJECT_COLUMNS
        );
        let subjects = sqlx::query_as::<_, Subject>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(build_tree(subjects))
    }

    async fn ensure_category_parent(&self, parent_id: Uuid) -> Result<()> {
        let parent = self.get_by_id(parent_id).await.map_err(|e| match e {
            Error::NotFound(_) => Error::BadRequest(format!("Parent subject {} does not exist", parent_id)),
            other => other,
        })?;
        if !parent.is_category {
            return Err(Error::BadRequest(format!(
                "Parent subject {} is not a category",
                parent.code
            )));
        }
        Ok(())
    }

    /// True when `ancestor` appears on the parent chain of `start`.
    async fn is_ancestor(&self, ancestor: Uuid, start: Uuid) -> Result<bool> {
        let found: bool = sqlx::query_scalar(
            r#"
            WITH RECURSIVE chain AS (
                SELECT id, parent_id, 0 AS depth FROM subjects WHERE id = $1
                UNION ALL
                SELECT s.id, s.parent_id, chain.depth + 1
                FROM subjects s JOIN chain ON s.id = chain.parent_id
                WHERE chain.depth < 64
            )
            SELECT EXISTS(SELECT 1 FROM chain WHERE id = $2)
            "#,
        )
        .bind(start)
        .bind(ancestor)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    async fn count_children(&self, id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_chapters(&self, id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chapters WHERE subject_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &SubjectListQuery) {
    builder.push(" WHERE TRUE");
    if let Some(parent_id) = query.parent_id {
        builder.push(" AND parent_id = ").push_bind(parent_id);
    }
    if let Some(is_category) = query.is_category {
        builder.push(" AND is_category = ").push_bind(is_category);
    }
    if let Some(is_active) = query.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name_en ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name_hi ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR code ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
