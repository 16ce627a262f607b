use crate::dto::common_dto::{like_pattern, Page, PageWindow};
use crate::dto::profile_dto::{CreateProfilePayload, ProfileListQuery, UpdateProfilePayload};
use crate::error::{Error, Result};
use crate::models::profile::{Profile, Role, PROFILE_COLUMNS};
use crate::utils::crypto::hash_password;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateProfilePayload) -> Result<Profile> {
        check_membership(payload.role, payload.school_id, payload.class_level)?;
        let email = normalize_email(&payload.email);
        let password_hash = hash_in_background(payload.password).await?;

        let sql = format!(
            r#"
            INSERT INTO profiles (email, full_name, role, school_id, class_level, password_hash, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, TRUE))
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(&email)
            .bind(payload.full_name.trim())
            .bind(payload.role.as_str())
            .bind(payload.school_id)
            .bind(payload.class_level)
            .bind(password_hash)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(profile_id = %profile.id, role = %profile.role, "profile created");
        Ok(profile)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Profile> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Profile {} not found", id)))
    }

    pub async fn update(&self, id: Uuid, payload: UpdateProfilePayload) -> Result<Profile> {
        let current = self.get_by_id(id).await?;
        let role: Role = current.role.parse().map_err(Error::Internal)?;
        check_membership(
            role,
            payload.school_id.or(current.school_id),
            payload.class_level.or(current.class_level),
        )?;

        let password_hash = match payload.password {
            Some(password) => Some(hash_in_background(password).await?),
            None => None,
        };

        let sql = format!(
            r#"
            UPDATE profiles
            SET
                full_name = COALESCE($2, full_name),
                school_id = COALESCE($3, school_id),
                class_level = COALESCE($4, class_level),
                password_hash = COALESCE($5, password_hash),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(payload.full_name.map(|n| n.trim().to_string()))
            .bind(payload.school_id)
            .bind(payload.class_level)
            .bind(password_hash)
            .bind(payload.is_active)
            .fetch_one(&self.pool)
            .await?;

        Ok(profile)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Profile {} not found", id)));
        }
        Ok(())
    }

    pub async fn list(&self, query: ProfileListQuery) -> Result<Page<Profile>> {
        let window = PageWindow::from_query(query.page, query.per_page);

        let mut items_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM profiles", PROFILE_COLUMNS));
        push_filters(&mut items_query, &query);
        items_query
            .push(" ORDER BY full_name, email LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset());
        let items = items_query
            .build_query_as::<Profile>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM profiles");
        push_filters(&mut total_query, &query);
        let total = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total, window))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_membership(role: Role, school_id: Option<Uuid>, class_level: Option<i32>) -> Result<()> {
    if role.requires_school() && school_id.is_none() {
        return Err(Error::BadRequest(format!(
            "A {} profile needs a schoolId",
            role.as_str()
        )));
    }
    if class_level.is_some() && role != Role::Student {
        return Err(Error::BadRequest(
            "classLevel only applies to students".into(),
        ));
    }
    Ok(())
}

async fn hash_in_background(password: String) -> Result<String> {
    let hashed = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::Internal(format!("password hashing task failed: {}", e)))??;
    Ok(hashed)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ProfileListQuery) {
    builder.push(" WHERE TRUE");
    if let Some(school_id) = query.school_id {
        builder.push(" AND school_id = ").push_bind(school_id);
    }
    if let Some(role) = query.role {
        builder.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_lower_cased() {
        assert_eq!(normalize_email("  Ravi.Kumar@School.IN "), "ravi.kumar@school.in");
    }

    #[test]
    fn teachers_and_students_need_a_school() {
        assert!(check_membership(Role::Admin, None, None).is_ok());
        assert!(check_membership(Role::Teacher, None, None).is_err());
        assert!(check_membership(Role::Student, None, Some(8)).is_err());
        assert!(check_membership(Role::Student, Some(Uuid::new_v4()), Some(8)).is_ok());
    }

    #[test]
    fn class_level_is_for_students_only() {
        let school = Some(Uuid::new_v4());
        assert!(check_membership(Role::Teacher, school, Some(10)).is_err());
        assert!(check_membership(Role::Admin, None, Some(10)).is_err());
    }

    #[tokio::test]
    async fn background_hash_is_argon2() {
        let hashed = hash_in_background("changeme123".into()).await.unwrap();
        assert!(hashed.starts_with("$argon2"));
    }
}
