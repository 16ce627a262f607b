use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::profile::{Profile, Role};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfilePayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    pub role: Role,
    pub school_id: Option<Uuid>,
    #[validate(range(min = 1, max = 12))]
    pub class_level: Option<i32>,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    pub school_id: Option<Uuid>,
    #[validate(range(min = 1, max = 12))]
    pub class_level: Option<i32>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub school_id: Option<Uuid>,
    pub role: Option<Role>,
    pub search: Option<String>,
}

/// Public view of a profile; the password hash never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub school_id: Option<Uuid>,
    pub class_level: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(value: Profile) -> Self {
        Self {
            id: value.id,
            email: value.email,
            full_name: value.full_name,
            role: value.role,
            school_id: value.school_id,
            class_level: value.class_level,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_omits_password_hash() {
        let profile = Profile {
            id: Uuid::new_v4(),
            email: "t@example.com".into(),
            full_name: "Teacher".into(),
            role: "teacher".into(),
            school_id: None,
            class_level: None,
            password_hash: "$argon2id$secret".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&ProfileResponse::from(profile)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"fullName\":\"Teacher\""));
    }

    #[test]
    fn payload_rejects_bad_email_and_short_password() {
        let payload: CreateProfilePayload = serde_json::from_value(serde_json::json!({
            "email": "not-an-email",
            "fullName": "X",
            "role": "student",
            "password": "short"
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
