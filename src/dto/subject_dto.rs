use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::subject::Subject;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectPayload {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name_en: String,
    #[validate(length(min = 1, max = 200))]
    pub name_hi: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub is_category: bool,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubjectPayload {
    #[validate(length(min = 1, max = 64))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name_en: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name_hi: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_category: Option<bool>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResponse {
    pub id: Uuid,
    pub code: String,
    pub name_en: String,
    pub name_hi: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_category: bool,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category together with the subjects filed under it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTreeNode {
    #[serde(flatten)]
    pub subject: SubjectResponse,
    pub children: Vec<SubjectResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SubjectListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub parent_id: Option<Uuid>,
    pub is_category: Option<bool>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SubjectTreeQuery {
    pub include_inactive: Option<bool>,
}

impl From<Subject> for SubjectResponse {
    fn from(value: Subject) -> Self {
        Self {
            id: value.id,
            code: value.code,
            name_en: value.name_en,
            name_hi: value.name_hi,
            description: value.description,
            icon: value.icon,
            parent_id: value.parent_id,
            is_category: value.is_category,
            display_order: value.display_order,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Groups subjects under their categories. Root-level leaf subjects become
/// childless nodes; subjects whose parent is missing from `subjects` are
/// dropped.
pub fn build_tree(subjects: Vec<Subject>) -> Vec<SubjectTreeNode> {
    let (categories, leaves): (Vec<Subject>, Vec<Subject>) =
        subjects.into_iter().partition(|s| s.is_category);

    let mut nodes: Vec<SubjectTreeNode> = categories
        .into_iter()
        .map(|c| SubjectTreeNode {
            subject: c.into(),
            children: Vec::new(),
        })
        .collect();

    for leaf in leaves {
        if leaf.parent_id.is_none() {
            nodes.push(SubjectTreeNode {
                subject: leaf.into(),
                children: Vec::new(),
            });
            continue;
        }
        let parent = leaf
            .parent_id
            .and_then(|pid| nodes.iter_mut().find(|n| n.subject.id == pid));
        if let Some(node) = parent {
            node.children.push(leaf.into());
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(name: &str, is_category: bool, parent_id: Option<Uuid>) -> Subject {
        Subject {
            id: Uuid::new_v4(),
            code: name.to_lowercase(),
            name_en: name.to_string(),
            name_hi: None,
            description: None,
            icon: None,
            parent_id,
            is_category,
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn response_uses_camel_case_keys() {
        let json = serde_json::to_value(SubjectResponse::from(subject("Maths", false, None)))
            .unwrap();
        assert_eq!(json["nameEn"], "Maths");
        assert!(json.get("name_en").is_none());
        assert_eq!(json["isCategory"], false);
    }

    #[test]
    fn payload_reads_camel_case_keys() {
        let payload: CreateSubjectPayload = serde_json::from_value(serde_json::json!({
            "code": "sci",
            "nameEn": "Science",
            "isCategory": true
        }))
        .unwrap();
        assert!(payload.is_category);
        assert_eq!(payload.name_en, "Science");
    }

    #[test]
    fn tree_groups_children_under_categories() {
        let science = subject("Science", true, None);
        let languages = subject("Languages", true, None);
        let physics = subject("Physics", false, Some(science.id));
        let hindi = subject("Hindi", false, Some(languages.id));
        let orphan = subject("Orphan", false, Some(Uuid::new_v4()));

        let general = subject("General Knowledge", false, None);

        let tree = build_tree(vec![science, physics, languages, hindi, orphan, general]);
        assert_eq!(tree.len(), 3);
        assert!(tree[2].children.is_empty());
        assert_eq!(tree[0].subject.name_en, "Science");
        assert_eq!(tree[0].children[0].name_en, "Physics");
        assert_eq!(tree[1].children[0].name_en, "Hindi");
    }
}
