use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub subjects: i64,
    pub categories: i64,
    pub chapters: i64,
    pub questions: i64,
    pub questions_by_type: BTreeMap<String, i64>,
    pub exam_structures: i64,
    pub scheduled_exams_by_status: BTreeMap<String, i64>,
    pub schools: i64,
    pub profiles_by_role: BTreeMap<String, i64>,
}
