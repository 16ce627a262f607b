use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

pub const SCHEDULED_EXAM_COLUMNS: &str = "id, title, structure_id, subject_id, class_level, \
    school_id, scheduled_at, duration_minutes, total_marks, instructions, status, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduledExam {
    pub id: Uuid,
    pub title: String,
    pub structure_id: Option<Uuid>,
    pub subject_id: Uuid,
    pub class_level: i32,
    pub school_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub total_marks: Decimal,
    pub instructions: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    Draft,
    Scheduled,
    Active,
    Completed,
    Archived,
    Cancelled,
}

impl ExamStatus {
    pub const ALL: [ExamStatus; 6] = [
        ExamStatus::Draft,
        ExamStatus::Scheduled,
        ExamStatus::Active,
        ExamStatus::Completed,
        ExamStatus::Archived,
        ExamStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::Draft => "draft",
            ExamStatus::Scheduled => "scheduled",
            ExamStatus::Active => "active",
            ExamStatus::Completed => "completed",
            ExamStatus::Archived => "archived",
            ExamStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: ExamStatus) -> bool {
        use ExamStatus::*;
        matches!(
            (self, next),
            (Draft, Scheduled)
                | (Draft, Cancelled)
                | (Scheduled, Active)
                | (Scheduled, Draft)
                | (Scheduled, Cancelled)
                | (Active, Completed)
                | (Active, Cancelled)
                | (Completed, Archived)
        )
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, ExamStatus::Draft | ExamStatus::Scheduled)
    }

    pub fn is_deletable(&self) -> bool {
        matches!(self, ExamStatus::Draft | ExamStatus::Cancelled)
    }
}

impl FromStr for ExamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExamStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("Unknown exam status: {}", s))
    }
}

impl ScheduledExam {
    pub fn current_status(&self) -> Result<ExamStatus, String> {
        self.status.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_moves_forward() {
        assert!(ExamStatus::Draft.can_transition_to(ExamStatus::Scheduled));
        assert!(ExamStatus::Scheduled.can_transition_to(ExamStatus::Active));
        assert!(ExamStatus::Active.can_transition_to(ExamStatus::Completed));
        assert!(ExamStatus::Completed.can_transition_to(ExamStatus::Archived));
    }

    #[test]
    fn terminal_states_stay_put() {
        for next in ExamStatus::ALL {
            assert!(!ExamStatus::Archived.can_transition_to(next));
            assert!(!ExamStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn cannot_skip_or_reopen() {
        assert!(!ExamStatus::Draft.can_transition_to(ExamStatus::Active));
        assert!(!ExamStatus::Completed.can_transition_to(ExamStatus::Active));
        assert!(!ExamStatus::Completed.can_transition_to(ExamStatus::Cancelled));
        assert!(!ExamStatus::Draft.can_transition_to(ExamStatus::Draft));
    }

    #[test]
    fn only_early_states_are_editable() {
        assert!(ExamStatus::Scheduled.is_editable());
        assert!(!ExamStatus::Active.is_editable());
        assert!(ExamStatus::Cancelled.is_deletable());
        assert!(!ExamStatus::Completed.is_deletable());
    }
}
