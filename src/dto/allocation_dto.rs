use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::exam_structure::ChapterAllocation;
use crate::models::question::QuestionType;
use crate::services::allocation_service::ChapterCapacity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAvailability {
    pub chapter_id: Uuid,
    pub available: u32,
}

impl From<ChapterAvailability> for ChapterCapacity<Uuid> {
    fn from(value: ChapterAvailability) -> Self {
        ChapterCapacity::new(value.chapter_id, value.available)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPreviewPayload {
    #[validate(range(max = 10000))]
    pub required: u32,
    #[serde(default)]
    pub chapters: Vec<ChapterAvailability>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AutoDistributePayload {
    #[validate(range(max = 10000))]
    pub required: u32,
    pub question_type: QuestionType,
    pub chapter_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub required: u32,
    pub allocated: u64,
    pub total_available: u64,
    pub shortfall: u64,
    pub allocations: Vec<ChapterAllocation>,
}

impl AllocationResponse {
    pub fn new(required: u32, total_available: u64, result: Vec<(Uuid, u32)>) -> Self {
        let allocations: Vec<ChapterAllocation> = result
            .into_iter()
            .map(|(chapter_id, count)| ChapterAllocation { chapter_id, count })
            .collect();
        let allocated = allocations.iter().map(|a| u64::from(a.count)).sum();
        Self {
            required,
            allocated,
            total_available,
            shortfall: u64::from(required).saturating_sub(allocated),
            allocations,
        }
    }
}
