pub mod allocation_dto;
pub mod chapter_dto;
pub mod common_dto;
pub mod dashboard_dto;
pub mod exam_structure_dto;
pub mod profile_dto;
pub mod question_dto;
pub mod scheduled_exam_dto;
pub mod school_dto;
pub mod subject_dto;
