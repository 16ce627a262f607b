pub mod allocation_service;
pub mod chapter_service;
pub mod dashboard_service;
pub mod exam_structure_service;
pub mod profile_service;
pub mod question_service;
pub mod scheduled_exam_service;
pub mod school_service;
pub mod section_editor;
pub mod subject_service;
