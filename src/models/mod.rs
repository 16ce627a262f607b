pub mod chapter;
pub mod exam_structure;
pub mod profile;
pub mod question;
pub mod scheduled_exam;
pub mod school;
pub mod subject;
