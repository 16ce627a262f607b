pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    chapter_service::ChapterService, dashboard_service::DashboardService,
    exam_structure_service::ExamStructureService, profile_service::ProfileService,
    question_service::QuestionService, scheduled_exam_service::ScheduledExamService,
    school_service::SchoolService, subject_service::SubjectService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub subject_service: SubjectService,
    pub chapter_service: ChapterService,
    pub question_service: QuestionService,
    pub exam_structure_service: ExamStructureService,
    pub scheduled_exam_service: ScheduledExamService,
    pub school_service: SchoolService,
    pub profile_service: ProfileService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let subject_service = SubjectService::new(pool.clone());
        let chapter_service = ChapterService::new(pool.clone());
        let question_service = QuestionService::new(pool.clone());
        let exam_structure_service = ExamStructureService::new(
            pool.clone(),
            chapter_service.clone(),
            question_service.clone(),
        );
        let scheduled_exam_service = ScheduledExamService::new(pool.clone());
        let school_service = SchoolService::new(pool.clone());
        let profile_service = ProfileService::new(pool.clone());
        let dashboard_service = DashboardService::new(pool.clone());

        Self {
            pool,
            subject_service,
            chapter_service,
            question_service,
            exam_structure_service,
            scheduled_exam_service,
            school_service,
            profile_service,
            dashboard_service,
        }
    }
}
