pub mod allocations;
pub mod chapters;
pub mod dashboard;
pub mod exam_structures;
pub mod health;
pub mod profiles;
pub mod questions;
pub mod scheduled_exams;
pub mod schools;
pub mod subjects;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

/// Every HTTP route of the service, without outer layers.
pub fn router(state: AppState) -> Router {
    let catalogue = Router::new()
        .route(
            "/api/subjects",
            get(subjects::list_subjects).post(subjects::create_subject),
        )
        .route("/api/subjects/tree", get(subjects::subject_tree))
        .route(
            "/api/subjects/:id",
            get(subjects::get_subject)
                .patch(subjects::update_subject)
                .delete(subjects::delete_subject),
        )
        .route(
            "/api/subjects/:id/chapters",
            get(subjects::list_subject_chapters),
        )
        .route(
            "/api/subjects/:id/chapters/order",
            put(subjects::reorder_chapters),
        )
        .route("/api/chapters", post(chapters::create_chapter))
        .route(
            "/api/chapters/auto-distribute",
            post(chapters::auto_distribute),
        )
        .route(
            "/api/chapters/:id",
            get(chapters::get_chapter)
                .patch(chapters::update_chapter)
                .delete(chapters::delete_chapter),
        )
        .route(
            "/api/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route("/api/questions/bulk", post(questions::bulk_create_questions))
        .route(
            "/api/questions/:id",
            get(questions::get_question)
                .patch(questions::update_question)
                .delete(questions::delete_question),
        )
        .route(
            "/api/allocations/preview",
            post(allocations::preview_allocation),
        );

    let exams = Router::new()
        .route(
            "/api/exam-structures",
            get(exam_structures::list_exam_structures)
                .post(exam_structures::create_exam_structure),
        )
        .route(
            "/api/exam-structures/:id",
            get(exam_structures::get_exam_structure)
                .patch(exam_structures::update_exam_structure)
                .delete(exam_structures::delete_exam_structure),
        )
        .route(
            "/api/exam-structures/:id/duplicate",
            post(exam_structures::duplicate_exam_structure),
        )
        .route(
            "/api/exam-structures/:id/draw",
            get(exam_structures::draw_paper),
        )
        .route(
            "/api/scheduled-exams",
            get(scheduled_exams::list_scheduled_exams)
                .post(scheduled_exams::create_scheduled_exam),
        )
        .route(
            "/api/scheduled-exams/:id",
            get(scheduled_exams::get_scheduled_exam)
                .patch(scheduled_exams::update_scheduled_exam)
                .delete(scheduled_exams::delete_scheduled_exam),
        )
        .route(
            "/api/scheduled-exams/:id/status",
            post(scheduled_exams::change_exam_status),
        );

    let people = Router::new()
        .route(
            "/api/schools",
            get(schools::list_schools).post(schools::create_school),
        )
        .route(
            "/api/schools/:id",
            get(schools::get_school)
                .patch(schools::update_school)
                .delete(schools::delete_school),
        )
        .route(
            "/api/profiles",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route(
            "/api/profiles/:id",
            get(profiles::get_profile)
                .patch(profiles::update_profile)
                .delete(profiles::delete_profile),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/api/dashboard/stats", get(dashboard::get_dashboard_stats))
        .merge(catalogue)
        .merge(exams)
        .merge(people)
        .with_state(state)
}
