//! Demo data for a fresh install. Every insert is keyed on a natural key so
//! running the seed twice leaves the database unchanged.

use crate::error::Result;
use crate::models::question::{Difficulty, QuestionType};
use crate::utils::crypto::hash_password;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

/// Rows inserted by one seeding run, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub schools: u64,
    pub profiles: u64,
    pub subjects: u64,
    pub chapters: u64,
    pub questions: u64,
}

struct SeedSchool {
    code: &'static str,
    name: &'static str,
    city: &'static str,
    state: &'static str,
    board: &'static str,
}

struct SeedProfile {
    email: &'static str,
    full_name: &'static str,
    role: &'static str,
    school_code: Option<&'static str>,
    class_level: Option<i32>,
}

struct SeedSubject {
    code: &'static str,
    name_en: &'static str,
    name_hi: &'static str,
    icon: &'static str,
    parent_code: Option<&'static str>,
    is_category: bool,
    display_order: i32,
}

struct SeedChapter {
    subject_code: &'static str,
    number: i32,
    name_en: &'static str,
    name_hi: &'static str,
}

struct SeedQuestion {
    subject_code: &'static str,
    chapter_number: i32,
    question_type: QuestionType,
    difficulty: Difficulty,
    marks: i64,
    text_en: &'static str,
    answer: fn() -> JsonValue,
}

const SCHOOLS: &[SeedSchool] = &[
    SeedSchool {
        code: "DPS-DEL",
        name: "Delhi Public School",
        city: "New Delhi",
        state: "Delhi",
        board: "CBSE",
    },
    SeedSchool {
        code: "KV-BLR",
        name: "Kendriya Vidyalaya Bengaluru",
        city: "Bengaluru",
        state: "Karnataka",
        board: "CBSE",
    },
];

const PROFILES: &[SeedProfile] = &[
    SeedProfile {
        email: "admin@examdesk.local",
        full_name: "Platform Admin",
        role: "admin",
        school_code: None,
        class_level: None,
    },
    SeedProfile {
        email: "teacher@examdesk.local",
        full_name: "Anita Sharma",
        role: "teacher",
        school_code: Some("DPS-DEL"),
        class_level: None,
    },
    SeedProfile {
        email: "student@examdesk.local",
        full_name: "Rahul Verma",
        role: "student",
        school_code: Some("DPS-DEL"),
        class_level: Some(9),
    },
];

// Parents come before their children.
const SUBJECTS: &[SeedSubject] = &[
    SeedSubject {
        code: "sciences",
        name_en: "Sciences",
        name_hi: "विज्ञान",
        icon: "flask",
        parent_code: None,
        is_category: true,
        display_order: 1,
    },
    SeedSubject {
        code: "languages",
        name_en: "Languages",
        name_hi: "भाषाएँ",
        icon: "book",
        parent_code: None,
        is_category: true,
        display_order: 2,
    },
    SeedSubject {
        code: "mathematics",
        name_en: "Mathematics",
        name_hi: "गणित",
        icon: "calculator",
        parent_code: None,
        is_category: false,
        display_order: 3,
    },
    SeedSubject {
        code: "physics",
        name_en: "Physics",
        name_hi: "भौतिकी",
        icon: "atom",
        parent_code: Some("sciences"),
        is_category: false,
        display_order: 1,
    },
    SeedSubject {
        code: "chemistry",
        name_en: "Chemistry",
        name_hi: "रसायन विज्ञान",
        icon: "beaker",
        parent_code: Some("sciences"),
        is_category: false,
        display_order: 2,
    },
    SeedSubject {
        code: "english",
        name_en: "English",
        name_hi: "अंग्रेज़ी",
        icon: "type",
        parent_code: Some("languages"),
        is_category: false,
        display_order: 1,
    },
    SeedSubject {
        code: "computer-science",
        name_en: "Computer Science",
        name_hi: "कंप्यूटर विज्ञान",
        icon: "cpu",
        parent_code: Some("sciences"),
        is_category: false,
        display_order: 3,
    },
];

const CHAPTERS: &[SeedChapter] = &[
    SeedChapter { subject_code: "physics", number: 1, name_en: "Motion", name_hi: "गति" },
    SeedChapter { subject_code: "physics", number: 2, name_en: "Force and Laws of Motion", name_hi: "बल तथा गति के नियम" },
    SeedChapter { subject_code: "physics", number: 3, name_en: "Gravitation", name_hi: "गुरुत्वाकर्षण" },
    SeedChapter { subject_code: "chemistry", number: 1, name_en: "Matter in Our Surroundings", name_hi: "हमारे आस-पास के पदार्थ" },
    SeedChapter { subject_code: "chemistry", number: 2, name_en: "Atoms and Molecules", name_hi: "परमाणु एवं अणु" },
    SeedChapter { subject_code: "mathematics", number: 1, name_en: "Number Systems", name_hi: "संख्या पद्धति" },
    SeedChapter { subject_code: "mathematics", number: 2, name_en: "Polynomials", name_hi: "बहुपद" },
    SeedChapter { subject_code: "mathematics", number: 3, name_en: "Linear Equations in Two Variables", name_hi: "दो चरों वाले रैखिक समीकरण" },
    SeedChapter { subject_code: "english", number: 1, name_en: "Tenses", name_hi: "काल" },
    SeedChapter { subject_code: "computer-science", number: 1, name_en: "Programming Basics", name_hi: "प्रोग्रामिंग की मूल बातें" },
];

const QUESTIONS: &[SeedQuestion] = &[
    SeedQuestion {
        subject_code: "physics",
        chapter_number: 1,
        question_type: QuestionType::SingleMcq,
        difficulty: Difficulty::Easy,
        marks: 1,
        text_en: "What is the SI unit of velocity?",
        answer: || {
            json!({"options": [
                {"textEn": "m/s", "isCorrect": true},
                {"textEn": "m/s²", "isCorrect": false},
                {"textEn": "km", "isCorrect": false},
                {"textEn": "N", "isCorrect": false}
            ]})
        },
    },
    SeedQuestion {
        subject_code: "physics",
        chapter_number: 1,
        question_type: QuestionType::TrueFalse,
        difficulty: Difficulty::Easy,
        marks: 1,
        text_en: "A body moving in a circle at constant speed has zero acceleration.",
        answer: || json!({"correct": false}),
    },
    SeedQuestion {
        subject_code: "physics",
        chapter_number: 1,
        question_type: QuestionType::FillBlank,
        difficulty: Difficulty::Medium,
        marks: 1,
        text_en: "The slope of a distance-time graph gives the ____.",
        answer: || json!({"answers": ["speed"], "caseSensitive": false}),
    },
    SeedQuestion {
        subject_code: "physics",
        chapter_number: 2,
        question_type: QuestionType::SingleMcq,
        difficulty: Difficulty::Medium,
        marks: 1,
        text_en: "Which law explains the recoil of a gun?",
        answer: || {
            json!({"options": [
                {"textEn": "Newton's first law", "isCorrect": false},
                {"textEn": "Newton's second law", "isCorrect": false},
                {"textEn": "Newton's third law", "isCorrect": true}
            ]})
        },
    },
    SeedQuestion {
        subject_code: "physics",
        chapter_number: 2,
        question_type: QuestionType::ShortAnswer,
        difficulty: Difficulty::Medium,
        marks: 2,
        text_en: "State Newton's second law of motion.",
        answer: || {
            json!({
                "modelAnswer": "The rate of change of momentum is proportional to the applied force.",
                "keywords": ["momentum", "force", "proportional"],
                "wordLimit": 50
            })
        },
    },
    SeedQuestion {
        subject_code: "physics",
        chapter_number: 3,
        question_type: QuestionType::LongAnswer,
        difficulty: Difficulty::Hard,
        marks: 5,
        text_en: "Derive the relation between g and G.",
        answer: || json!({"keywords": ["mass of earth", "radius"], "wordLimit": 300}),
    },
    SeedQuestion {
        subject_code: "chemistry",
        chapter_number: 1,
        question_type: QuestionType::Match,
        difficulty: Difficulty::Easy,
        marks: 2,
        text_en: "Match each process with the change of state.",
        answer: || {
            json!({"pairs": [
                {"left": "Melting", "right": "Solid to liquid"},
                {"left": "Evaporation", "right": "Liquid to gas"},
                {"left": "Sublimation", "right": "Solid to gas"}
            ]})
        },
    },
    SeedQuestion {
        subject_code: "chemistry",
        chapter_number: 2,
        question_type: QuestionType::MultiMcq,
        difficulty: Difficulty::Medium,
        marks: 2,
        text_en: "Which of these are polyatomic ions?",
        answer: || {
            json!({"options": [
                {"textEn": "SO4 2-", "isCorrect": true},
                {"textEn": "NH4 +", "isCorrect": true},
                {"textEn": "Na +", "isCorrect": false}
            ]})
        },
    },
    SeedQuestion {
        subject_code: "mathematics",
        chapter_number: 1,
        question_type: QuestionType::TrueFalse,
        difficulty: Difficulty::Easy,
        marks: 1,
        text_en: "Every rational number is a real number.",
        answer: || json!({"correct": true}),
    },
    SeedQuestion {
        subject_code: "mathematics",
        chapter_number: 2,
        question_type: QuestionType::FillBlank,
        difficulty: Difficulty::Medium,
        marks: 1,
        text_en: "The degree of the polynomial 4x³ + 2x + 7 is ____.",
        answer: || json!({"answers": ["3", "three"]}),
    },
    SeedQuestion {
        subject_code: "mathematics",
        chapter_number: 3,
        question_type: QuestionType::SingleMcq,
        difficulty: Difficulty::Medium,
        marks: 1,
        text_en: "How many solutions does the equation y = 3x + 5 have?",
        answer: || {
            json!({"options": [
                {"textEn": "Exactly one", "isCorrect": false},
                {"textEn": "Exactly two", "isCorrect": false},
                {"textEn": "Infinitely many", "isCorrect": true}
            ]})
        },
    },
    SeedQuestion {
        subject_code: "english",
        chapter_number: 1,
        question_type: QuestionType::FillBlank,
        difficulty: Difficulty::Easy,
        marks: 1,
        text_en: "She ____ (go) to school every day.",
        answer: || json!({"answers": ["goes"], "caseSensitive": false}),
    },
    SeedQuestion {
        subject_code: "computer-science",
        chapter_number: 1,
        question_type: QuestionType::Programming,
        difficulty: Difficulty::Medium,
        marks: 5,
        text_en: "Write a program that prints the sum of two integers read from input.",
        answer: || {
            json!({
                "language": "python",
                "starterCode": "a, b = map(int, input().split())\n",
                "testCases": [
                    {"input": "2 3", "expectedOutput": "5"},
                    {"input": "-4 4", "expectedOutput": "0"}
                ]
            })
        },
    },
];

/// Inserts the demo data in dependency order inside one transaction.
pub async fn seed_demo_data(pool: &PgPool, default_password: &str) -> Result<SeedReport> {
    let password_hash = hash_password(default_password)?;
    let mut report = SeedReport::default();
    let mut tx = pool.begin().await?;

    for school in SCHOOLS {
        report.schools += sqlx::query(
            r#"
            INSERT INTO schools (code, name, city, state, board)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(school.code)
        .bind(school.name)
        .bind(school.city)
        .bind(school.state)
        .bind(school.board)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for profile in PROFILES {
        report.profiles += sqlx::query(
            r#"
            INSERT INTO profiles (email, full_name, role, school_id, class_level, password_hash)
            VALUES ($1, $2, $3, (SELECT id FROM schools WHERE code = $4), $5, $6)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(profile.email)
        .bind(profile.full_name)
        .bind(profile.role)
        .bind(profile.school_code)
        .bind(profile.class_level)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for subject in SUBJECTS {
        report.subjects += sqlx::query(
            r#"
            INSERT INTO subjects (code, name_en, name_hi, icon, parent_id, is_category, display_order)
            VALUES ($1, $2, $3, $4, (SELECT id FROM subjects WHERE code = $5), $6, $7)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(subject.code)
        .bind(subject.name_en)
        .bind(subject.name_hi)
        .bind(subject.icon)
        .bind(subject.parent_code)
        .bind(subject.is_category)
        .bind(subject.display_order)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    // The chapter number key is deferrable, so it cannot arbitrate ON CONFLICT.
    for chapter in CHAPTERS {
        report.chapters += sqlx::query(
            r#"
            INSERT INTO chapters (subject_id, chapter_number, name_en, name_hi)
            SELECT s.id, $2, $3, $4 FROM subjects s
            WHERE s.code = $1
              AND NOT EXISTS (
                  SELECT 1 FROM chapters c WHERE c.subject_id = s.id AND c.chapter_number = $2
              )
            "#,
        )
        .bind(chapter.subject_code)
        .bind(chapter.number)
        .bind(chapter.name_en)
        .bind(chapter.name_hi)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for question in QUESTIONS {
        report.questions += sqlx::query(
            r#"
            INSERT INTO questions (chapter_id, question_type, difficulty, marks, question_text_en, answer_data)
            SELECT c.id, $3, $4, $5, $6, $7
            FROM chapters c JOIN subjects s ON s.id = c.subject_id
            WHERE s.code = $1 AND c.chapter_number = $2
              AND NOT EXISTS (
                  SELECT 1 FROM questions q
                  WHERE q.chapter_id = c.id AND q.question_text_en = $6
              )
            "#,
        )
        .bind(question.subject_code)
        .bind(question.chapter_number)
        .bind(question.question_type.as_str())
        .bind(question.difficulty.as_str())
        .bind(Decimal::from(question.marks))
        .bind(question.text_en)
        .bind((question.answer)())
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    tracing::info!(
        schools = report.schools,
        profiles = report.profiles,
        subjects = report.subjects,
        chapters = report.chapters,
        questions = report.questions,
        "demo data seeded"
    );
    Ok(report)
}
