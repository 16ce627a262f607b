use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

pub const QUESTION_COLUMNS: &str = "id, chapter_id, question_type, difficulty, marks, \
    question_text_en, question_text_hi, answer_data, explanation, is_active, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub question_type: String,
    pub difficulty: String,
    pub marks: Decimal,
    pub question_text_en: String,
    pub question_text_hi: Option<String>,
    pub answer_data: JsonValue,
    pub explanation: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    FillBlank,
    TrueFalse,
    SingleMcq,
    MultiMcq,
    Match,
    ShortAnswer,
    LongAnswer,
    Programming,
}

impl QuestionType {
    pub const ALL: [QuestionType; 8] = [
        QuestionType::FillBlank,
        QuestionType::TrueFalse,
        QuestionType::SingleMcq,
        QuestionType::MultiMcq,
        QuestionType::Match,
        QuestionType::ShortAnswer,
        QuestionType::LongAnswer,
        QuestionType::Programming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::FillBlank => "fill_blank",
            QuestionType::TrueFalse => "true_false",
            QuestionType::SingleMcq => "single_mcq",
            QuestionType::MultiMcq => "multi_mcq",
            QuestionType::Match => "match",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::LongAnswer => "long_answer",
            QuestionType::Programming => "programming",
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown question type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillBlankAnswer {
    pub answers: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseAnswer {
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub text_en: String,
    #[serde(default)]
    pub text_hi: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceAnswer {
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAnswer {
    pub pairs: Vec<MatchPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WrittenAnswer {
    #[serde(default)]
    pub model_answer: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub word_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramTestCase {
    pub input: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgrammingAnswer {
    pub language: String,
    #[serde(default)]
    pub starter_code: Option<String>,
    pub test_cases: Vec<ProgramTestCase>,
}

/// Type-specific answer payload of a question. The variant is selected by the
/// question's type, not by a tag inside the JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerData {
    FillBlank(FillBlankAnswer),
    TrueFalse(TrueFalseAnswer),
    SingleMcq(ChoiceAnswer),
    MultiMcq(ChoiceAnswer),
    Match(MatchAnswer),
    ShortAnswer(WrittenAnswer),
    LongAnswer(WrittenAnswer),
    Programming(ProgrammingAnswer),
}

impl AnswerData {
    /// Parses and validates the raw JSON for the given question type.
    pub fn parse(question_type: QuestionType, raw: &JsonValue) -> Result<Self, String> {
        let raw = if raw.is_null() {
            JsonValue::Object(Default::default())
        } else {
            raw.clone()
        };
        let invalid = |e: serde_json::Error| {
            format!("Invalid answer data for {}: {}", question_type.as_str(), e)
        };
        let data = match question_type {
            QuestionType::FillBlank => {
                AnswerData::FillBlank(serde_json::from_value(raw).map_err(invalid)?)
            }
            QuestionType::TrueFalse => {
                AnswerData::TrueFalse(serde_json::from_value(raw).map_err(invalid)?)
            }
            QuestionType::SingleMcq => {
                AnswerData::SingleMcq(serde_json::from_value(raw).map_err(invalid)?)
            }
            QuestionType::MultiMcq => {
                AnswerData::MultiMcq(serde_json::from_value(raw).map_err(invalid)?)
            }
            QuestionType::Match => AnswerData::Match(serde_json::from_value(raw).map_err(invalid)?),
            QuestionType::ShortAnswer => {
                AnswerData::ShortAnswer(serde_json::from_value(raw).map_err(invalid)?)
            }
            QuestionType::LongAnswer => {
                AnswerData::LongAnswer(serde_json::from_value(raw).map_err(invalid)?)
            }
            QuestionType::Programming => {
                AnswerData::Programming(serde_json::from_value(raw).map_err(invalid)?)
            }
        };
        data.check()?;
        Ok(data)
    }

    fn check(&self) -> Result<(), String> {
        match self {
            AnswerData::FillBlank(a) => {
                if a.answers.is_empty() || a.answers.iter().any(|s| s.trim().is_empty()) {
                    return Err("fill_blank needs at least one non-empty answer".into());
                }
            }
            AnswerData::TrueFalse(_) => {}
            AnswerData::SingleMcq(a) => {
                check_options(&a.options)?;
                if a.options.iter().filter(|o| o.is_correct).count() != 1 {
                    return Err("single_mcq needs exactly one correct option".into());
                }
            }
            AnswerData::MultiMcq(a) => {
                check_options(&a.options)?;
                if !a.options.iter().any(|o| o.is_correct) {
                    return Err("multi_mcq needs at least one correct option".into());
                }
            }
            AnswerData::Match(a) => {
                if a.pairs.len() < 2 {
                    return Err("match needs at least two pairs".into());
                }
                let mut seen = HashSet::new();
                for pair in &a.pairs {
                    if pair.left.trim().is_empty() || pair.right.trim().is_empty() {
                        return Err("match pairs cannot have blank sides".into());
                    }
                    if !seen.insert(pair.left.trim().to_lowercase()) {
                        return Err(format!("duplicate match item: {}", pair.left.trim()));
                    }
                }
            }
            AnswerData::ShortAnswer(a) | AnswerData::LongAnswer(a) => {
                if a.word_limit == Some(0) {
                    return Err("wordLimit must be greater than zero".into());
                }
            }
            AnswerData::Programming(a) => {
                if a.language.trim().is_empty() {
                    return Err("programming questions need a language".into());
                }
                if a.test_cases.is_empty() {
                    return Err("programming questions need at least one test case".into());
                }
            }
        }
        Ok(())
    }

    pub fn to_value(&self) -> serde_json::Result<JsonValue> {
        match self {
            AnswerData::FillBlank(a) => serde_json::to_value(a),
            AnswerData::TrueFalse(a) => serde_json::to_value(a),
            AnswerData::SingleMcq(a) | AnswerData::MultiMcq(a) => serde_json::to_value(a),
            AnswerData::Match(a) => serde_json::to_value(a),
            AnswerData::ShortAnswer(a) | AnswerData::LongAnswer(a) => serde_json::to_value(a),
            AnswerData::Programming(a) => serde_json::to_value(a),
        }
    }
}

fn check_options(options: &[ChoiceOption]) -> Result<(), String> {
    if options.len() < 2 {
        return Err("choice questions need at least two options".into());
    }
    if options.iter().any(|o| o.text_en.trim().is_empty()) {
        return Err("choice options cannot be blank".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_type_round_trips_through_str() {
        for t in QuestionType::ALL {
            assert_eq!(t.as_str().parse::<QuestionType>().unwrap(), t);
        }
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn single_mcq_requires_exactly_one_correct() {
        let two_correct = json!({"options": [
            {"textEn": "a", "isCorrect": true},
            {"textEn": "b", "isCorrect": true}
        ]});
        assert!(AnswerData::parse(QuestionType::SingleMcq, &two_correct).is_err());
        assert!(AnswerData::parse(QuestionType::MultiMcq, &two_correct).is_ok());

        let one_correct = json!({"options": [
            {"textEn": "a", "isCorrect": true},
            {"textEn": "b"}
        ]});
        assert!(AnswerData::parse(QuestionType::SingleMcq, &one_correct).is_ok());
    }

    #[test]
    fn match_rejects_duplicate_left_items() {
        let data = json!({"pairs": [
            {"left": "H2O", "right": "water"},
            {"left": "h2o ", "right": "ice"}
        ]});
        let err = AnswerData::parse(QuestionType::Match, &data).unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn written_answers_accept_empty_payload() {
        assert_eq!(
            AnswerData::parse(QuestionType::LongAnswer, &JsonValue::Null).unwrap(),
            AnswerData::LongAnswer(WrittenAnswer::default())
        );
        let zero_limit = json!({"wordLimit": 0});
        assert!(AnswerData::parse(QuestionType::ShortAnswer, &zero_limit).is_err());
    }

    #[test]
    fn true_false_needs_the_flag() {
        assert!(AnswerData::parse(QuestionType::TrueFalse, &json!({})).is_err());
        assert!(AnswerData::parse(QuestionType::TrueFalse, &json!({"correct": false})).is_ok());
    }

    #[test]
    fn programming_needs_test_cases() {
        let data = json!({"language": "python", "testCases": []});
        assert!(AnswerData::parse(QuestionType::Programming, &data).is_err());
        let data = json!({
            "language": "python",
            "testCases": [{"input": "1 2", "expectedOutput": "3"}]
        });
        let parsed = AnswerData::parse(QuestionType::Programming, &data).unwrap();
        assert_eq!(parsed.to_value().unwrap()["testCases"][0]["expectedOutput"], "3");
    }
}
