//! Shared data models for Quizgen.
//!
//! This module contains the quiz entities exchanged with Gemini, the
//! per-submission generation request, and HTTP response bodies.

use crate::quiz::QuizError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Difficulty level requested for a quiz
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuizError::InvalidParameter(format!(
                "Unknown difficulty '{}'. Expected Easy, Medium or Hard.",
                other
            ))),
        }
    }
}

// Case-insensitive, same as the CLI and form parsing
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of quiz question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "TF")]
    Tf,
}

impl QuestionType {
    /// Human-readable label used on question cards
    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "Multiple Choice",
            QuestionType::Tf => "True / False",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionType::Mcq => write!(f, "MCQ"),
            QuestionType::Tf => write!(f, "TF"),
        }
    }
}

/// Number of options every multiple-choice question carries
pub const MCQ_OPTION_COUNT: usize = 4;

/// Accepted answers for true/false questions
pub const TF_ANSWERS: [&str; 2] = ["True", "False"];

/// A single quiz item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
}

/// A shape rule broken by a generated question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionIssue {
    WrongOptionCount(usize),
    AnswerNotAnOption,
    DuplicateOptions,
    InvalidTrueFalseAnswer,
    UnexpectedOptions,
    EmptyQuestionText,
}

impl std::fmt::Display for QuestionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionIssue::WrongOptionCount(n) => {
                write!(f, "expected {} options, got {}", MCQ_OPTION_COUNT, n)
            }
            QuestionIssue::AnswerNotAnOption => {
                write!(f, "correct answer does not match any option")
            }
            QuestionIssue::DuplicateOptions => write!(f, "options are not distinct"),
            QuestionIssue::InvalidTrueFalseAnswer => {
                write!(f, "true/false answer must be \"True\" or \"False\"")
            }
            QuestionIssue::UnexpectedOptions => {
                write!(f, "true/false question should not carry options")
            }
            QuestionIssue::EmptyQuestionText => write!(f, "question text is empty"),
        }
    }
}

impl Question {
    pub fn mcq(
        text: impl Into<String>,
        options: [&str; MCQ_OPTION_COUNT],
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            question_text: text.into(),
            kind: QuestionType::Mcq,
            options: Some(options.iter().map(|o| o.to_string()).collect()),
            correct_answer: correct_answer.into(),
        }
    }

    pub fn true_false(text: impl Into<String>, answer: bool) -> Self {
        Self {
            question_text: text.into(),
            kind: QuestionType::Tf,
            options: None,
            correct_answer: if answer { "True" } else { "False" }.to_string(),
        }
    }

    /// Options as a slice; empty when absent
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Whether `option` is the correct answer (exact, byte-for-byte)
    pub fn is_correct(&self, option: &str) -> bool {
        option == self.correct_answer
    }

    /// Check the MCQ/TF shape rules the prompt asks the model to follow
    pub fn issues(&self) -> Vec<QuestionIssue> {
        let mut issues = Vec::new();

        if self.question_text.trim().is_empty() {
            issues.push(QuestionIssue::EmptyQuestionText);
        }

        let options = self.options();
        match self.kind {
            QuestionType::Mcq => {
                if options.len() != MCQ_OPTION_COUNT {
                    issues.push(QuestionIssue::WrongOptionCount(options.len()));
                }
                if !options.iter().any(|o| self.is_correct(o)) {
                    issues.push(QuestionIssue::AnswerNotAnOption);
                }
                let mut seen = std::collections::HashSet::new();
                if !options.iter().all(|o| seen.insert(o.as_str())) {
                    issues.push(QuestionIssue::DuplicateOptions);
                }
            }
            QuestionType::Tf => {
                if !TF_ANSWERS.contains(&self.correct_answer.as_str()) {
                    issues.push(QuestionIssue::InvalidTrueFalseAnswer);
                }
                if !options.is_empty() {
                    issues.push(QuestionIssue::UnexpectedOptions);
                }
            }
        }

        issues
    }
}

/// A generated quiz, questions in the order the model returned them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Quiz {
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Questions of one kind, preserving their relative order
    pub fn of_kind(&self, kind: QuestionType) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.kind == kind)
    }

    /// Count of questions of one kind
    pub fn count(&self, kind: QuestionType) -> usize {
        self.of_kind(kind).count()
    }

    /// Shape violations, keyed by 0-based question index
    pub fn issues(&self) -> Vec<(usize, QuestionIssue)> {
        self.questions
            .iter()
            .enumerate()
            .flat_map(|(idx, q)| q.issues().into_iter().map(move |issue| (idx, issue)))
            .collect()
    }
}

/// Input to quiz generation, built once per submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    source_text: String,
    num_mcq: u32,
    num_tf: u32,
    difficulty: Difficulty,
}

impl QuizRequest {
    /// Validate and build a request. Fails with `InputMissing` when the
    /// source is blank or no questions were asked for.
    pub fn new(
        source_text: impl Into<String>,
        num_mcq: u32,
        num_tf: u32,
        difficulty: Difficulty,
    ) -> Result<Self, QuizError> {
        let source_text = source_text.into();
        if source_text.trim().is_empty() {
            return Err(QuizError::InputMissing(
                "Source content is missing.".to_string(),
            ));
        }
        if num_mcq == 0 && num_tf == 0 {
            return Err(QuizError::InputMissing(
                "Please request at least one question.".to_string(),
            ));
        }

        Ok(Self {
            source_text,
            num_mcq,
            num_tf,
            difficulty,
        })
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn num_mcq(&self) -> u32 {
        self.num_mcq
    }

    pub fn num_tf(&self) -> u32 {
        self.num_tf
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn total_questions(&self) -> u32 {
        self.num_mcq.saturating_add(self.num_tf)
    }

    /// Estimate source tokens (rough approximation: chars / 4)
    pub fn estimate_source_tokens(&self) -> u32 {
        (self.source_text.len() / 4) as u32
    }
}

/// Error body returned by the HTTP API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    /// Provider message, only present for provider failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quiz() -> Quiz {
        Quiz::new(vec![
            Question::mcq(
                "What is the capital of France?",
                ["Berlin", "Paris", "Madrid", "Rome"],
                "Paris",
            ),
            Question::true_false("The sky is green.", false),
        ])
    }

    #[test]
    fn test_difficulty_parse_and_display() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" HARD ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::Medium.to_string(), "Medium");
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert!(matches!(
            "extreme".parse::<Difficulty>(),
            Err(QuizError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_difficulty_deserialize_ignores_case() {
        for raw in ["\"hard\"", "\"Hard\"", "\"HARD\""] {
            assert_eq!(serde_json::from_str::<Difficulty>(raw).unwrap(), Difficulty::Hard);
        }
        let err = serde_json::from_str::<Difficulty>("\"extreme\"").unwrap_err();
        assert!(err.to_string().contains("Unknown difficulty"));

        // Serialized form is unchanged
        assert_eq!(serde_json::to_string(&Difficulty::Easy).unwrap(), "\"Easy\"");
    }

    #[test]
    fn test_question_wire_format() {
        let quiz = sample_quiz();
        let json = serde_json::to_value(&quiz).unwrap();

        let mcq = &json["questions"][0];
        assert_eq!(mcq["questionText"], "What is the capital of France?");
        assert_eq!(mcq["type"], "MCQ");
        assert_eq!(mcq["options"][1], "Paris");
        assert_eq!(mcq["correctAnswer"], "Paris");

        let tf = &json["questions"][1];
        assert_eq!(tf["type"], "TF");
        assert!(tf.get("options").is_none());
        assert_eq!(tf["correctAnswer"], "False");
    }

    #[test]
    fn test_tf_accepts_null_options() {
        let json = r#"{"questionText": "Water is wet.", "type": "TF", "options": null, "correctAnswer": "True"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.kind, QuestionType::Tf);
        assert!(q.options().is_empty());
        assert!(q.issues().is_empty());
    }

    #[test]
    fn test_valid_questions_have_no_issues() {
        assert!(sample_quiz().issues().is_empty());
    }

    #[test]
    fn test_mcq_issues() {
        let mut q = Question::mcq("Pick one", ["a", "b", "c", "d"], "e");
        assert_eq!(q.issues(), vec![QuestionIssue::AnswerNotAnOption]);

        q.options = Some(vec!["a".into(), "a".into(), "e".into()]);
        let issues = q.issues();
        assert!(issues.contains(&QuestionIssue::WrongOptionCount(3)));
        assert!(issues.contains(&QuestionIssue::DuplicateOptions));
        assert!(!issues.contains(&QuestionIssue::AnswerNotAnOption));
    }

    #[test]
    fn test_mcq_answer_match_is_exact() {
        let q = Question::mcq("Case matters", ["Paris", "Rome", "Oslo", "Bern"], "paris");
        assert!(q.issues().contains(&QuestionIssue::AnswerNotAnOption));
    }

    #[test]
    fn test_tf_issues() {
        let mut q = Question::true_false("Statement", true);
        q.correct_answer = "yes".to_string();
        q.options = Some(vec!["True".into(), "False".into()]);
        let issues = q.issues();
        assert!(issues.contains(&QuestionIssue::InvalidTrueFalseAnswer));
        assert!(issues.contains(&QuestionIssue::UnexpectedOptions));
    }

    #[test]
    fn test_quiz_counts() {
        let quiz = sample_quiz();
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz.count(QuestionType::Mcq), 1);
        assert_eq!(quiz.count(QuestionType::Tf), 1);
    }

    #[test]
    fn test_quiz_request_validation() {
        let req = QuizRequest::new("Some notes", 2, 1, Difficulty::Hard).unwrap();
        assert_eq!(req.total_questions(), 3);

        let huge = QuizRequest::new("Some notes", u32::MAX, 5, Difficulty::Easy).unwrap();
        assert_eq!(huge.total_questions(), u32::MAX);
        assert_eq!(req.difficulty(), Difficulty::Hard);

        assert!(matches!(
            QuizRequest::new("", 2, 1, Difficulty::Easy),
            Err(QuizError::InputMissing(_))
        ));
        assert!(matches!(
            QuizRequest::new("   \n\t", 2, 1, Difficulty::Easy),
            Err(QuizError::InputMissing(_))
        ));
        assert!(matches!(
            QuizRequest::new("Some notes", 0, 0, Difficulty::Easy),
            Err(QuizError::InputMissing(_))
        ));
        assert!(QuizRequest::new("Some notes", 0, 1, Difficulty::Easy).is_ok());
    }

    #[test]
    fn test_api_error_serialization() {
        let plain = serde_json::to_string(&ApiError::new("Source content is missing.")).unwrap();
        assert_eq!(plain, r#"{"error":"Source content is missing."}"#);

        let detailed = ApiError::new("Failed").with_detail("quota exhausted");
        let json = serde_json::to_value(&detailed).unwrap();
        assert_eq!(json["detail"], "quota exhausted");
    }
}
