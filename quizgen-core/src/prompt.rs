//! Prompt and response schema construction for quiz generation.
//!
//! The prompt and schema are the single source of truth shared by the CLI
//! and the HTTP server. Both are pure functions of the request.

use crate::model::QuizRequest;
use serde_json::{json, Value};

/// Prompt text plus the structured-output schema sent alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct QuizPrompt {
    pub text: String,
    pub schema: Value,
}

/// Build the generation prompt and schema for a request
pub fn build_prompt(request: &QuizRequest) -> QuizPrompt {
    QuizPrompt {
        text: prompt_text(request),
        schema: response_schema(),
    }
}

fn prompt_text(request: &QuizRequest) -> String {
    format!(
        r#"Based on the following text, please generate a quiz.
The quiz should contain exactly {mcq} multiple-choice questions and {tf} true/false questions.
The difficulty of the questions should be: {difficulty}.
For multiple-choice questions, provide 4 distinct options, with exactly one being clearly correct. The 'correctAnswer' must be an exact match to one of the options.
For true/false questions, the 'correctAnswer' must be exactly "True" or "False", and the 'options' field should be omitted.

Source Text:
---
{source}
---
"#,
        mcq = request.num_mcq(),
        tf = request.num_tf(),
        difficulty = request.difficulty(),
        source = request.source_text(),
    )
}

/// The fixed output schema, in Gemini's OpenAPI-subset dialect
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "description": "A list of quiz questions.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "questionText": { "type": "STRING" },
                        "type": { "type": "STRING", "enum": ["MCQ", "TF"] },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "correctAnswer": { "type": "STRING" }
                    },
                    "required": ["questionText", "type", "correctAnswer"]
                }
            }
        },
        "required": ["questions"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    #[test]
    fn test_prompt_contains_counts_and_difficulty() {
        for (mcq, tf) in [(0, 1), (1, 0), (7, 13), (20, 20)] {
            for difficulty in Difficulty::ALL {
                let req = QuizRequest::new("Photosynthesis converts light.", mcq, tf, difficulty)
                    .unwrap();
                let prompt = build_prompt(&req);
                assert!(prompt.text.contains(&format!("exactly {} multiple-choice", mcq)));
                assert!(prompt.text.contains(&format!("and {} true/false", tf)));
                assert!(prompt.text.contains(&difficulty.to_string()));
            }
        }
    }

    #[test]
    fn test_prompt_order_and_delimited_source() {
        let source = "Line one of the notes.\nLine two.";
        let req = QuizRequest::new(source, 3, 2, Difficulty::Easy).unwrap();
        let text = build_prompt(&req).text;

        let mcq_pos = text.find("exactly 3 multiple-choice").unwrap();
        let tf_pos = text.find("2 true/false").unwrap();
        let difficulty_pos = text.find("should be: Easy").unwrap();
        let source_pos = text.find(source).unwrap();
        assert!(mcq_pos < tf_pos && tf_pos < difficulty_pos && difficulty_pos < source_pos);

        assert!(text.contains(&format!("---\n{}\n---", source)));
    }

    #[test]
    fn test_prompt_states_answer_rules() {
        let req = QuizRequest::new("notes", 1, 1, Difficulty::Medium).unwrap();
        let text = build_prompt(&req).text;
        assert!(text.contains("4 distinct options"));
        assert!(text.contains("exact match to one of the options"));
        assert!(text.contains(r#"exactly "True" or "False""#));
        assert!(text.contains("'options' field should be omitted"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let req = QuizRequest::new("notes", 2, 2, Difficulty::Hard).unwrap();
        assert_eq!(build_prompt(&req), build_prompt(&req));
    }

    #[test]
    fn test_schema_is_fixed() {
        let a = QuizRequest::new("alpha", 1, 0, Difficulty::Easy).unwrap();
        let b = QuizRequest::new("beta", 9, 4, Difficulty::Hard).unwrap();
        assert_eq!(build_prompt(&a).schema, build_prompt(&b).schema);

        let schema = response_schema();
        assert_eq!(schema["required"], json!(["questions"]));
        let item = &schema["properties"]["questions"]["items"];
        assert_eq!(
            item["required"],
            json!(["questionText", "type", "correctAnswer"])
        );
        assert_eq!(item["properties"]["type"]["enum"], json!(["MCQ", "TF"]));
        assert_eq!(item["properties"]["options"]["type"], "ARRAY");
    }
}
