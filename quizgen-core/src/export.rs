//! Quiz export: printable text and JSON.

use crate::model::{QuestionType, Quiz};
use std::fmt::Write;

/// Downloadable export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Txt,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "quiz.json",
            ExportFormat::Txt => "quiz.txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Txt => "text/plain; charset=utf-8",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "txt" | "text" => Ok(ExportFormat::Txt),
            other => Err(format!("Unknown export format '{}'. Expected json or txt.", other)),
        }
    }
}

/// A rendered export ready to be written or sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub content: String,
}

/// Render a quiz in the given format. TXT exports always include answers.
pub fn export(quiz: &Quiz, format: ExportFormat) -> Result<Export, serde_json::Error> {
    let content = match format {
        ExportFormat::Json => to_json(quiz)?,
        ExportFormat::Txt => format_quiz(quiz, true),
    };

    Ok(Export {
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        content,
    })
}

/// Pretty JSON encoding of the quiz
pub fn to_json(quiz: &Quiz) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(quiz)
}

const TITLE: &str = "AI Generated Quiz\n==================\n\n";

fn underline(title: &str, ch: char) -> String {
    format!("{}\n{}\n\n", title, ch.to_string().repeat(title.chars().count()))
}

/// Option label for a 0-based index: A, B, C, ...
pub fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Printable text, multiple-choice questions first and then true/false,
/// numbered with one running counter.
pub fn format_quiz(quiz: &Quiz, include_answers: bool) -> String {
    let mut out = TITLE.to_string();
    let mut counter = 1;

    let groups = [
        (QuestionType::Mcq, "Multiple Choice Questions"),
        (QuestionType::Tf, "True/False Questions"),
    ];

    for (kind, heading) in groups {
        if quiz.count(kind) == 0 {
            continue;
        }
        out.push_str(&underline(heading, '-'));

        for question in quiz.of_kind(kind) {
            let _ = writeln!(out, "Q{}: {}", counter, question.question_text);
            counter += 1;

            if kind == QuestionType::Mcq {
                for (i, option) in question.options().iter().enumerate() {
                    let _ = writeln!(out, "  {}. {}", option_label(i), option);
                }
            }
            if include_answers {
                let _ = writeln!(out, "\nANSWER: {}", question.correct_answer);
            }
            out.push('\n');
        }
    }

    out
}
