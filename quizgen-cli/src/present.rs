//! Terminal rendering of a generated quiz as question cards.

use quizgen_core::export::option_label;
use quizgen_core::{QuestionType, Quiz};
use std::fmt::Write;

pub const EMPTY_QUIZ: &str =
    "No questions were generated. Try adjusting your source text or prompt.";

/// Render every question as a card, in generation order
pub fn render_cards(quiz: &Quiz, show_answers: bool) -> String {
    if quiz.is_empty() {
        return format!("{}\n", EMPTY_QUIZ);
    }

    let mut out = String::new();
    for (i, question) in quiz.questions.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}]", i + 1, question.kind.label());
        let _ = writeln!(out, "   {}", question.question_text);

        match question.kind {
            QuestionType::Mcq => {
                for (j, option) in question.options().iter().enumerate() {
                    let marker = if show_answers && question.is_correct(option) {
                        "  ✓"
                    } else {
                        ""
                    };
                    let _ = writeln!(out, "   {}. {}{}", option_label(j), option, marker);
                }
            }
            QuestionType::Tf => {
                if show_answers {
                    let _ = writeln!(out, "   Correct Answer: {}", question.correct_answer);
                }
            }
        }
        out.push('\n');
    }
    out
}
