//! `quizgen export` command - Re-render a saved quiz offline

use anyhow::{Context, Result};
use quizgen_core::export::{self, ExportFormat};
use quizgen_core::Quiz;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read a quiz previously saved as JSON
pub fn load_quiz(path: &Path) -> Result<Quiz> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let quiz: Quiz = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid quiz file", path.display()))?;

    for (index, issue) in quiz.issues() {
        warn!("Question {}: {}", index + 1, issue);
    }
    Ok(quiz)
}

/// Write `quiz.txt` or `quiz.json` into `dir`, returning the written path
pub fn write_export(quiz: &Quiz, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    let file = export::export(quiz, format)?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let path = dir.join(file.file_name);
    std::fs::write(&path, file.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote {} ({})", path.display(), file.mime_type);
    Ok(path)
}

pub fn run(input: &Path, format: ExportFormat, dir: &Path, stdout: bool) -> Result<()> {
    let quiz = load_quiz(input)?;

    if stdout {
        print!("{}", export::export(&quiz, format)?.content);
        return Ok(());
    }

    let path = write_export(&quiz, format, dir)?;
    println!("✅ Exported {} questions to {}", quiz.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizgen_core::Question;
    use tempfile::TempDir;

    fn quiz() -> Quiz {
        Quiz::new(vec![
            Question::mcq("Closest star?", ["Sirius", "Sun", "Vega", "Rigel"], "Sun"),
            Question::true_false("The Moon is a planet.", false),
        ])
    }

    #[test]
    fn test_write_txt_export() {
        let dir = TempDir::new().unwrap();
        let path = write_export(&quiz(), ExportFormat::Txt, dir.path()).unwrap();

        assert_eq!(path, dir.path().join("quiz.txt"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("AI Generated Quiz\n"));
        assert!(text.contains("ANSWER: Sun"));
        assert!(text.contains("ANSWER: False"));
    }

    #[test]
    fn test_json_export_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = write_export(&quiz(), ExportFormat::Json, dir.path().join("out").as_path())
            .unwrap();

        assert!(path.ends_with("out/quiz.json"));
        assert_eq!(load_quiz(&path).unwrap(), quiz());
    }

    #[test]
    fn test_load_rejects_non_quiz() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, r#"{"title": "not a quiz"}"#).unwrap();

        assert!(load_quiz(&path).is_err());
        assert!(load_quiz(&dir.path().join("missing.json")).is_err());
    }
}
