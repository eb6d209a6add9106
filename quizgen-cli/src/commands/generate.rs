//! `quizgen generate` command - Build a quiz from a file, text or stdin

use super::export::write_export;
use crate::present::render_cards;
use crate::GenerateArgs;
use anyhow::{bail, Result};
use quizgen_core::config::GenerationConfig;
use quizgen_core::export::{format_quiz, to_json};
use quizgen_core::extract::{extract, extract_path, SourceKind};
use quizgen_core::{build_prompt, Config, GeminiClient, QuizGenerator, QuizRequest};
use std::io::{self, Read};
use std::sync::Arc;
use tracing::{debug, info};

/// Read source text from stdin if it is piped
fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        // Stdin is a terminal, not piped
        return Ok(None);
    }
    read_source(io::stdin().lock())
}

/// Read all of `reader` verbatim, decoding it like a `.txt` upload
fn read_source<R: Read>(mut reader: R) -> Result<Option<String>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(extract(&bytes, SourceKind::PlainText)?))
}

/// Requested counts, falling back to the configured defaults
fn resolve_counts(
    mcq: Option<u32>,
    tf: Option<u32>,
    limits: &GenerationConfig,
) -> Result<(u32, u32)> {
    let mcq = mcq.unwrap_or(limits.default_mcq);
    let tf = tf.unwrap_or(limits.default_tf);

    let max = limits.max_questions_per_type;
    if mcq > max || tf > max {
        bail!("At most {} questions of each type can be requested.", max);
    }
    Ok((mcq, tf))
}

pub async fn run(config: Config, args: GenerateArgs) -> Result<()> {
    // A file wins over --text, which wins over stdin
    let source = match (&args.file, args.text) {
        (Some(path), _) => {
            info!("Reading source from {}", path.display());
            extract_path(path)?
        }
        (None, Some(text)) => text,
        (None, None) => match read_stdin()? {
            Some(text) => text,
            None => {
                bail!("No source provided. Usage: quizgen generate --file notes.pdf, --text \"...\" or cat notes.txt | quizgen generate");
            }
        },
    };
    debug!("Source: {} chars", source.len());

    let limits = &config.generation;
    let (mcq, tf) = resolve_counts(args.mcq, args.tf, limits)?;
    let difficulty = args.difficulty.unwrap_or(limits.default_difficulty);
    let request = QuizRequest::new(source, mcq, tf, difficulty)?;

    if args.dry_run {
        let prompt = build_prompt(&request);
        println!("{}", prompt.text);
        println!("Response schema:");
        println!("{}", serde_json::to_string_pretty(&prompt.schema)?);
        return Ok(());
    }

    let client = GeminiClient::from_config(&config.gemini)?;
    let generator = QuizGenerator::new(Arc::new(client))
        .with_strict_validation(limits.strict_validation && !args.lenient);

    info!(
        "Generating {} questions (~{} source tokens)...",
        request.total_questions(),
        request.estimate_source_tokens()
    );
    let quiz = generator.generate(&request).await?;

    let show_answers = !args.hide_answers;
    if args.json {
        println!("{}", to_json(&quiz)?);
    } else if let Some(path) = &args.out {
        std::fs::write(path, format_quiz(&quiz, show_answers))?;
        println!("{}", render_cards(&quiz, show_answers));
        println!("📋 Quiz text written to {}", path.display());
    } else if args.copy {
        print!("{}", format_quiz(&quiz, show_answers));
    } else {
        print!("{}", render_cards(&quiz, show_answers));
    }

    if let Some(format) = args.export {
        let path = write_export(&quiz, format, &args.dir)?;
        eprintln!("💾 Saved {}", path.display());
    }

    Ok(())
}
