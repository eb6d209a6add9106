//! Quizgen CLI - AI quiz generator
//!
//! Generate multiple-choice and true/false quizzes from notes, text files
//! and PDFs, or run the Quizgen HTTP API.

mod commands;
mod present;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use quizgen_core::{Config, Difficulty, ExportFormat};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Quizgen - AI quiz generator
#[derive(Parser)]
#[command(name = "quizgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model to use (overrides config)
    #[arg(short, long, global = true, env = "QUIZGEN_MODEL")]
    model: Option<String>,

    /// Server port (overrides config)
    #[arg(long, global = true, env = "QUIZGEN_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "QUIZGEN_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a quiz from a file, text or stdin
    Generate(GenerateArgs),

    /// Start the HTTP API server
    Serve,

    /// Re-render a saved quiz.json as text or JSON
    Export {
        /// Path to a quiz.json file
        input: PathBuf,

        /// Output format (txt or json)
        #[arg(long, default_value = "txt")]
        format: ExportFormat,

        /// Directory to write the export into
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Check whether a Quizgen server is running
    Status,

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Source file (.txt or .pdf); takes precedence over --text
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Source text (or read from stdin if neither --file nor --text is given)
    #[arg(short, long)]
    text: Option<String>,

    /// Number of multiple-choice questions
    #[arg(long)]
    mcq: Option<u32>,

    /// Number of true/false questions
    #[arg(long)]
    tf: Option<u32>,

    /// Difficulty (easy, medium, hard)
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Hide the correct answers
    #[arg(long)]
    hide_answers: bool,

    /// Emit the plain-text quiz instead of cards (to stdout or --out)
    #[arg(long)]
    copy: bool,

    /// File to write the plain-text quiz to (implies --copy)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also write quiz.txt or quiz.json
    #[arg(long)]
    export: Option<ExportFormat>,

    /// Directory for --export
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Print the prompt and schema without calling Gemini
    #[arg(long)]
    dry_run: bool,

    /// Print the quiz as JSON
    #[arg(long)]
    json: bool,

    /// Keep questions that fail validation
    #[arg(long)]
    lenient: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Initialize default configuration
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Runs without loading, so a broken config file can be replaced
    if let Commands::Config(ConfigCommands::Init { force }) = &cli.command {
        init_logging(cli.log_level.as_deref().unwrap_or("info"));
        return commands::config::init(*force);
    }

    // Load configuration: file, then environment
    let mut config = match &cli.config {
        Some(path) => Config::load_path(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(model) = &cli.model {
        config.gemini.model = model.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    init_logging(&config.logging.level);
    config.validate()?;

    match cli.command {
        Commands::Generate(args) => commands::generate::run(config, args).await,
        Commands::Serve => commands::serve::run(config).await,
        Commands::Export {
            input,
            format,
            dir,
            stdout,
        } => commands::export::run(&input, format, &dir, stdout),
        Commands::Status => commands::status::run(config).await,
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(config),
            ConfigCommands::Init { force } => commands::config::init(force),
        },
    }
}
