//! `quizgen config` commands - View and manage configuration

use anyhow::Result;
use quizgen_core::Config;

/// Show current configuration
pub fn show(config: Config) -> Result<()> {
    let api_key = if config.gemini.api_key.is_some() {
        "set ✓"
    } else {
        "not set ⚠"
    };

    println!("╭─────────────────────────────────────────╮");
    println!("│         Quizgen Configuration           │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Gemini                                  │");
    println!("│   Model:        {:<23} │", config.gemini.model);
    println!("│   Timeout:      {:<23} │", format!("{}s", config.gemini.timeout_secs));
    println!("│   API key:      {:<23} │", api_key);
    println!("├─────────────────────────────────────────┤");
    println!("│ Server                                  │");
    println!("│   Host:         {:<23} │", config.server.host);
    println!("│   Port:         {:<23} │", config.server.port);
    println!("│   URL:          {:<23} │", config.server_url());
    println!("│   Upload limit: {:<23} │", format!("{} KiB", config.server.max_upload_bytes / 1024));
    println!("├─────────────────────────────────────────┤");
    println!("│ Generation                              │");
    println!("│   MCQ:          {:<23} │", config.generation.default_mcq);
    println!("│   True/False:   {:<23} │", config.generation.default_tf);
    println!("│   Difficulty:   {:<23} │", config.generation.default_difficulty.to_string());
    println!("│   Max per type: {:<23} │", config.generation.max_questions_per_type);
    println!("│   Strict:       {:<23} │", config.generation.strict_validation);
    println!("├─────────────────────────────────────────┤");
    println!("│ Logging                                 │");
    println!("│   Level:        {:<23} │", config.logging.level);
    println!("╰─────────────────────────────────────────╯");

    println!("\n📁 Paths:");
    if let Some(path) = Config::default_config_path() {
        let exists = path.exists();
        println!(
            "   Config:   {} {}",
            path.display(),
            if exists { "✓" } else { "(not created)" }
        );
    }
    println!("   Base URL: {}", truncate(&config.gemini.base_url, 60));

    Ok(())
}

/// Initialize default configuration
pub fn init(force: bool) -> Result<()> {
    let path = Config::default_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

    if path.exists() && !force {
        println!(
            "⚠️  Configuration file already exists at: {}",
            path.display()
        );
        println!("   Use --force to overwrite.");
        return Ok(());
    }

    Config::ensure_dirs()?;

    let config = Config::default();
    config.save_to_file(&path)?;

    println!("✅ Created configuration file at: {}", path.display());
    println!("\n📝 Default configuration:");
    println!("{}", toml::to_string_pretty(&config)?);
    println!("Set the Gemini key with: export API_KEY=...");

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{}…", kept)
    }
}
