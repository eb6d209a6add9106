//! `quizgen status` command - Check whether the server is up

use anyhow::Result;
use quizgen_core::{Config, HealthResponse};

pub async fn run(config: Config) -> Result<()> {
    let url = format!("{}/health", config.server_url());

    println!("Checking Quizgen server status...");
    println!("URL: {}", url);

    match reqwest::get(&url).await {
        Ok(response) => {
            if response.status().is_success() {
                let health: HealthResponse = response.json().await?;

                println!("\n✅ Quizgen server is running");
                println!("   Status:   {}", health.status);
                println!("   Version:  {}", health.version);
                println!("   Model:    {}", health.model);
            } else {
                println!(
                    "\n⚠️  Quizgen server responded with status: {}",
                    response.status()
                );
            }
        }
        Err(_) => {
            println!("\n❌ Quizgen server is not running");
            println!("   Start it with: quizgen serve");
        }
    }

    Ok(())
}
