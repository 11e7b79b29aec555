mod args;

use clap::Parser;
use iv_core::{AnalysisReport, Result};
use iv_pipeline::{MatchStatus, Pipeline, PipelineResult};
use iv_scrapers::{init_logging, Fetcher, ScraperManager};
use iv_web::AppState;
use args::{Cli, Commands};

fn print_result(result: &PipelineResult) {
    println!("🔑 Keywords: {}", result.keywords.join(", "));
    if result.status == MatchStatus::NoMatches {
        println!("🤷 No interview experiences found");
        for failure in &result.failures {
            println!("   ⚠️  {}: {}", failure.source, failure.reason);
        }
        return;
    }

    println!("📚 {} interview experiences", result.total_count);
    for (source, count) in &result.per_source {
        println!("   {:<12} {}", source, count);
    }
    for failure in &result.failures {
        println!("   ⚠️  {}: {}", failure.source, failure.reason);
    }
    println!();
    for item in &result.sample {
        println!("• [{}] {}", item.source, item.title);
        println!("  {}", item.url);
    }
    println!();
    match &result.report {
        Some(AnalysisReport::Completed { analysis, .. }) => println!("{}", analysis),
        Some(AnalysisReport::Failed { kind, detail }) => {
            println!("⚠️  Report unavailable ({:?}): {}", kind, detail)
        }
        None => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let logger = init_logging(&cli.log_level);
    let config = cli.build_config()?;

    match cli.command {
        Commands::Analyze { job, source, json } => {
            let pipeline = Pipeline::from_config(&config)?;
            let result = pipeline.process(&job.to_job(), Some(source.as_str())).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        Commands::Keywords { job } => {
            let pipeline = Pipeline::from_config(&config)?;
            let keywords = pipeline.extract_keywords(&job.to_job()).await?;
            println!("{}", keywords.join(", "));
        }
        Commands::Sources => {
            let pipeline = Pipeline::from_config(&config)?;
            for source in pipeline.list_sources() {
                println!("{} {:<12} {}", source.emoji, source.cli_name, source.base_url);
            }
        }
        Commands::Scrape(args) => {
            let fetcher = Fetcher::from_config(&config.fetch)?;
            let manager = ScraperManager::new(fetcher, config.fetch.adapter_timeout());
            iv_scrapers::handle_command(args, &manager).await?;
        }
        Commands::Serve { addr } => {
            let pipeline = Pipeline::from_config(&config)?;
            logger.info(&format!("🚀 Starting API server on {}", addr));
            iv_web::serve(AppState::new(pipeline), addr)
                .await
                .map_err(|e| {
                    logger.error(&format!("Server stopped: {}", e));
                    e
                })?;
        }
    }
    Ok(())
}
