use clap::{Args, Subcommand};
use iv_core::{Error, Result};
use crate::manager::ScraperManager;

#[derive(Args, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScraperCommands {
    /// Search interview experiences for the given keywords
    Search {
        /// Keywords to search for (the first three are used in the query)
        #[arg(required = true)]
        keywords: Vec<String>,
        /// Restrict the search to one source (e.g. zhihu, niuke, xhs) or "all"
        #[arg(short, long)]
        source: Option<String>,
    },
    /// List available sources
    List,
}

pub async fn handle_command(args: ScraperArgs, manager: &ScraperManager) -> Result<()> {
    match args.command {
        ScraperCommands::Search { keywords, source } => {
            if let Some(filter) = source.as_deref() {
                if manager.scrapers_for(Some(filter)).is_empty() {
                    return Err(Error::UnknownSource(filter.to_string()));
                }
            }
            let result = manager.run_filtered(&keywords, source.as_deref()).await;
            println!("Found {} interview experiences", result.total_count);
            for item in &result.items {
                println!("[{}] {} - {}", item.source, item.title, item.url);
            }
            for failure in &result.failures {
                eprintln!("⚠️  {} failed: {}", failure.source, failure.reason);
            }
        }
        ScraperCommands::List => {
            println!("Available sources:");
            for source in manager.list_sources() {
                println!("  {} {:<12} {:<12} {}", source.emoji, source.cli_name, source.name, source.base_url);
            }
        }
    }
    Ok(())
}
