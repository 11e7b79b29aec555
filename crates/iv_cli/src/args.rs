use std::net::SocketAddr;
use std::path::PathBuf;
use clap::{Parser, Subcommand};
use iv_core::{Config, Error, JobDescription, Result};
use iv_scrapers::ScraperArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "Collects interview experiences for a job description and summarizes them", long_about = None)]
pub struct Cli {
    /// JSON configuration file; flags and environment variables override it
    #[arg(long, env = "IV_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// API key of the OpenAI-compatible chat backend. Without it, rule-based keywords are used and no report is written
    #[arg(long, env = "IV_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,
    #[arg(long, env = "IV_BASE_URL", global = true)]
    pub base_url: Option<String>,
    #[arg(long, env = "IV_MODEL", global = true)]
    pub model: Option<String>,
    /// Fetch attempts per page, including the first
    #[arg(long, env = "IV_MAX_ATTEMPTS", global = true)]
    pub max_attempts: Option<u32>,
    #[arg(long, env = "IV_BASE_DELAY_MS", global = true)]
    pub base_delay_ms: Option<u64>,
    #[arg(long, env = "IV_CACHE_TTL_SECS", global = true)]
    pub cache_ttl_secs: Option<u64>,
    /// Overall time budget of one analysis
    #[arg(long, env = "IV_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,
    #[arg(long, env = "IV_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug)]
pub struct JobArgs {
    /// Position title, e.g. "NLP Engineer"
    #[arg(short, long)]
    pub position: String,
    #[arg(short, long, default_value = "")]
    pub company: String,
    /// Free-text requirements
    #[arg(short, long, default_value = "")]
    pub requirements: String,
}

impl JobArgs {
    pub fn to_job(&self) -> JobDescription {
        JobDescription::new(&self.position, &self.company, &self.requirements)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract keywords, search every source and synthesize a report
    Analyze {
        #[command(flatten)]
        job: JobArgs,
        /// Source to search (nowcoder, zhihu, xiaohongshu) or "all"
        #[arg(short, long, default_value = "all")]
        source: String,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Only extract search keywords from a job description
    Keywords {
        #[command(flatten)]
        job: JobArgs,
    },
    /// List available sources
    Sources,
    /// Search sources directly with explicit keywords
    Scrape(ScraperArgs),
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "IV_ADDR", default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
}

impl Cli {
    /// Defaults, then the config file, then flags and environment variables.
    pub fn build_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str(&raw)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
            }
            None => Config::default(),
        };

        if let Some(key) = &self.api_key {
            config.model.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            config.model.base_url = url.clone();
        }
        if let Some(model) = &self.model {
            config.model.model_name = model.clone();
        }
        if let Some(attempts) = self.max_attempts {
            if attempts == 0 {
                return Err(Error::Config("max attempts must be at least 1".to_string()));
            }
            config.fetch.max_attempts = attempts;
        }
        if let Some(delay) = self.base_delay_ms {
            config.fetch.base_delay_ms = delay;
        }
        if let Some(ttl) = self.cache_ttl_secs {
            config.fetch.cache_ttl_secs = ttl;
        }
        if let Some(timeout) = self.timeout_secs {
            config.pipeline.timeout_secs = timeout;
        }
        Ok(config)
    }
}
