pub mod cli;
pub mod fetch;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use fetch::{Fetcher, HttpFetcher, IdentityRotator, PageFetcher, ResponseCache, RetryPolicy};
pub use logging::{init_logging, Logger};
pub use manager::ScraperManager;
pub use scrapers::Scraper;

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use iv_core::{Error, Item, Result};
}
