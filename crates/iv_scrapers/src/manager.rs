use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use iv_core::{AggregatedResult, Item, Result, SourceFailure, SourceMetadata};
use crate::fetch::Fetcher;
use crate::logging::Logger;
use crate::scrapers::{get_scrapers, Scraper};

type SearchOutcome = std::result::Result<Result<Vec<Item>>, tokio::time::error::Elapsed>;

/// Aborts every spawned adapter task that is still running when dropped.
struct AdapterTasks(Vec<JoinHandle<SearchOutcome>>);

impl Drop for AdapterTasks {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Runs every configured source concurrently and merges what they find.
pub struct ScraperManager {
    scrapers: Vec<Arc<dyn Scraper>>,
    adapter_timeout: Duration,
    logger: Logger,
}

impl ScraperManager {
    pub fn new(fetcher: Fetcher, adapter_timeout: Duration) -> Self {
        Self::with_scrapers(get_scrapers(&fetcher), adapter_timeout)
    }

    pub fn with_scrapers(scrapers: Vec<Arc<dyn Scraper>>, adapter_timeout: Duration) -> Self {
        Self {
            scrapers,
            adapter_timeout,
            logger: Logger::new().with_prefix("[manager]".to_string()),
        }
    }

    pub fn list_sources(&self) -> Vec<SourceMetadata> {
        self.scrapers.iter().map(|s| s.source_metadata()).collect()
    }

    /// Scrapers selected by `filter`; `None` or `"all"` selects every source.
    pub fn scrapers_for(&self, filter: Option<&str>) -> Vec<Arc<dyn Scraper>> {
        match filter.map(str::trim) {
            None | Some("") => self.scrapers.clone(),
            Some(f) if f.eq_ignore_ascii_case("all") => self.scrapers.clone(),
            Some(f) => self.scrapers.iter().filter(|s| s.matches(f)).cloned().collect(),
        }
    }

    pub async fn run(&self, keywords: &[String]) -> AggregatedResult {
        self.dispatch(self.scrapers.clone(), keywords).await
    }

    pub async fn run_filtered(&self, keywords: &[String], filter: Option<&str>) -> AggregatedResult {
        let selected = self.scrapers_for(filter);
        if selected.is_empty() {
            self.logger.warn(&format!("No source matches filter {:?}", filter.unwrap_or_default()));
        }
        self.dispatch(selected, keywords).await
    }

    /// Spawns one task per scraper and waits for all of them to settle.
    /// Errors, panics and timeouts are recorded as failures; sibling tasks keep running.
    async fn dispatch(&self, scrapers: Vec<Arc<dyn Scraper>>, keywords: &[String]) -> AggregatedResult {
        let shared: Arc<[String]> = keywords.into();
        let mut names = Vec::with_capacity(scrapers.len());
        let mut tasks = AdapterTasks(Vec::with_capacity(scrapers.len()));

        self.logger.info(&format!("🚀 Dispatching {} sources for {:?}", scrapers.len(), keywords));
        for scraper in scrapers {
            let metadata = scraper.source_metadata();
            let keywords = shared.clone();
            let timeout = self.adapter_timeout;
            names.push(metadata);
            tasks.0.push(tokio::spawn(async move {
                tokio::time::timeout(timeout, scraper.search(&keywords)).await
            }));
        }

        let mut items = Vec::new();
        let mut failures = Vec::new();
        for (metadata, handle) in names.iter().zip(tasks.0.iter_mut()) {
            let reason = match handle.await {
                Ok(Ok(Ok(found))) => {
                    self.logger.info(&format!("{} {}: {} items", metadata.emoji, metadata.name, found.len()));
                    items.extend(found);
                    continue;
                }
                Ok(Ok(Err(e))) => e.to_string(),
                Ok(Err(_)) => format!("timed out after {:?}", self.adapter_timeout),
                Err(e) if e.is_panic() => "adapter panicked".to_string(),
                Err(e) => e.to_string(),
            };
            self.logger.error(&format!("❌ {} failed: {}", metadata.name, reason));
            failures.push(SourceFailure {
                source: metadata.name.to_string(),
                reason,
            });
        }

        let result = AggregatedResult::from_items(keywords.to_vec(), items, failures);
        self.logger.info(&format!("📊 {} items from {} sources", result.total_count, result.per_source.len()));
        result
    }
}
