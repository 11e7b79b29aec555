//! End-to-end flow: job description → keywords → concurrent source search → report.

pub mod result;

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use iv_core::{ChatModel, Config, Error, JobDescription, Result, SourceMetadata};
use iv_inference::{create_model, KeywordExtractor, ReportSynthesizer};
use iv_scrapers::{Fetcher, ScraperManager};

pub use result::{MatchStatus, PipelineResult};

pub struct Pipeline {
    extractor: KeywordExtractor,
    manager: ScraperManager,
    synthesizer: ReportSynthesizer,
    timeout: Duration,
    sample_size: usize,
}

impl Pipeline {
    pub fn new(model: Arc<dyn ChatModel>, manager: ScraperManager) -> Self {
        let defaults = iv_core::config::PipelineConfig::default();
        Self {
            extractor: KeywordExtractor::new(model.clone()),
            manager,
            synthesizer: ReportSynthesizer::new(model),
            timeout: defaults.timeout(),
            sample_size: defaults.sample_size,
        }
    }

    /// HTTP fetch stack, the default sources and the configured chat backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Fetcher::from_config(&config.fetch)?;
        let manager = ScraperManager::new(fetcher, config.fetch.adapter_timeout());
        Ok(Self::new(create_model(&config.model), manager)
            .with_timeout(config.pipeline.timeout())
            .with_sample_size(config.pipeline.sample_size))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn list_sources(&self) -> Vec<SourceMetadata> {
        self.manager.list_sources()
    }

    /// Keyword-only variant; no sources are queried.
    pub async fn extract_keywords(&self, job: &JobDescription) -> Result<Vec<String>> {
        let keywords = self.extractor.extract(job).await;
        if keywords.is_empty() {
            return Err(Error::NoKeywords);
        }
        Ok(keywords)
    }

    /// Runs the whole flow under the pipeline timeout. On timeout every
    /// in-flight source task is cancelled and nothing partial is returned.
    pub async fn process(&self, job: &JobDescription, source_filter: Option<&str>) -> Result<PipelineResult> {
        tokio::time::timeout(self.timeout, self.run(job, source_filter))
            .await
            .map_err(|_| Error::Timeout(format!("analysis did not finish within {:?}", self.timeout)))?
    }

    async fn run(&self, job: &JobDescription, source_filter: Option<&str>) -> Result<PipelineResult> {
        info!("🎯 Analyzing {:?} (sources: {})", job.position, source_filter.unwrap_or("all"));
        let keywords = self.extract_keywords(job).await?;

        let aggregated = self.manager.run_filtered(&keywords, source_filter).await;
        if aggregated.is_empty() {
            warn!("No interview experiences found for {:?}", keywords);
            return Ok(PipelineResult::no_matches(job.clone(), aggregated));
        }

        let report = self.synthesizer.synthesize(&aggregated.items, job).await;
        if !report.is_completed() {
            warn!("Report unavailable: {:?}", report);
        }
        Ok(PipelineResult::analyzed(job.clone(), aggregated, report, self.sample_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use iv_core::{AnalysisReport, GenerationParams, Item};
    use iv_scrapers::Scraper;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Model(Option<&'static str>);

    #[async_trait]
    impl ChatModel for Model {
        fn name(&self) -> &str {
            "test"
        }

        fn is_available(&self) -> bool {
            self.0.is_some()
        }

        async fn complete(&self, _prompt: &str, _params: GenerationParams) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| Error::CollaboratorUnavailable("offline".to_string()))
        }
    }

    struct Source {
        name: &'static str,
        count: usize,
        delay: Duration,
    }

    #[async_trait]
    impl Scraper for Source {
        fn source_metadata(&self) -> SourceMetadata {
            SourceMetadata {
                name: self.name,
                cli_name: self.name,
                emoji: "🧪",
                base_url: "https://example.com",
            }
        }

        async fn search(&self, keywords: &[String]) -> Result<Vec<Item>> {
            tokio::time::sleep(self.delay).await;
            Ok((0..self.count)
                .map(|i| Item {
                    source: self.name.to_string(),
                    title: format!("{} 面经 {}", keywords[0], i),
                    content: "一面问了 Transformer".to_string(),
                    url: format!("https://example.com/{}", i),
                    author: None,
                    score: None,
                })
                .collect())
        }
    }

    fn pipeline(reply: Option<&'static str>, sources: Vec<(&'static str, usize, u64)>) -> Pipeline {
        let scrapers: Vec<Arc<dyn Scraper>> = sources
            .into_iter()
            .map(|(name, count, delay_ms)| {
                Arc::new(Source { name, count, delay: Duration::from_millis(delay_ms) }) as Arc<dyn Scraper>
            })
            .collect();
        let manager = ScraperManager::with_scrapers(scrapers, Duration::from_secs(5));
        Pipeline::new(Arc::new(Model(reply)), manager)
    }

    fn job() -> JobDescription {
        JobDescription::new("NLP Engineer", "Acme", "Python, Transformer")
    }

    #[tokio::test]
    async fn test_blank_job_fails_fast() {
        let err = pipeline(None, vec![("A", 1, 0)])
            .process(&JobDescription::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoKeywords));
    }

    #[tokio::test]
    async fn test_no_matches_is_a_status() {
        let result = pipeline(None, vec![("A", 0, 0)]).process(&job(), None).await.unwrap();
        assert_eq!(result.status, MatchStatus::NoMatches);
        assert_eq!(result.total_count, 0);
        assert!(result.report.is_none());
        assert!(!result.keywords.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_filter_yields_no_matches() {
        let result = pipeline(None, vec![("A", 2, 0)]).process(&job(), Some("reddit")).await.unwrap();
        assert_eq!(result.status, MatchStatus::NoMatches);
    }

    #[tokio::test]
    async fn test_analyzed_result() {
        let p = pipeline(Some("## 技术考点"), vec![("A", 4, 0), ("B", 3, 0)]).with_sample_size(5);
        let result = p.process(&job(), Some("all")).await.unwrap();
        assert_eq!(result.status, MatchStatus::Analyzed);
        assert_eq!(result.total_count, 7);
        assert_eq!(result.per_source.values().sum::<usize>(), 7);
        assert_eq!(result.sample.len(), 5);
        assert_eq!(result.report.as_ref().and_then(AnalysisReport::analysis), Some("## 技术考点"));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_error() {
        let p = pipeline(None, vec![("Slow", 1, 2_000)]).with_timeout(Duration::from_millis(50));
        let err = p.process(&job(), None).await.unwrap_err();
        assert_eq!(err.kind(), "timeout");
    }

    /// Marks `finished` only if its search runs to completion.
    struct Lingering {
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Scraper for Lingering {
        fn source_metadata(&self) -> SourceMetadata {
            SourceMetadata {
                name: "Lingering",
                cli_name: "lingering",
                emoji: "🧪",
                base_url: "https://example.com",
            }
        }

        async fn search(&self, _keywords: &[String]) -> Result<Vec<Item>> {
            tokio::time::sleep(Duration::from_millis(300)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_timeout_aborts_in_flight_sources() {
        let finished = Arc::new(AtomicBool::new(false));
        let scraper: Arc<dyn Scraper> = Arc::new(Lingering { finished: finished.clone() });
        let manager = ScraperManager::with_scrapers(vec![scraper], Duration::from_secs(5));
        let p = Pipeline::new(Arc::new(Model(None)), manager).with_timeout(Duration::from_millis(50));

        let err = p.process(&job(), None).await.unwrap_err();
        assert_eq!(err.kind(), "timeout");

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
