use std::sync::Arc;
use async_trait::async_trait;
use iv_core::{FetchRequest, Item, Result, SourceMetadata};
use crate::fetch::Fetcher;
use crate::logging::Logger;

pub mod embedded;
pub mod nowcoder;
pub mod xiaohongshu;
pub mod zhihu;

pub use nowcoder::NowcoderScraper;
pub use xiaohongshu::XiaohongshuScraper;
pub use zhihu::ZhihuScraper;

/// Terms that mark a post as an interview experience.
pub const INTERVIEW_MARKERS: [&str; 3] = ["面经", "面试", "interview"];

/// Domain term appended to every search query.
pub const QUERY_SUFFIX: &str = "面经";

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the display name, CLI name and base URL of the source
    fn source_metadata(&self) -> SourceMetadata;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }

    /// True when `filter` names this source (display name or CLI name, any case).
    fn matches(&self, filter: &str) -> bool {
        let filter = filter.trim();
        self.source_metadata().name.eq_ignore_ascii_case(filter)
            || self.cli_names().iter().any(|n| n.eq_ignore_ascii_case(filter))
    }

    /// Searches the source for interview experiences matching `keywords`.
    /// An unreachable source yields `Ok(vec![])`.
    async fn search(&self, keywords: &[String]) -> Result<Vec<Item>>;
}

/// One adapter per configured source, in dispatch order.
pub fn get_scrapers(fetcher: &Fetcher) -> Vec<Arc<dyn Scraper>> {
    vec![
        Arc::new(NowcoderScraper::new(fetcher.clone())),
        Arc::new(ZhihuScraper::new(fetcher.clone())),
        Arc::new(XiaohongshuScraper::new(fetcher.clone())),
    ]
}

/// A post as found on the page, before filtering and truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub body: String,
    pub url: String,
    pub author: Option<String>,
    pub score: Option<u64>,
}

/// Outcome of extracting one candidate: the candidate, or why it was skipped.
pub type Extraction = std::result::Result<Candidate, String>;

/// A pure function from raw page content to zero or more candidates.
#[derive(Clone, Copy)]
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub extract: fn(&str, &SourceMetadata) -> Vec<Extraction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_items: usize,
    pub excerpt_chars: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_items: 10,
            excerpt_chars: 300,
        }
    }
}

/// Fetch-parse-filter sequence shared by every adapter. Fetch failures are
/// logged and reported as an empty result.
pub(crate) async fn search_source(
    fetcher: &Fetcher,
    logger: &Logger,
    metadata: &SourceMetadata,
    request: FetchRequest,
    strategies: &[ExtractionStrategy],
    limits: SearchLimits,
) -> Vec<Item> {
    let html = match fetcher.get(&request).await {
        Ok(html) => html,
        Err(e) => {
            logger.warn(&format!("Fetch failed for {}: {}", request, e));
            return Vec::new();
        }
    };
    let items = utils::collect_items(metadata, &html, strategies, limits, logger);
    logger.info(&format!("✨ {} interview posts found", items.len()));
    items
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;
    use scraper::{ElementRef, Html, Selector};

    pub fn parse_selector(css: &str) -> std::result::Result<Selector, String> {
        Selector::parse(css).map_err(|e| format!("Invalid selector {}: {:?}", css, e))
    }

    /// Whitespace-collapsed text content of an element.
    pub fn element_text(element: ElementRef<'_>) -> String {
        element
            .text()
            .flat_map(|t| t.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Text of the first non-empty match among `selectors`, tried in order.
    pub fn first_text(element: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
        selectors.iter().find_map(|css| {
            let selector = parse_selector(css).ok()?;
            element
                .select(&selector)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
    }

    /// First non-empty `attr` value among `selectors`, tried in order.
    pub fn first_attr(element: ElementRef<'_>, selectors: &[&str], attr: &str) -> Option<String> {
        selectors.iter().find_map(|css| {
            let selector = parse_selector(css).ok()?;
            element
                .select(&selector)
                .filter_map(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        })
    }

    pub fn resolve_url(base_url: &str, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if let Some(rest) = href.strip_prefix("//") {
            format!("https://{}", rest)
        } else if href.starts_with('/') {
            format!("{}{}", base_url.trim_end_matches('/'), href)
        } else {
            format!("{}/{}", base_url.trim_end_matches('/'), href)
        }
    }

    /// First three keywords plus the domain term.
    pub fn build_query(keywords: &[String]) -> String {
        let mut parts: Vec<&str> = keywords.iter().take(3).map(|k| k.as_str()).collect();
        parts.push(QUERY_SUFFIX);
        parts.join(" ")
    }

    pub fn is_interview_related(title: &str, body: &str) -> bool {
        let title = title.to_lowercase();
        let body = body.to_lowercase();
        INTERVIEW_MARKERS
            .iter()
            .any(|marker| title.contains(marker) || body.contains(marker))
    }

    pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
        if text.chars().count() > max_chars {
            let mut cut: String = text.chars().take(max_chars).collect();
            cut.push_str("...");
            cut
        } else {
            text.to_string()
        }
    }

    /// Parses popularity counters such as `1,234`, `56 赞同`, `1.2万` or `3k`.
    /// The counter is the last number in the text, so dates in front of it are skipped.
    pub fn parse_count(text: &str) -> Option<u64> {
        let end = text.rfind(|c: char| c.is_ascii_digit())? + 1;
        let start = text[..end]
            .trim_end_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ',')
            .len();
        let number: f64 = text[start..end].replace(',', "").parse().ok()?;
        let multiplier = match text[end..].trim_start().chars().next() {
            Some('万') | Some('w') | Some('W') => 10_000.0,
            Some('k') | Some('K') | Some('千') => 1_000.0,
            _ => 1.0,
        };
        Some((number * multiplier).round() as u64)
    }

    /// Selector set describing one layout of result cards.
    pub struct CardLayout {
        pub item: &'static str,
        pub title: &'static [&'static str],
        pub body: &'static [&'static str],
        pub link: &'static [&'static str],
        pub author: &'static [&'static str],
        pub score: &'static [&'static str],
    }

    /// Extracts one candidate per card matched by `layout.item`.
    pub fn extract_cards(html: &str, metadata: &SourceMetadata, layout: &CardLayout) -> Vec<Extraction> {
        let document = Html::parse_document(html);
        let item_selector = match parse_selector(layout.item) {
            Ok(selector) => selector,
            Err(e) => return vec![Err(e)],
        };
        document
            .select(&item_selector)
            .map(|card| extract_card(card, metadata, layout))
            .collect()
    }

    fn extract_card(card: ElementRef<'_>, metadata: &SourceMetadata, layout: &CardLayout) -> Extraction {
        let body = first_text(card, layout.body).unwrap_or_default();
        let title = first_text(card, layout.title)
            .or_else(|| fallback_title(&body))
            .ok_or_else(|| "card has neither title nor body".to_string())?;
        let href = first_attr(card, layout.link, "href")
            .ok_or_else(|| format!("no link for {:?}", title))?;
        Ok(Candidate {
            url: resolve_url(metadata.base_url, &href),
            author: first_text(card, layout.author),
            score: first_text(card, layout.score).and_then(|t| parse_count(&t)),
            title,
            body,
        })
    }

    /// Untitled posts are named after the start of their body.
    pub fn fallback_title(body: &str) -> Option<String> {
        let body = body.trim();
        if body.is_empty() {
            None
        } else {
            Some(body.chars().take(30).collect())
        }
    }

    /// Applies `strategies` in order and keeps the first non-empty candidate list,
    /// capped to the page's top entries, then filtered and truncated.
    pub fn collect_items(
        metadata: &SourceMetadata,
        html: &str,
        strategies: &[ExtractionStrategy],
        limits: SearchLimits,
        logger: &Logger,
    ) -> Vec<Item> {
        for strategy in strategies {
            let mut candidates = Vec::new();
            for extraction in (strategy.extract)(html, metadata) {
                match extraction {
                    Ok(candidate) => candidates.push(candidate),
                    Err(reason) => logger.debug(&format!("Skipped candidate ({}): {}", strategy.name, reason)),
                }
            }
            if candidates.is_empty() {
                logger.debug(&format!("Strategy {} found nothing", strategy.name));
                continue;
            }
            logger.debug(&format!("Strategy {} found {} candidates", strategy.name, candidates.len()));
            return candidates
                .into_iter()
                .take(limits.max_items)
                .filter(|c| is_interview_related(&c.title, &c.body))
                .map(|c| Item {
                    source: metadata.name.to_string(),
                    title: c.title,
                    content: truncate_excerpt(&c.body, limits.excerpt_chars),
                    url: c.url,
                    author: c.author,
                    score: c.score,
                })
                .collect();
        }
        logger.debug("No strategy produced candidates");
        Vec::new()
    }
}
