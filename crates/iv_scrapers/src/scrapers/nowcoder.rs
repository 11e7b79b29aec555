use async_trait::async_trait;
use iv_core::{FetchRequest, Item, Result, SourceMetadata};
use crate::fetch::Fetcher;
use crate::logging::Logger;
use crate::scrapers::utils::{self, CardLayout};
use crate::scrapers::{search_source, Extraction, ExtractionStrategy, Scraper, SearchLimits};

const METADATA: SourceMetadata = SourceMetadata {
    name: "Nowcoder",
    cli_name: "nowcoder",
    emoji: "🐮",
    base_url: "https://www.nowcoder.com",
};

const DISCUSS_LAYOUT: CardLayout = CardLayout {
    item: ".discuss-main",
    title: &[".post-title", "a"],
    body: &[".post-content", ".post-topic-des"],
    link: &["a.post-title[href]", "a[href]"],
    author: &[".post-author", ".post-user"],
    score: &[".like-num", ".post-like"],
};

const POST_LAYOUT: CardLayout = CardLayout {
    item: ".post-item",
    ..DISCUSS_LAYOUT
};

const FEED_LAYOUT: CardLayout = CardLayout {
    item: ".search-item, .feed-item, .discuss-item",
    title: &[".title", ".feed-title", "h3", "h4"],
    body: &[".content", ".feed-content", ".discuss-content"],
    link: &["a[href]"],
    author: &[".user-name", ".nickname"],
    score: &[".like-num"],
};

fn discuss_cards(html: &str, metadata: &SourceMetadata) -> Vec<Extraction> {
    utils::extract_cards(html, metadata, &DISCUSS_LAYOUT)
}

fn post_cards(html: &str, metadata: &SourceMetadata) -> Vec<Extraction> {
    utils::extract_cards(html, metadata, &POST_LAYOUT)
}

fn feed_cards(html: &str, metadata: &SourceMetadata) -> Vec<Extraction> {
    utils::extract_cards(html, metadata, &FEED_LAYOUT)
}

const STRATEGIES: [ExtractionStrategy; 3] = [
    ExtractionStrategy { name: "discuss-main", extract: discuss_cards },
    ExtractionStrategy { name: "post-item", extract: post_cards },
    ExtractionStrategy { name: "feed-item", extract: feed_cards },
];

#[derive(Clone)]
pub struct NowcoderScraper {
    fetcher: Fetcher,
    logger: Logger,
}

impl NowcoderScraper {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            logger: Logger::new().with_prefix(format!("[{}]", METADATA.name)),
        }
    }

    pub fn search_request(query: &str) -> FetchRequest {
        FetchRequest::new(format!("{}/search", METADATA.base_url))
            .with_param("query", query)
            .with_param("type", "post")
    }

    pub fn parse(html: &str) -> Vec<Item> {
        utils::collect_items(&METADATA, html, &STRATEGIES, SearchLimits::default(), &Logger::new())
    }
}

#[async_trait]
impl Scraper for NowcoderScraper {
    fn source_metadata(&self) -> SourceMetadata {
        METADATA
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["nowcoder", "niuke"]
    }

    async fn search(&self, keywords: &[String]) -> Result<Vec<Item>> {
        let query = utils::build_query(keywords);
        self.logger.info(&format!("🔍 Searching for {:?}", query));
        let request = Self::search_request(&query);
        Ok(search_source(&self.fetcher, &self.logger, &METADATA, request, &STRATEGIES, SearchLimits::default()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISCUSS_PAGE: &str = r#"
        <html><body>
          <div class="discuss-main">
            <a class="post-title" href="/discuss/1001">字节跳动 Python 后端一面面经</a>
            <div class="post-content">自我介绍，项目深挖，Redis 持久化，手写 LRU</div>
            <span class="post-author">牛友A</span>
            <span class="like-num">1.2k</span>
          </div>
          <div class="discuss-main">
            <a class="post-title" href="/discuss/1002">秋招offer比较求建议</a>
            <div class="post-content">两个offer怎么选</div>
          </div>
          <div class="discuss-main">
            <a class="post-title" href="https://www.nowcoder.com/discuss/1003">腾讯 interview recap</a>
          </div>
        </body></html>
    "#;

    const FEED_PAGE: &str = r#"
        <html><body>
          <div class="feed-item">
            <h3>美团二面</h3>
            <div class="feed-content">面试官问了 MySQL 索引</div>
            <a href="/feed/55">查看</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_matches_aliases() {
        let scraper = NowcoderScraper::new(crate::fetch::tests_support::offline_fetcher());
        assert!(!scraper.matches("zhihu"));
        assert!(scraper.matches("niuke"));
        assert!(scraper.matches("Nowcoder"));
    }

    #[test]
    fn test_parse_primary_layout() {
        let items = NowcoderScraper::parse(DISCUSS_PAGE);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "字节跳动 Python 后端一面面经");
        assert_eq!(items[0].url, "https://www.nowcoder.com/discuss/1001");
        assert_eq!(items[0].author.as_deref(), Some("牛友A"));
        assert_eq!(items[0].score, Some(1200));
        assert_eq!(items[1].url, "https://www.nowcoder.com/discuss/1003");
        assert!(items.iter().all(|i| i.source == "Nowcoder"));
    }

    #[test]
    fn test_parse_falls_back_to_feed_layout() {
        let items = NowcoderScraper::parse(FEED_PAGE);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "美团二面");
        assert_eq!(items[0].url, "https://www.nowcoder.com/feed/55");
    }

    #[tokio::test]
    async fn test_search_through_fetcher() {
        let fetcher = crate::fetch::tests_support::static_fetcher(vec![("nowcoder.com", DISCUSS_PAGE.to_string())]);
        let scraper = NowcoderScraper::new(fetcher);
        let items = scraper.search(&["python".to_string()]).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_source_yields_no_items() {
        let scraper = NowcoderScraper::new(crate::fetch::tests_support::offline_fetcher());
        let items = scraper.search(&["python".to_string()]).await.unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_search_request() {
        let request = NowcoderScraper::search_request("python 面经");
        assert_eq!(request.params.get("type").map(String::as_str), Some("post"));
        assert_eq!(request.params.get("query").map(String::as_str), Some("python 面经"));
    }
}
