use async_trait::async_trait;
use iv_core::{FetchRequest, Item, Result, SourceMetadata};
use crate::fetch::Fetcher;
use crate::logging::Logger;
use crate::scrapers::utils::{self, CardLayout};
use crate::scrapers::{search_source, Extraction, ExtractionStrategy, Scraper, SearchLimits};

const METADATA: SourceMetadata = SourceMetadata {
    name: "Zhihu",
    cli_name: "zhihu",
    emoji: "🔷",
    base_url: "https://www.zhihu.com",
};

const TITLES: &[&str] = &[".ContentItem-title", ".SearchResult-title", ".QuestionItem-title"];
const BODIES: &[&str] = &[".RichContent-inner", ".SearchResult-excerpt", ".SearchResult-snippet", ".RichContent"];
const LINKS: &[&str] = &[".ContentItem-title a[href]", ".SearchResult-title a[href]", "a[href]"];
const AUTHORS: &[&str] = &[".AuthorInfo-name", ".UserLink-link"];
const VOTES: &[&str] = &[".VoteButton--up"];

const SEARCH_CARD_LAYOUT: CardLayout = CardLayout {
    item: ".SearchResult-Card",
    title: TITLES,
    body: BODIES,
    link: LINKS,
    author: AUTHORS,
    score: VOTES,
};

const ANSWER_LAYOUT: CardLayout = CardLayout {
    item: ".AnswerItem",
    ..SEARCH_CARD_LAYOUT
};

const CONTENT_LAYOUT: CardLayout = CardLayout {
    item: ".ContentItem, .List-item",
    ..SEARCH_CARD_LAYOUT
};

fn search_cards(html: &str, metadata: &SourceMetadata) -> Vec<Extraction> {
    utils::extract_cards(html, metadata, &SEARCH_CARD_LAYOUT)
}

fn answer_items(html: &str, metadata: &SourceMetadata) -> Vec<Extraction> {
    utils::extract_cards(html, metadata, &ANSWER_LAYOUT)
}

fn content_items(html: &str, metadata: &SourceMetadata) -> Vec<Extraction> {
    utils::extract_cards(html, metadata, &CONTENT_LAYOUT)
}

const STRATEGIES: [ExtractionStrategy; 3] = [
    ExtractionStrategy { name: "search-card", extract: search_cards },
    ExtractionStrategy { name: "answer-item", extract: answer_items },
    ExtractionStrategy { name: "content-item", extract: content_items },
];

#[derive(Clone)]
pub struct ZhihuScraper {
    fetcher: Fetcher,
    logger: Logger,
}

impl ZhihuScraper {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            logger: Logger::new().with_prefix(format!("[{}]", METADATA.name)),
        }
    }

    pub fn search_request(query: &str) -> FetchRequest {
        FetchRequest::new(format!("{}/search", METADATA.base_url))
            .with_param("q", query)
            .with_param("type", "content")
    }

    pub fn parse(html: &str) -> Vec<Item> {
        utils::collect_items(&METADATA, html, &STRATEGIES, SearchLimits::default(), &Logger::new())
    }
}

#[async_trait]
impl Scraper for ZhihuScraper {
    fn source_metadata(&self) -> SourceMetadata {
        METADATA
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["zhihu"]
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

    const SEARCH_PAGE: &str = r#"
        <div class="SearchResult-Card">
          <h2 class="ContentItem-title"><a href="/question/42/answer/7">如何准备NLP算法工程师的面试？</a></h2>
          <a class="UserLink-link" href="/people/lin">林</a>
          <div class="RichContent-inner">深入理解 Transformer 架构，熟悉 PyTorch。</div>
          <button class="VoteButton--up">赞同 432</button>
        </div>
        <div class="SearchResult-Card">
          <h2 class="ContentItem-title"><a href="/question/43">最好用的键盘推荐</a></h2>
          <div class="RichContent-inner">机械键盘</div>
        </div>
    "#;

    const ANSWER_PAGE: &str = r#"
        <div class="AnswerItem">
          <div class="RichContent-inner">字节跳动NLP面试体验：简历面、技术一面、技术二面、HR面</div>
          <a href="//zhuanlan.zhihu.com/p/99">link</a>
        </div>
    "#;

    #[test]
    fn test_parse_search_cards() {
        let items = ZhihuScraper::parse(SEARCH_PAGE);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "如何准备NLP算法工程师的面试？");
        assert_eq!(item.url, "https://www.zhihu.com/question/42/answer/7");
        assert_eq!(item.author.as_deref(), Some("林"));
        assert_eq!(item.score, Some(432));
        assert_eq!(item.source, "Zhihu");
    }

    #[test]
    fn test_answer_fallback_uses_body_as_title() {
        let items = ZhihuScraper::parse(ANSWER_PAGE);
        assert_eq!(items.len(), 1);
        assert!(items[0].title.starts_with("字节跳动NLP面试体验"));
        assert_eq!(items[0].url, "https://zhuanlan.zhihu.com/p/99");
        assert_eq!(items[0].author, None);
    }

    #[test]
    fn test_unrelated_page_yields_nothing() {
        assert!(ZhihuScraper::parse("<html><body><p>登录</p></body></html>").is_empty());
    }
}
