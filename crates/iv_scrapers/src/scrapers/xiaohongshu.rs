use async_trait::async_trait;
use serde_json::Value;
use iv_core::{FetchRequest, Item, Result, SourceMetadata};
use crate::fetch::Fetcher;
use crate::logging::Logger;
use crate::scrapers::embedded::{extract_script_state, str_at};
use crate::scrapers::utils::{self, CardLayout};
use crate::scrapers::{search_source, Candidate, Extraction, ExtractionStrategy, Scraper, SearchLimits};

const METADATA: SourceMetadata = SourceMetadata {
    name: "Xiaohongshu",
    cli_name: "xiaohongshu",
    emoji: "📕",
    base_url: "https://www.xiaohongshu.com",
};

const STATE_MARKER: &str = "window.__INITIAL_STATE__";

const LIMITS: SearchLimits = SearchLimits {
    max_items: 8,
    excerpt_chars: 300,
};

const NOTE_LAYOUT: CardLayout = CardLayout {
    item: ".note-item",
    title: &[".title", ".note-title", ".content-title"],
    body: &[".desc", ".note-content", ".content"],
    link: &["a[href]"],
    author: &[".author .name", ".author", ".nickname", ".user-name"],
    score: &[".like-wrapper .count", ".count"],
};

const FEED_LAYOUT: CardLayout = CardLayout {
    item: ".feed-item",
    ..NOTE_LAYOUT
};

/// Notes from the `note.noteList` array of the page's initial-state payload.
fn state_notes(html: &str, metadata: &SourceMetadata) -> Vec<Extraction> {
    let Some(state) = extract_script_state(html, STATE_MARKER) else {
        return Vec::new();
    };
    state
        .pointer("/note/noteList")
        .and_then(Value::as_array)
        .map(|notes| notes.iter().map(|note| note_candidate(note, metadata)).collect())
        .unwrap_or_default()
}

fn note_candidate(note: &Value, metadata: &SourceMetadata) -> Extraction {
    let id = str_at(note, &["id"])
        .or_else(|| str_at(note, &["noteId"]))
        .ok_or_else(|| "note without id".to_string())?;
    let body = str_at(note, &["desc"]).unwrap_or_default();
    let title = str_at(note, &["title"])
        .or_else(|| str_at(note, &["displayTitle"]))
        .or_else(|| utils::fallback_title(&body))
        .ok_or_else(|| format!("note {} has neither title nor description", id))?;
    let author = str_at(note, &["nickname"]).or_else(|| str_at(note, &["user", "nickname"]));
    let score = str_at(note, &["likes"])
        .or_else(|| str_at(note, &["interactInfo", "likedCount"]))
        .and_then(|s| utils::parse_count(&s));
    Ok(Candidate {
        title,
        body,
        url: format!("{}/discovery/item/{}", metadata.base_url, id),
        author,
        score,
    })
}

fn note_cards(html: &str, metadata: &SourceMetadata) -> Vec<Extraction> {
    utils::extract_cards(html, metadata, &NOTE_LAYOUT)
}

fn feed_cards(html: &str, metadata: &SourceMetadata) -> Vec<Extraction> {
    utils::extract_cards(html, metadata, &FEED_LAYOUT)
}

const STRATEGIES: [ExtractionStrategy; 3] = [
    ExtractionStrategy { name: "initial-state", extract: state_notes },
    ExtractionStrategy { name: "note-item", extract: note_cards },
    ExtractionStrategy { name: "feed-item", extract: feed_cards },
];

#[derive(Clone)]
pub struct XiaohongshuScraper {
    fetcher: Fetcher,
    logger: Logger,
}

impl XiaohongshuScraper {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            logger: Logger::new().with_prefix(format!("[{}]", METADATA.name)),
        }
    }

    pub fn search_request(query: &str) -> FetchRequest {
        FetchRequest::new(format!("{}/search_result", METADATA.base_url)).with_param("keyword", query)
    }

    pub fn parse(html: &str) -> Vec<Item> {
        utils::collect_items(&METADATA, html, &STRATEGIES, LIMITS, &Logger::new())
    }
}

#[async_trait]
impl Scraper for XiaohongshuScraper {
    fn source_metadata(&self) -> SourceMetadata {
        METADATA
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["xiaohongshu", "xhs", "rednote"]
    }

    async fn search(&self, keywords: &[String]) -> Result<Vec<Item>> {
        let query = utils::build_query(keywords);
        self.logger.info(&format!("🔍 Searching for {:?}", query));
        let request = Self::search_request(&query);
        Ok(search_source(&self.fetcher, &self.logger, &METADATA, request, &STRATEGIES, LIMITS).await)
    }
}
