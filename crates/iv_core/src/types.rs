use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use serde::{Deserialize, Serialize};

/// Maximum number of entries in a keyword set.
pub const MAX_KEYWORDS: usize = 8;

/// A single normalized interview-experience record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub source: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub author: Option<String>,
    pub score: Option<u64>,
}

/// Static description of a content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceMetadata {
    pub name: &'static str,
    pub cli_name: &'static str,
    pub emoji: &'static str,
    pub base_url: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescription {
    pub position: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub requirements: String,
}

impl JobDescription {
    pub fn new(position: impl Into<String>, company: impl Into<String>, requirements: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            company: company.into(),
            requirements: requirements.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.position.trim().is_empty() && self.requirements.trim().is_empty()
    }
}

impl fmt::Display for JobDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Position: {}", self.position)?;
        if !self.company.is_empty() {
            writeln!(f, "Company: {}", self.company)?;
        }
        write!(f, "Requirements: {}", self.requirements)
    }
}

/// Ordered, de-duplicated keyword list capped at [`MAX_KEYWORDS`].
pub fn normalize_keywords<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keywords: Vec<String> = Vec::new();
    for keyword in raw {
        let keyword = keyword.as_ref().trim();
        if keyword.is_empty() || keywords.iter().any(|k| k == keyword) {
            continue;
        }
        keywords.push(keyword.to_string());
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}

/// An adapter that produced no usable outcome: it errored, panicked or timed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub keywords: Vec<String>,
    pub items: Vec<Item>,
    pub per_source: BTreeMap<String, usize>,
    pub total_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,
}

impl AggregatedResult {
    /// Builds the aggregate from items in emission order; counts are derived from the items.
    pub fn from_items(keywords: Vec<String>, items: Vec<Item>, failures: Vec<SourceFailure>) -> Self {
        let mut per_source = BTreeMap::new();
        for item in &items {
            *per_source.entry(item.source.clone()).or_insert(0) += 1;
        }
        Self {
            keywords,
            total_count: items.len(),
            items,
            per_source,
            failures,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn sources(&self) -> BTreeSet<String> {
        self.per_source.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportErrorKind {
    NothingToAnalyze,
    CollaboratorUnavailable,
}

/// Outcome of report synthesis: either a report body or an error marker, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisReport {
    Completed {
        analysis: String,
        item_count: usize,
        sources: BTreeSet<String>,
    },
    Failed {
        kind: ReportErrorKind,
        detail: String,
    },
}

impl AnalysisReport {
    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisReport::Completed { .. })
    }

    pub fn analysis(&self) -> Option<&str> {
        match self {
            AnalysisReport::Completed { analysis, .. } => Some(analysis),
            AnalysisReport::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(source: &str, title: &str) -> Item {
        Item {
            source: source.to_string(),
            title: title.to_string(),
            content: String::new(),
            url: format!("https://example.com/{}", title),
            author: None,
            score: None,
        }
    }

    #[test]
    fn test_aggregate_counts_match_items() {
        let items = vec![item("Zhihu", "a"), item("Nowcoder", "b"), item("Zhihu", "c")];
        let result = AggregatedResult::from_items(vec!["rust".into()], items, vec![]);
        assert_eq!(result.total_count, 3);
        assert_eq!(result.per_source.get("Zhihu"), Some(&2));
        assert_eq!(result.per_source.get("Nowcoder"), Some(&1));
        assert_eq!(result.per_source.values().sum::<usize>(), result.items.len());
        // emission order is preserved
        assert_eq!(result.items[1].title, "b");
    }

    #[test]
    fn test_normalize_keywords() {
        let raw = vec![" python ", "", "redis", "python", "a", "b", "c", "d", "e", "f", "g"];
        let keywords = normalize_keywords(raw);
        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "python");
        assert_eq!(keywords[1], "redis");
        assert_eq!(keywords.iter().filter(|k| *k == "python").count(), 1);
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let report = AnalysisReport::Failed {
            kind: ReportErrorKind::NothingToAnalyze,
            detail: "empty".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "nothing_to_analyze");
        assert!(json.get("analysis").is_none());
    }

    #[test]
    fn test_blank_job_description() {
        assert!(JobDescription::new("  ", "Acme", "").is_blank());
        assert!(!JobDescription::new("NLP Engineer", "", "").is_blank());
    }
}
