use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use iv_core::{AggregatedResult, AnalysisReport, Item, JobDescription, SourceFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Analyzed,
    NoMatches,
}

/// Combined outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub job: JobDescription,
    pub keywords: Vec<String>,
    pub status: MatchStatus,
    pub total_count: usize,
    pub per_source: BTreeMap<String, usize>,
    pub items: Vec<Item>,
    pub sample: Vec<Item>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,
    /// `None` only when nothing matched; a failed synthesis is carried as
    /// [`AnalysisReport::Failed`].
    pub report: Option<AnalysisReport>,
    pub generated_at: DateTime<Utc>,
}

impl PipelineResult {
    pub fn no_matches(job: JobDescription, aggregated: AggregatedResult) -> Self {
        Self {
            job,
            keywords: aggregated.keywords,
            status: MatchStatus::NoMatches,
            total_count: 0,
            per_source: BTreeMap::new(),
            items: Vec::new(),
            sample: Vec::new(),
            failures: aggregated.failures,
            report: None,
            generated_at: Utc::now(),
        }
    }

    pub fn analyzed(job: JobDescription, aggregated: AggregatedResult, report: AnalysisReport, sample_size: usize) -> Self {
        let sample = aggregated.items.iter().take(sample_size).cloned().collect();
        Self {
            job,
            keywords: aggregated.keywords,
            status: MatchStatus::Analyzed,
            total_count: aggregated.total_count,
            per_source: aggregated.per_source,
            items: aggregated.items,
            sample,
            failures: aggregated.failures,
            report: Some(report),
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iv_core::ReportErrorKind;

    #[test]
    fn test_serialized_shape() {
        let aggregated = AggregatedResult::from_items(vec!["rust".to_string()], vec![], vec![]);
        let result = PipelineResult::no_matches(JobDescription::new("Rust Dev", "", ""), aggregated);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "no_matches");
        assert_eq!(json["keywords"][0], "rust");
        assert!(json["report"].is_null());
        assert!(json.get("failures").is_none());

        let item = Item {
            source: "Zhihu".to_string(),
            title: "面经".to_string(),
            content: String::new(),
            url: "https://www.zhihu.com/question/1".to_string(),
            author: None,
            score: None,
        };
        let aggregated = AggregatedResult::from_items(vec![], vec![item.clone(), item], vec![]);
        let report = AnalysisReport::Failed {
            kind: ReportErrorKind::CollaboratorUnavailable,
            detail: "offline".to_string(),
        };
        let result = PipelineResult::analyzed(JobDescription::default(), aggregated, report, 1);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "analyzed");
        assert_eq!(json["sample"].as_array().unwrap().len(), 1);
        assert_eq!(json["report"]["status"], "failed");
        assert_eq!(json["report"]["kind"], "collaborator_unavailable");
    }
}
