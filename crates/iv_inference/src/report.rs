use std::collections::BTreeSet;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{info, warn};
use iv_core::{AnalysisReport, ChatModel, GenerationParams, Item, JobDescription, ReportErrorKind};

pub const REPORT_PARAMS: GenerationParams = GenerationParams::new(2048, 0.5);

/// Items quoted in the prompt; the rest only count towards the totals.
pub const MAX_PROMPT_ITEMS: usize = 10;

pub const PROMPT_EXCERPT_CHARS: usize = 300;

fn excerpt(text: &str, max_chars: usize) -> String {
    let mut cut: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        cut.push_str("...");
    }
    cut
}

pub fn report_prompt(items: &[Item], job: &JobDescription) -> String {
    let mut summaries = String::new();
    for item in items.iter().take(MAX_PROMPT_ITEMS) {
        let _ = write!(
            summaries,
            "【{}】{}\n{}\n\n",
            item.source,
            item.title,
            excerpt(&item.content, PROMPT_EXCERPT_CHARS)
        );
    }

    format!(
        "作为一位资深技术面试专家，请根据以下岗位JD和收集到的面经进行分析：\n\n\
         岗位JD:\n{}\n\n\
         收集到的面经(共{}篇):\n{}\
         请提供以下分析:\n\
         1. 技术考点: 列出5-10个高频技术考察点，按重要性排序\n\
         2. 典型面试问题: 列出8-12个典型面试问题，每个问题附带简要分析\n\
         3. 面试趋势: 总结该岗位近期面试趋势和变化\n\
         4. 准备建议: 给出针对性的准备建议\n\n\
         请以结构化方式呈现，使用Markdown格式。",
        job,
        items.len(),
        summaries
    )
}

pub struct ReportSynthesizer {
    model: Arc<dyn ChatModel>,
}

impl ReportSynthesizer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Never fabricates a report: empty input and model failures come back
    /// as [`AnalysisReport::Failed`].
    pub async fn synthesize(&self, items: &[Item], job: &JobDescription) -> AnalysisReport {
        if items.is_empty() {
            return AnalysisReport::Failed {
                kind: ReportErrorKind::NothingToAnalyze,
                detail: "no interview experiences to analyze".to_string(),
            };
        }
        if !self.model.is_available() {
            return AnalysisReport::Failed {
                kind: ReportErrorKind::CollaboratorUnavailable,
                detail: format!("{} is not available", self.model.name()),
            };
        }

        info!("📝 Synthesizing report from {} items", items.len());
        match self.model.complete(&report_prompt(items, job), REPORT_PARAMS).await {
            Ok(analysis) => AnalysisReport::Completed {
                analysis,
                item_count: items.len(),
                sources: items.iter().map(|i| i.source.clone()).collect::<BTreeSet<_>>(),
            },
            Err(e) => {
                warn!("Report synthesis failed: {}", e);
                AnalysisReport::Failed {
                    kind: ReportErrorKind::CollaboratorUnavailable,
                    detail: e.to_string(),
                }
            }
        }
    }
}
