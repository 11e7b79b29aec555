use std::sync::Arc;
use tracing::{info, warn};
use iv_core::{normalize_keywords, ChatModel, GenerationParams, JobDescription};

pub const KEYWORD_PARAMS: GenerationParams = GenerationParams::new(500, 0.3);

/// Technology terms looked for in the requirements when no model is usable.
pub const TECH_VOCABULARY: [&str; 26] = [
    "python", "java", "javascript", "typescript", "react", "vue", "django", "flask",
    "spring", "node.js", "golang", "rust", "c++", "mysql", "redis", "mongodb", "docker",
    "kubernetes", "aws", "git", "linux", "nginx", "kafka", "pytorch", "tensorflow",
    "transformer",
];

pub const GENERIC_TERMS: [&str; 2] = ["面试", "面经"];

fn keyword_prompt(job: &JobDescription) -> String {
    format!(
        "请分析以下职位描述，提取出最重要的技能关键词和面试考点，用于搜索相关面经。\n\
         请只返回关键词，每个关键词用逗号分隔，不要其他解释。\n\n\
         职位：{}\n公司：{}\n要求：{}\n\n\
         请提取5-8个最核心的技术关键词和面试重点：",
        job.position, job.company, job.requirements
    )
}

/// Splits a comma-separated model reply (ASCII or full-width commas).
pub fn parse_keyword_list(reply: &str) -> Vec<String> {
    normalize_keywords(
        reply
            .split(|c| c == ',' || c == '，')
            .map(|k| k.trim().trim_end_matches('。')),
    )
}

/// Deterministic extraction: position tokens, vocabulary hits in the
/// requirements, then the raw position and the generic terms.
pub fn fallback_keywords(job: &JobDescription) -> Vec<String> {
    if job.is_blank() {
        return Vec::new();
    }
    let position = job.position.trim();
    let requirements = job.requirements.to_lowercase();

    let mut raw: Vec<String> = position.to_lowercase().split_whitespace().map(str::to_string).collect();
    raw.extend(
        TECH_VOCABULARY
            .iter()
            .filter(|term| requirements.contains(*term))
            .map(|term| term.to_string()),
    );
    raw.push(position.to_string());
    raw.extend(GENERIC_TERMS.iter().map(|t| t.to_string()));
    normalize_keywords(raw)
}

pub struct KeywordExtractor {
    model: Arc<dyn ChatModel>,
}

impl KeywordExtractor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// At most eight keywords. Uses the model when available and falls back to
    /// [`fallback_keywords`] on any failure or an empty reply.
    pub async fn extract(&self, job: &JobDescription) -> Vec<String> {
        if job.is_blank() {
            warn!("Empty job description, no keywords to extract");
            return Vec::new();
        }

        if self.model.is_available() {
            match self.model.complete(&keyword_prompt(job), KEYWORD_PARAMS).await {
                Ok(reply) => {
                    let keywords = parse_keyword_list(&reply);
                    if !keywords.is_empty() {
                        info!("🔑 Keywords from {}: {:?}", self.model.name(), keywords);
                        return keywords;
                    }
                    warn!("{} returned no usable keywords", self.model.name());
                }
                Err(e) => warn!("Keyword extraction via {} failed: {}", self.model.name(), e),
            }
        }

        let keywords = fallback_keywords(job);
        info!("🔑 Fallback keywords: {:?}", keywords);
        keywords
    }
}
