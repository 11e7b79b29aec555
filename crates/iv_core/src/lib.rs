pub mod config;
pub mod error;
pub mod models;
pub mod request;
pub mod types;

pub use config::Config;
pub use error::{Error, FailureKind, FetchError, Result};
pub use models::{ChatModel, GenerationParams};
pub use request::FetchRequest;
pub use types::{
    normalize_keywords, AggregatedResult, AnalysisReport, Item, JobDescription,
    ReportErrorKind, SourceFailure, SourceMetadata, MAX_KEYWORDS,
};
