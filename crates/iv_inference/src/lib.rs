pub mod keywords;
pub mod models;
pub mod report;

pub use keywords::KeywordExtractor;
pub use models::create_model;
pub use report::ReportSynthesizer;

pub mod prelude {
    pub use super::keywords::KeywordExtractor;
    pub use super::models::create_model;
    pub use super::report::ReportSynthesizer;
    pub use iv_core::{ChatModel, GenerationParams, JobDescription, Result, Error};
}
