use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a failed fetch, used to decide whether a retry is worthwhile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Connect,
    RateLimited,
    ServerError,
    ClientError,
    Decode,
    Other,
}

impl FailureKind {
    /// Kinds that are retried unless a policy is configured otherwise.
    pub const DEFAULT_RETRYABLE: [FailureKind; 4] = [
        FailureKind::Timeout,
        FailureKind::Connect,
        FailureKind::RateLimited,
        FailureKind::ServerError,
    ];

    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            429 => Some(FailureKind::RateLimited),
            500..=599 => Some(FailureKind::ServerError),
            400..=499 => Some(FailureKind::ClientError),
            _ => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::RateLimited => "rate limited",
            FailureKind::ServerError => "server error",
            FailureKind::ClientError => "client error",
            FailureKind::Decode => "decode",
            FailureKind::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} failure: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_connect() {
            FailureKind::Connect
        } else if let Some(kind) = err.status().and_then(|s| FailureKind::from_status(s.as_u16())) {
            kind
        } else if err.is_decode() || err.is_body() {
            FailureKind::Decode
        } else {
            FailureKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Language model unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("No keywords could be extracted from the job description")]
    NoKeywords,

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Stable tag for the failure, suitable for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Http(_) => "http",
            Error::Fetch(_) => "fetch_failure",
            Error::Scraping(_) => "scraping",
            Error::Parse(_) => "parse_failure",
            Error::CollaboratorUnavailable(_) => "collaborator_unavailable",
            Error::NoKeywords => "no_keywords",
            Error::UnknownSource(_) => "unknown_source",
            Error::Timeout(_) => "timeout",
            Error::Config(_) => "config",
            Error::External(_) => "external",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
