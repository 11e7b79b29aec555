use std::collections::BTreeMap;
use std::fmt;
use sha2::{Digest, Sha256};
use url::Url;
use crate::{Error, Result};

/// Target address plus query parameters. Parameters are kept sorted so that
/// equal requests always render and hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub url: String,
    pub params: BTreeMap<String, String>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Full URL with percent-encoded query parameters.
    pub fn to_url(&self) -> Result<Url> {
        Url::parse_with_params(&self.url, self.params.iter())
            .map_err(|e| Error::Parse(format!("Invalid URL {}: {}", self.url, e)))
    }

    /// SHA-256 over the address and every parameter. Each field is
    /// length-prefixed so no two distinct requests share an input.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        let mut field = |bytes: &[u8]| {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        };
        field(self.url.as_bytes());
        for (key, value) in &self.params {
            field(key.as_bytes());
            field(value.as_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_url() {
            Ok(url) => write!(f, "{}", url),
            Err(_) => write!(f, "{}", self.url),
        }
    }
}
