use std::collections::HashSet;

use thiserror::Error;
use url::Url;

const CANONICAL_HOST: &str = "x.com";
const ACCEPTED_HOSTS: &[&str] = &[
    "x.com",
    "www.x.com",
    "mobile.x.com",
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("unsupported host {0}")]
    UnsupportedHost(String),
    #[error("url is not a status thread: {0}")]
    NotAThread(String),
}

/// One content thread to harvest. Identity is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    url: String,
    channel_name: String,
    conversation_id: String,
}

impl Target {
    /// Parses `https://x.com/{channel}/status/{id}` (or any accepted variant)
    /// into a target with a canonical URL.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let url = canonical_url(raw)?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [channel, "status", id, ..]
                if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) =>
            {
                let channel_name = (*channel).to_string();
                let conversation_id = (*id).to_string();
                Ok(Self {
                    url: format!("https://{CANONICAL_HOST}/{channel_name}/status/{conversation_id}"),
                    channel_name,
                    conversation_id,
                })
            }
            _ => Err(TargetError::NotAThread(raw.trim().to_string())),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

/// Normalizes a thread URL for ledger comparisons. Falls back to the trimmed
/// input when the URL is not a recognizable thread.
pub fn normalize_target_url(raw: &str) -> String {
    match Target::parse(raw) {
        Ok(target) => target.url,
        Err(_) => raw.trim().trim_end_matches('/').to_string(),
    }
}

fn canonical_url(raw: &str) -> Result<Url, TargetError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TargetError::InvalidUrl(String::new()));
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let mut url = Url::parse(&with_scheme).map_err(|err| TargetError::InvalidUrl(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(TargetError::InvalidUrl(format!("unsupported scheme {other}"))),
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if !ACCEPTED_HOSTS.contains(&host.as_str()) {
        return Err(TargetError::UnsupportedHost(host));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// URLs already harvested to completion, in the order they finished.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessedUrls {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ProcessedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_urls(urls: impl IntoIterator<Item = String>) -> Self {
        let mut processed = Self::new();
        for url in urls {
            processed.insert(&url);
        }
        processed
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(&normalize_target_url(url))
    }

    /// Returns false when the URL was already recorded.
    pub fn insert(&mut self, url: &str) -> bool {
        let normalized = normalize_target_url(url);
        if normalized.is_empty() || !self.seen.insert(normalized.clone()) {
            return false;
        }
        self.order.push(normalized);
        true
    }

    pub fn urls(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
