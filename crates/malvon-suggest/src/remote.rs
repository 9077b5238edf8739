//! Remote suggestion service

use futures_util::future::BoxFuture;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::Result;

pub const GOOGLE_SUGGEST_ENDPOINT: &str = "https://suggestqueries.google.com/complete/search";

/// Source of remote search suggestions.
///
/// Suggestions are advisory: implementations return an empty list on any
/// failure instead of an error.
pub trait RemoteSuggestions: Send + Sync {
    fn fetch<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Vec<String>>;
}

/// Google's `client=firefox` suggestion endpoint.
pub struct GoogleSuggestions {
    client: reqwest::Client,
    endpoint: Url,
}

impl GoogleSuggestions {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_endpoint(GOOGLE_SUGGEST_ENDPOINT, timeout)
    }

    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, endpoint })
    }

    pub fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client", "firefox")
            .append_pair("q", query);
        url
    }

    async fn request(&self, query: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.request_url(query))
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        Ok(parse_suggestions(&body))
    }
}

impl RemoteSuggestions for GoogleSuggestions {
    fn fetch<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Vec<String>> {
        Box::pin(async move {
            if query.is_empty() {
                return Vec::new();
            }

            match self.request(query).await {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    tracing::debug!(error = %e, "Remote suggestions unavailable");
                    Vec::new()
                }
            }
        })
    }
}

/// Parse `["query", ["suggestion", ...], ...]`. Any other shape, including
/// a non-string entry in the suggestion list, yields no suggestions.
pub fn parse_suggestions(body: &[u8]) -> Vec<String> {
    let Ok(Value::Array(items)) = serde_json::from_slice::<Value>(body) else {
        return Vec::new();
    };

    match items.get(1) {
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| v.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
