use async_trait::async_trait;
use unisync_core::{InstitutionRecord, MAX_ERROR_BODY_LEN, SourceConfig};

use crate::error::SourceError;

/// Anything that can produce one batch of institution records per run.
#[async_trait]
pub trait InstitutionSource: Send + Sync {
    /// Fetch the full payload.
    ///
    /// An empty vector is a valid answer meaning "nothing to do".
    async fn fetch(&self) -> Result<Vec<InstitutionRecord>, SourceError>;
}

/// Client for the institution search API.
pub struct SourceClient {
    client: reqwest::Client,
    url: String,
    name_filter: String,
}

impl std::fmt::Debug for SourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceClient")
            .field("url", &self.url)
            .field("name_filter", &self.name_filter)
            .finish_non_exhaustive()
    }
}

impl SourceClient {
    /// Creates a client for the configured endpoint and filter.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_owned(),
            name_filter: config.name_filter.clone(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn name_filter(&self) -> &str {
        &self.name_filter
    }
}

#[async_trait]
impl InstitutionSource for SourceClient {
    async fn fetch(&self) -> Result<Vec<InstitutionRecord>, SourceError> {
        tracing::debug!(url = %self.url, name = %self.name_filter, "fetching institutions");

        let response =
            self.client.get(&self.url).query(&[("name", &self.name_filter)]).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            return Err(SourceError::HttpStatus {
                code: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_LEN).to_owned(),
            });
        }

        let body = response.text().await?;
        let records = parse_records(&body)?;
        tracing::debug!(count = records.len(), "source payload decoded");
        Ok(records)
    }
}

/// Decode a payload as a JSON array of records, all-or-nothing.
///
/// # Errors
/// Returns [`SourceError::Parse`] if the body is not valid JSON, is not an
/// array, or any element lacks a required key.
pub(crate) fn parse_records(body: &str) -> Result<Vec<InstitutionRecord>, SourceError> {
    serde_json::from_str(body).map_err(|source| SourceError::Parse {
        body: truncate(body, MAX_ERROR_BODY_LEN).to_owned(),
        source,
    })
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub(crate) fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
