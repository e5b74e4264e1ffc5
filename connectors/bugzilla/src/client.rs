//! Bugzilla REST client.

use std::time::Duration;

use async_trait::async_trait;
use nocrash_core::config::BugzillaSettings;
use nocrash_core::{BugQuery, BugQueryService, RawBug};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{BugzillaError, BugzillaResult};
use crate::params::search_params;

const USER_AGENT: &str = concat!("nocrash/", env!("CARGO_PKG_VERSION"));

/// Body of `GET /rest/bug`. Errors come back as `{"error": true, ...}`,
/// sometimes with a 200 status.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    bugs: Vec<RawBug>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: Option<String>,
}

impl SearchResponse {
    fn into_bugs(self) -> BugzillaResult<Vec<RawBug>> {
        if self.error {
            return Err(BugzillaError::Api {
                code: self.code,
                message: self.message.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(self.bugs)
    }
}

/// Paged bug search against one Bugzilla instance.
#[derive(Debug, Clone)]
pub struct BugzillaClient {
    http: reqwest::Client,
    search_url: Url,
    page_size: usize,
}

impl BugzillaClient {
    /// Build a client from settings.
    pub fn new(settings: &BugzillaSettings) -> BugzillaResult<Self> {
        let base = settings.url.trim_end_matches('/');
        let search_url = Url::parse(&format!("{base}/rest/bug"))
            .map_err(|e| BugzillaError::Config(format!("invalid url {}: {e}", settings.url)))?;
        if settings.page_size == 0 {
            return Err(BugzillaError::Config("page_size must be positive".into()));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            search_url,
            page_size: settings.page_size,
        })
    }

    /// Search endpoint URL.
    #[must_use]
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Fetch one page of results starting at `offset`.
    pub async fn search_page(&self, query: &BugQuery, offset: usize) -> BugzillaResult<Vec<RawBug>> {
        let params = search_params(query, self.page_size, offset);
        let response = self
            .http
            .get(self.search_url.clone())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<SearchResponse>(&body);
        if !status.is_success() {
            return match parsed {
                Ok(document) if document.error => document.into_bugs(),
                _ => Err(BugzillaError::Status {
                    status: status.as_u16(),
                    body: truncate(&body, 512),
                }),
            };
        }
        parsed?.into_bugs()
    }

    /// Fetch every page until a short page is returned.
    #[instrument(skip(self, query), fields(url = %self.search_url))]
    pub async fn search_all(&self, query: &BugQuery) -> BugzillaResult<Vec<RawBug>> {
        let mut bugs = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.search_page(query, offset).await?;
            let fetched = page.len();
            debug!(offset, fetched, "fetched bug page");
            bugs.extend(page);
            if fetched < self.page_size {
                break;
            }
            offset += fetched;
        }
        info!(bugs = bugs.len(), "bug search complete");
        Ok(bugs)
    }
}

#[async_trait]
impl BugQueryService for BugzillaClient {
    async fn search(&self, query: &BugQuery) -> nocrash_core::Result<Vec<RawBug>> {
        Ok(self.search_all(query).await?)
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
