//! SuperSearch facet client.

use std::time::Duration;

use async_trait::async_trait;
use nocrash_core::config::SocorroSettings;
use nocrash_core::{CrashOccurrenceService, FacetQuery, FacetResponse, FacetTerm};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{SocorroError, SocorroResult};

const USER_AGENT: &str = concat!("nocrash/", env!("CARGO_PKG_VERSION"));

/// Subset of the SuperSearch response used here. `hits` is ignored since
/// searches request zero rows.
#[derive(Debug, Deserialize)]
struct SuperSearchResponse {
    #[serde(default)]
    facets: Facets,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Facets {
    #[serde(default)]
    signature: Vec<FacetTerm>,
}

impl From<SuperSearchResponse> for FacetResponse {
    fn from(response: SuperSearchResponse) -> Self {
        let errors = response
            .errors
            .into_iter()
            .map(|e| match e {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        Self {
            errors,
            signatures: response.facets.signature,
        }
    }
}

/// Query pairs for a facet-only search over exact signatures.
#[must_use]
pub fn supersearch_params(query: &FacetQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("date".to_string(), format!(">={}", query.date_from)),
        ("date".to_string(), format!("<{}", query.date_to)),
    ];
    params.extend(
        query
            .signatures
            .iter()
            .map(|s| ("signature".to_string(), format!("={s}"))),
    );
    params.push(("_results_number".into(), "0".into()));
    params.push(("_facets".into(), "signature".into()));
    params.push(("_facets_size".into(), query.facet_size.to_string()));
    params
}

/// Client for one Socorro instance.
#[derive(Debug, Clone)]
pub struct SuperSearchClient {
    http: reqwest::Client,
    search_url: Url,
}

impl SuperSearchClient {
    /// Build a client from settings.
    pub fn new(settings: &SocorroSettings) -> SocorroResult<Self> {
        let base = settings.url.trim_end_matches('/');
        let search_url = Url::parse(&format!("{base}/api/SuperSearch/"))
            .map_err(|e| SocorroError::Config(format!("invalid url {}: {e}", settings.url)))?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;

        Ok(Self { http, search_url })
    }

    #[must_use]
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Run one facet search.
    #[instrument(skip(self, query), fields(signatures = query.signatures.len(), facet_size = query.facet_size))]
    pub async fn facets(&self, query: &FacetQuery) -> SocorroResult<FacetResponse> {
        let response = self
            .http
            .get(self.search_url.clone())
            .query(&supersearch_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SocorroError::Status {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        let body = response.text().await?;
        let parsed: SuperSearchResponse = serde_json::from_str(&body)?;
        let facets = FacetResponse::from(parsed);
        debug!(
            crashed = facets.signatures.len(),
            errors = facets.errors.len(),
            "facet search complete"
        );
        Ok(facets)
    }
}

#[async_trait]
impl CrashOccurrenceService for SuperSearchClient {
    async fn signature_facets(&self, query: &FacetQuery) -> nocrash_core::Result<FacetResponse> {
        Ok(self.facets(query).await?)
    }
}
