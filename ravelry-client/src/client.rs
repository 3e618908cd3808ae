//! HTTP client for the Ravelry pattern endpoints.
//!
//! - `GET {api}/patterns/search.json`: paged keyword search
//! - `GET {api}/patterns.json?ids=1+2+3`: batch detail fetch
//! - `GET {api}/patterns/{id}.json`: single detail fetch
//!
//! Every call uses HTTP basic auth. Non-2xx responses become
//! [`RavelryError::HttpStatus`]; nothing is retried.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::RavelryConfig;
use crate::errors::RavelryError;

/// Largest `page_size` the search endpoint accepts.
pub const MAX_PAGE_SIZE: usize = 100;

/// One search call.
#[derive(Clone, Debug, Default)]
pub struct SearchRequest {
    /// Free-text query; omitted from the request when `None`.
    pub query: Option<String>,
    /// Extra search parameters (e.g. `pc` = pattern category). Override defaults.
    pub filters: BTreeMap<String, String>,
    /// 1-based page number.
    pub page: u32,
    /// Items per page, capped at [`MAX_PAGE_SIZE`].
    pub page_size: usize,
}

impl SearchRequest {
    /// Query-string pairs in request order.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params: BTreeMap<String, String> = BTreeMap::new();
        if let Some(q) = &self.query {
            params.insert("query".into(), q.clone());
        }
        params.insert("page".into(), self.page.max(1).to_string());
        params.insert(
            "page_size".into(),
            self.page_size.clamp(1, MAX_PAGE_SIZE).to_string(),
        );
        params.insert("craft".into(), "knitting".into());
        for (k, v) in &self.filters {
            params.insert(k.clone(), v.clone());
        }
        params.into_iter().collect()
    }
}

/// Ids returned by one search page plus paginator info.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchPage {
    pub ids: Vec<u64>,
    pub page: u32,
    pub page_count: u32,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(default)]
    patterns: Vec<SearchHit>,
    #[serde(default)]
    paginator: Option<Paginator>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: u64,
}

#[derive(Deserialize)]
struct Paginator {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    page_count: Option<u32>,
}

impl SearchPage {
    /// Parses a search response body.
    ///
    /// # Errors
    /// [`RavelryError::Decode`] when `patterns` entries lack a numeric `id`.
    pub fn from_body(body: Value, requested_page: u32) -> Result<Self, RavelryError> {
        let body: SearchBody = serde_json::from_value(body)
            .map_err(|e| RavelryError::Decode(format!("search response: {e}")))?;
        let paginator = body.paginator.unwrap_or(Paginator {
            page: None,
            page_count: None,
        });
        Ok(Self {
            ids: body.patterns.into_iter().map(|p| p.id).collect(),
            page: paginator.page.unwrap_or(requested_page),
            page_count: paginator.page_count.unwrap_or(1),
        })
    }
}

/// Builds the batch detail URL with literal `+` between ids.
pub(crate) fn details_url(api_url: &str, ids: &[u64]) -> String {
    let joined = ids
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("+");
    format!("{}/patterns.json?ids={joined}", api_url.trim_end_matches('/'))
}

/// Thin Ravelry API client.
pub struct RavelryClient {
    http: reqwest::Client,
    cfg: RavelryConfig,
}

impl RavelryClient {
    /// Creates a client for the given config.
    ///
    /// # Errors
    /// [`RavelryError::InvalidUrl`] for a bad API URL, [`RavelryError::Transport`]
    /// if the HTTP client cannot be built.
    pub fn new(cfg: RavelryConfig) -> Result<Self, RavelryError> {
        cfg.validate()?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, cfg })
    }

    /// Paged keyword search; returns pattern ids of the requested page.
    #[instrument(skip_all, fields(page = req.page, page_size = req.page_size))]
    pub async fn search_patterns(&self, req: &SearchRequest) -> Result<SearchPage, RavelryError> {
        let url = format!("{}/patterns/search.json", self.base());
        let params = req.params();
        debug!("GET {url} params={params:?}");

        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.cfg.username, Some(&self.cfg.password))
            .query(&params)
            .send()
            .await?;
        let body = json_or_status(resp, &url).await?;
        SearchPage::from_body(body, req.page.max(1))
    }

    /// Batch detail fetch for `ids`; returns the raw `{"patterns": {...}}` body.
    ///
    /// An empty id list returns an empty mapping without calling upstream.
    #[instrument(skip_all, fields(ids = ids.len()))]
    pub async fn pattern_details(&self, ids: &[u64]) -> Result<Value, RavelryError> {
        if ids.is_empty() {
            return Ok(serde_json::json!({ "patterns": {} }));
        }
        let url = details_url(&self.cfg.api_url, ids);
        debug!("GET {url}");

        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.cfg.username, Some(&self.cfg.password))
            .send()
            .await?;
        json_or_status(resp, &url).await
    }

    /// Single pattern detail; returns the raw `{"pattern": {...}}` body.
    #[instrument(skip(self))]
    pub async fn pattern_detail(&self, id: u64) -> Result<Value, RavelryError> {
        let url = format!("{}/patterns/{id}.json", self.base());
        debug!("GET {url}");

        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.cfg.username, Some(&self.cfg.password))
            .send()
            .await?;
        json_or_status(resp, &url).await
    }

    fn base(&self) -> &str {
        self.cfg.api_url.trim_end_matches('/')
    }
}

async fn json_or_status(resp: reqwest::Response, url: &str) -> Result<Value, RavelryError> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(RavelryError::HttpStatus {
            status,
            url: url.to_string(),
            snippet: text.chars().take(240).collect(),
        });
    }
    resp.json::<Value>()
        .await
        .map_err(|e| RavelryError::Decode(format!("{url}: {e}")))
}
