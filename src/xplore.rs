//! IEEE Xplore search API client.
//!
//! One call fetches one page of results. Parameter order in the request URL
//! is fixed (`querytext`, `start_year`, `max_records`, `start_record`,
//! `apikey`) and the key always comes last.

use crate::error::{Result, XploreError};
use crate::query::{build_field_scoped_query, FieldMask};
use crate::record::SearchResult;
use async_trait::async_trait;
use reqwest::Client;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::{Host, Url};

/// Search endpoint of the public API
pub const IEEE_SEARCH_URL: &str = "https://ieeexploreapi.ieee.org/api/v1/search/articles";

/// Largest page the API will return
pub const MAX_RECORDS_LIMIT: u32 = 200;

const USER_AGENT: &str = "Mozilla/5.0";

/// Everything about a query except the page cursor
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Unencoded search phrase
    pub query: String,
    pub field_mask: FieldMask,
    /// Operator joining field clauses, e.g. `" OR "`
    pub operator: String,
    /// Only records published in or after this year
    pub start_year: Option<i32>,
    /// Page size, 1..=200
    pub max_records: u32,
    /// Append each raw response body here
    pub raw_dump: Option<PathBuf>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>, field_mask: FieldMask) -> Self {
        Self {
            query: query.into(),
            field_mask,
            operator: crate::query::OR.to_string(),
            start_year: None,
            max_records: 25,
            raw_dump: None,
        }
    }
}

/// Source of search result pages
#[async_trait]
pub trait SearchApi {
    /// Fetch the page beginning at the 1-based `start_record`.
    async fn search(&self, params: &SearchParams, start_record: u32) -> Result<SearchResult>;
}

/// HTTP client for the search endpoint
pub struct XploreClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl XploreClient {
    /// Client for the public endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(IEEE_SEARCH_URL, api_key)
    }

    /// Client for a custom endpoint (mirror or test server)
    pub fn with_endpoint(endpoint: &str, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| XploreError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        // A local mirror is never reached through the system proxy
        if is_loopback(&endpoint) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| XploreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Build the request URL for one page.
    pub fn build_search_url(&self, params: &SearchParams, start_record: u32) -> Result<String> {
        build_search_url(self.endpoint.as_str(), &self.api_key, params, start_record)
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let text = response.text().await.unwrap_or_default();
            return Err(XploreError::Auth(format!("{}: {}", status, text.trim())));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), error = %text, "API error");
            return Err(XploreError::Api {
                code: status.as_u16() as i32,
                message: format!("IEEE Xplore API error: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl SearchApi for XploreClient {
    async fn search(&self, params: &SearchParams, start_record: u32) -> Result<SearchResult> {
        let url = self.build_search_url(params, start_record)?;
        debug!(
            query = %params.query,
            start_record = start_record,
            max_records = params.max_records,
            "Fetching IEEE Xplore page"
        );

        let body = self.fetch_page(&url).await?;

        if let Some(path) = &params.raw_dump {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", body.trim_end())?;
        }

        let page = parse_body(&body, &params.query)?;
        info!(
            start_record = start_record,
            count = page.articles.len(),
            total = page.total_records,
            "Parsed IEEE Xplore page"
        );
        Ok(page)
    }
}

/// Build the request URL for one page of `params`.
fn build_search_url(
    endpoint: &str,
    api_key: &str,
    params: &SearchParams,
    start_record: u32,
) -> Result<String> {
    if !(1..=MAX_RECORDS_LIMIT).contains(&params.max_records) {
        return Err(XploreError::InvalidInput(format!(
            "max_records must be between 1 and {}, got {}",
            MAX_RECORDS_LIMIT, params.max_records
        )));
    }
    if start_record < 1 {
        return Err(XploreError::InvalidInput("start_record is 1-based".into()));
    }

    // querytext is already encoded clause by clause
    let mut url = format!(
        "{}?querytext={}",
        endpoint,
        build_field_scoped_query(&params.query, &params.field_mask, &params.operator)
    );

    if let Some(year) = params.start_year {
        url.push_str(&format!("&start_year={}", urlencoding::encode(&year.to_string())));
    }

    url.push_str(&format!(
        "&max_records={}&start_record={}&apikey={}",
        urlencoding::encode(&params.max_records.to_string()),
        urlencoding::encode(&start_record.to_string()),
        urlencoding::encode(api_key)
    ));

    Ok(url)
}

/// Decode a response body, rejecting empty and null payloads.
///
/// An inactive or unauthorized key gets a plain-text or HTML page instead of
/// JSON, so the key phrases are only looked for when the body does not parse.
pub fn parse_body(body: &str, query: &str) -> Result<SearchResult> {
    let body = body.trim();
    if body.is_empty() {
        return Err(XploreError::EmptyResult(format!("no data returned for query '{}'", query)));
    }

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if is_auth_rejection(body) => {
            return Err(XploreError::Auth(format!("API key rejected: {}", body)));
        }
        Err(e) => {
            return Err(XploreError::Parse(format!("Failed to parse IEEE Xplore response: {}", e)));
        }
    };

    let is_empty = match &value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(XploreError::EmptyResult(format!("no data returned for query '{}'", query)));
    }

    Ok(serde_json::from_value(value)?)
}

fn is_auth_rejection(body: &str) -> bool {
    body.contains("Developer Inactive") || body.contains("Not Authorized")
}

fn is_loopback(endpoint: &Url) -> bool {
    match endpoint.host() {
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        Some(Host::Domain(domain)) => domain == "localhost",
        None => false,
    }
}
