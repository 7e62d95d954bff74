use std::sync::Arc;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::credentials::CredentialProvider;
use crate::models::{CatalogItem, Envelope};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

// Tunable request constants; adjusting them does not change the
// contract of any call.
const LISTING_PART: &str = "snippet";
const LISTING_MAX_RESULTS: u32 = 50;
const DETAIL_PART: &str = "contentDetails,statistics";
const SEARCH_PART: &str = "snippet";
const SEARCH_MAX_RESULTS: u32 = 16;
const SEARCH_ORDER: &str = "date";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("api response missing items")]
    MissingItems,
    #[error("no results for query")]
    NotFound,
}

/// The two envelopes that make up one enriched page: the listing (or
/// search) response and the batched detail response for the content ids
/// it mentioned. Merging them is the cache's job, not the fetcher's.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub listing: Envelope,
    pub detail: Envelope,
}

#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl CatalogClient {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Result<Self, CatalogError> {
        Self::with_base_url(DEFAULT_BASE_URL, credentials)
    }

    pub fn with_base_url(
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            credentials,
        })
    }

    /// Fetch one enriched page: the listing call with the given
    /// continuation token, then the batched detail call for the content
    /// ids the listing produced. Listing items without a resolvable
    /// content id are skipped, never fatal.
    pub async fn fetch_page(&self, page_token: Option<&str>) -> Result<CatalogPage, CatalogError> {
        let listing = self.list_catalog(page_token).await?;
        let ids = collect_content_ids(listing.items());
        let detail = self.fetch_details(&ids).await?;
        Ok(CatalogPage { listing, detail })
    }

    /// Free-text search followed by the same batched detail call.
    /// A query that yields zero items is `NotFound`, which callers
    /// treat as "no results" rather than a failure.
    pub async fn search(&self, query: &str) -> Result<CatalogPage, CatalogError> {
        let results = self.search_catalog(query).await?;
        if results.items().is_empty() {
            return Err(CatalogError::NotFound);
        }
        let ids = collect_content_ids(results.items());
        let detail = self.fetch_details(&ids).await?;
        Ok(CatalogPage {
            listing: results,
            detail,
        })
    }

    async fn list_catalog(&self, page_token: Option<&str>) -> Result<Envelope, CatalogError> {
        let mut url = self.endpoint("/youtube/v3/playlistItems")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("part", LISTING_PART);
            query.append_pair("maxResults", &LISTING_MAX_RESULTS.to_string());
            query.append_pair("playlistId", &self.credentials.playlist_id());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
            query.append_pair("key", &self.credentials.api_key());
        }
        self.get_envelope(url).await
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Envelope, CatalogError> {
        if ids.is_empty() {
            return Ok(Envelope::empty());
        }
        let mut url = self.endpoint("/youtube/v3/videos")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("part", DETAIL_PART);
            query.append_pair("id", &ids.join(","));
            query.append_pair("key", &self.credentials.api_key());
        }
        self.get_envelope(url).await
    }

    async fn search_catalog(&self, text: &str) -> Result<Envelope, CatalogError> {
        let mut url = self.endpoint("/youtube/v3/search")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("part", SEARCH_PART);
            query.append_pair("maxResults", &SEARCH_MAX_RESULTS.to_string());
            query.append_pair("order", SEARCH_ORDER);
            query.append_pair("type", "video");
            query.append_pair("channelId", &self.credentials.channel_id());
            query.append_pair("q", text);
            query.append_pair("key", &self.credentials.api_key());
        }
        self.get_envelope(url).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_envelope(&self, url: Url) -> Result<Envelope, CatalogError> {
        let response = self.http.get(url).send().await?;
        let envelope = Self::handle_response(response).await?;
        if envelope.items.is_none() {
            return Err(CatalogError::MissingItems);
        }
        Ok(envelope)
    }

    async fn handle_response(response: reqwest::Response) -> Result<Envelope, CatalogError> {
        if response.status().is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(CatalogError::Api { status, body })
        }
    }
}

fn collect_content_ids(items: &[CatalogItem]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if let Some(id) = item.content_id()
            && !ids.iter().any(|existing| existing == id)
        {
            ids.push(id.to_string());
        }
    }
    ids
}
