// SPDX-License-Identifier: AGPL-3.0
// Rick Catalog Core - HTTP client for the catalog API
//
// Every request is a plain GET that decodes a JSON body. Failures are not
// retried; the caller decides what to show.

use crate::aggregator::EpisodeSource;
use crate::types::{AppError, AppSettings, Character, CharacterPage, Episode};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::{Host, Url};

/// Parse a reference URL as handed out by the catalog.
/// Returns `None` for anything that is not an absolute http(s) URL.
pub fn parse_http_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    let fetchable = matches!(url.scheme(), "http" | "https") && url.has_host();
    fetchable.then_some(url)
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Client for the remote character/episode catalog
#[derive(Clone)]
pub struct CatalogClient {
    http_client: Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(settings: &AppSettings) -> Result<Self, AppError> {
        settings.validate()?;
        let base_url = settings.base_url()?;

        let mut builder =
            Client::builder().connect_timeout(Duration::from_secs(settings.connect_timeout_secs));
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        // Local mirrors are never reached through a proxy
        if is_loopback(&base_url) {
            builder = builder.no_proxy();
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}`
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::InvalidUrl(format!("Cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a URL and decode its JSON body
    pub async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "{} returned status {}",
                url, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response from {}: {}", url, e)))?;

        if body.is_empty() {
            return Err(AppError::NoData(url.to_string()));
        }

        serde_json::from_slice(&body)
            .map_err(|e| AppError::Decode(format!("Failed to parse response from {}: {}", url, e)))
    }

    /// Fetch one page of the character listing. `None` fetches the first page.
    pub async fn list_characters(&self, page: Option<u32>) -> Result<CharacterPage, AppError> {
        let mut url = self.endpoint(&["character"])?;
        if let Some(page) = page {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }

        let page = self.fetch::<CharacterPage>(url).await?;
        tracing::info!(
            "Fetched {} characters ({} total)",
            page.results.len(),
            page.info.count
        );
        Ok(page)
    }

    pub async fn get_character(&self, id: u32) -> Result<Character, AppError> {
        let url = self.endpoint(&["character", &id.to_string()])?;
        self.fetch(url).await
    }

    pub async fn get_episode(&self, id: u32) -> Result<Episode, AppError> {
        let url = self.endpoint(&["episode", &id.to_string()])?;
        self.fetch(url).await
    }

    /// Fetch an episode from one of a character's reference URLs
    pub async fn get_episode_by_url(&self, url: &str) -> Result<Episode, AppError> {
        let url = parse_http_url(url).ok_or_else(|| AppError::InvalidUrl(url.to_string()))?;
        self.fetch(url).await
    }
}

#[async_trait]
impl EpisodeSource for CatalogClient {
    async fn fetch_episode(&self, url: &Url) -> Result<Episode, AppError> {
        self.fetch(url.clone()).await
    }
}
