// SPDX-License-Identifier: AGPL-3.0
// Rick Catalog Core - Type definitions

use serde::{Deserialize, Serialize};
use url::Url;

/// Default public catalog endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://rickandmortyapi.com/api";

/// Where a character comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A catalog character as returned by `/character/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Older favorites blobs spell this field "specie"
    #[serde(default, alias = "specie")]
    pub species: Option<String>,
    pub gender: String,
    pub origin: Origin,
    #[serde(default)]
    pub image: Option<String>,
    /// Episode reference URLs, in catalog order
    #[serde(default)]
    pub episode: Vec<String>,
}

impl Character {
    pub fn status_label(&self) -> &str {
        non_empty_or_unknown(self.status.as_deref())
    }

    pub fn species_label(&self) -> &str {
        non_empty_or_unknown(self.species.as_deref())
    }
}

fn non_empty_or_unknown(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "Unknown",
    }
}

/// A single show installment as returned by `/episode/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u32,
    pub name: String,
    pub air_date: String,
    /// Season/episode code, e.g. "S01E01"
    pub episode: String,
}

/// Paging metadata of a listing response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub count: u32,
    pub pages: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// One page of `/character`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterPage {
    pub info: PageInfo,
    pub results: Vec<Character>,
}

/// Application settings (front-end agnostic)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Base URL of the catalog API, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds. None keeps the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: None,
        }
    }
}

impl AppSettings {
    /// Parse the configured base URL
    pub fn base_url(&self) -> Result<Url, AppError> {
        let url = Url::parse(self.api_base_url.trim_end_matches('/')).map_err(|e| {
            AppError::InvalidConfig(format!("Invalid API base URL {}: {}", self.api_base_url, e))
        })?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::InvalidConfig(format!(
                "API base URL must be http(s): {}",
                self.api_base_url
            )));
        }

        Ok(url)
    }

    /// Check settings before they are applied or persisted
    pub fn validate(&self) -> Result<(), AppError> {
        self.base_url()?;
        if self.connect_timeout_secs == 0 {
            return Err(AppError::InvalidConfig(
                "Connect timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("No data in response from {0}")]
    NoData(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AppError {
    /// Generic message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(_) | AppError::NoData(_) => {
                "Could not reach the catalog. Check your connection and try again."
            }
            AppError::Decode(_) => "The catalog sent a response we could not read.",
            AppError::InvalidUrl(_) | AppError::InvalidConfig(_) => {
                "The catalog address is not configured correctly."
            }
            AppError::FileIo(_) | AppError::Serialization(_) => {
                "Local data could not be saved or loaded."
            }
            AppError::Task(_) => "Something went wrong while loading.",
            AppError::Cancelled => "Loading was cancelled.",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileIo(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}
