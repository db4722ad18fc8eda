// SPDX-License-Identifier: AGPL-3.0
// Rick Catalog Core - Shared logic for all front ends
//
// This crate provides:
// - Character/Episode records, AppSettings and AppError types
// - CatalogClient for the remote catalog API
// - Concurrent episode aggregation for a character
// - Key-value storage, FavoritesStore and SettingsStore
// - Screen state (listing, character detail)
//
// Front-end specific code lives in separate crates.

pub mod aggregator;
pub mod client;
pub mod favorites;
pub mod settings;
pub mod state;
pub mod storage;
pub mod types;

// Re-export commonly used items
pub use aggregator::{load_episodes, EpisodeFailure, EpisodeLoad, EpisodeSource};
pub use client::CatalogClient;
pub use favorites::{FavoritesStore, FAVORITES_KEY};
pub use settings::SettingsStore;
pub use state::{CharacterDetail, CharacterDirectory, EpisodesView};
pub use storage::{FileKeyValueStore, KeyValueStorage, MemoryKeyValueStore};
pub use types::{AppError, AppSettings, Character, CharacterPage, Episode, Origin, PageInfo};

// Re-exported so front ends can cancel loads without their own dependency
pub use tokio_util::sync::CancellationToken;
