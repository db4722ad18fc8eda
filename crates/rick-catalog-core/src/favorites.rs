// SPDX-License-Identifier: AGPL-3.0
// Rick Catalog Core - Favorite characters
//
// Favorites live in memory and are mirrored to key-value storage as one
// JSON blob, rewritten on every change.

use crate::storage::KeyValueStorage;
use crate::types::{AppError, Character};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Storage key of the encoded favorites collection
pub const FAVORITES_KEY: &str = "favoriteCharacters";

/// Favorite characters, in the order they were added
pub struct FavoritesStore {
    favorites: RwLock<Vec<Character>>,
    storage: Arc<dyn KeyValueStorage>,
}

impl FavoritesStore {
    /// Load favorites from storage. A missing or unreadable blob yields an empty collection.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let favorites = match storage.get(FAVORITES_KEY) {
            Ok(Some(blob)) => decode(&blob),
            Ok(None) => {
                tracing::info!("No favorites stored yet");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to read favorites, starting empty: {}", e);
                Vec::new()
            }
        };

        tracing::info!("Loaded {} favorite characters", favorites.len());

        Self {
            favorites: RwLock::new(favorites),
            storage,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Character>> {
        self.favorites.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add the character if absent, remove it if present, then persist.
    /// Returns whether the character is a favorite afterwards. If persisting
    /// fails the collection is left unchanged.
    pub fn toggle(&self, character: &Character) -> Result<bool, AppError> {
        let mut favorites = self.favorites.write().unwrap_or_else(PoisonError::into_inner);

        let mut updated = favorites.clone();
        let now_favorite = match updated.iter().position(|c| c.id == character.id) {
            Some(index) => {
                updated.remove(index);
                false
            }
            None => {
                updated.push(character.clone());
                true
            }
        };

        self.persist(&updated)?;
        *favorites = updated;

        tracing::info!(
            "Character {} ({}) {} favorites",
            character.id,
            character.name,
            if now_favorite { "added to" } else { "removed from" }
        );

        Ok(now_favorite)
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.read().iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: u32) -> Option<Character> {
        self.read().iter().find(|c| c.id == id).cloned()
    }

    /// Snapshot of all favorites in insertion order
    pub fn list(&self) -> Vec<Character> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Write the current collection to storage
    pub fn save(&self) -> Result<(), AppError> {
        let favorites = self.read();
        self.persist(&favorites)
    }

    fn persist(&self, favorites: &[Character]) -> Result<(), AppError> {
        let blob = serde_json::to_string(favorites)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize favorites: {}", e)))?;
        self.storage.set(FAVORITES_KEY, blob)
    }
}

fn decode(blob: &str) -> Vec<Character> {
    if blob.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<Character>>(blob) {
        Ok(mut favorites) => {
            // Blobs written by other clients may carry duplicates
            let mut seen = std::collections::HashSet::new();
            favorites.retain(|c| seen.insert(c.id));
            favorites
        }
        Err(e) => {
            tracing::warn!("Failed to parse favorites, starting empty: {}", e);
            Vec::new()
        }
    }
}
