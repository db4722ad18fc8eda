// SPDX-License-Identifier: AGPL-3.0
// Rick Catalog CLI - Application State

use rick_catalog_core::{
    AppError, AppSettings, CatalogClient, FavoritesStore, FileKeyValueStore, KeyValueStorage,
    MemoryKeyValueStore, SettingsStore,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line overrides applied on top of stored settings
pub struct StateOptions {
    pub api_url: Option<String>,
    pub config_dir: Option<PathBuf>,
    pub ephemeral: bool,
}

/// Everything a command needs. The HTTP client is only built on demand,
/// so offline commands work even with a broken API address.
pub struct AppState {
    settings_store: Option<SettingsStore>,
    api_url_override: Option<String>,
    pub favorites: FavoritesStore,
}

impl AppState {
    /// Create application state with all stores initialized
    pub fn new(options: StateOptions) -> Result<Self, AppError> {
        let (settings_store, storage) = if options.ephemeral {
            let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryKeyValueStore::new());
            (None, storage)
        } else {
            let (settings_store, file_store) = match &options.config_dir {
                Some(dir) => (
                    SettingsStore::open(dir.join("settings.json"))?,
                    FileKeyValueStore::open(dir.join("defaults.json"))?,
                ),
                None => (SettingsStore::new()?, FileKeyValueStore::new()?),
            };
            tracing::debug!("Using storage at {:?}", file_store.path());
            let storage: Arc<dyn KeyValueStorage> = Arc::new(file_store);
            (Some(settings_store), storage)
        };

        Ok(Self {
            settings_store,
            api_url_override: options.api_url,
            favorites: FavoritesStore::load(storage),
        })
    }

    /// Settings as persisted, without command-line overrides
    pub fn stored_settings(&self) -> AppSettings {
        self.settings_store
            .as_ref()
            .map(SettingsStore::get)
            .unwrap_or_default()
    }

    /// Settings in effect for this run
    pub fn settings(&self) -> AppSettings {
        let mut settings = self.stored_settings();
        if let Some(api_url) = &self.api_url_override {
            settings.api_base_url = api_url.clone();
        }
        settings
    }

    /// Validate and persist new settings
    pub fn save_settings(&self, settings: AppSettings) -> Result<(), AppError> {
        match &self.settings_store {
            Some(store) => store.update(settings),
            None => Err(AppError::InvalidConfig(
                "Settings are not saved in ephemeral mode".to_string(),
            )),
        }
    }

    pub fn client(&self) -> Result<CatalogClient, AppError> {
        CatalogClient::new(&self.settings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rick_catalog_core::{Character, Origin};

    fn options(dir: &tempfile::TempDir, api_url: Option<&str>) -> StateOptions {
        StateOptions {
            api_url: api_url.map(str::to_string),
            config_dir: Some(dir.path().to_path_buf()),
            ephemeral: false,
        }
    }

    fn morty() -> Character {
        Character {
            id: 2,
            name: "Morty Smith".to_string(),
            status: Some("Alive".to_string()),
            species: Some("Human".to_string()),
            gender: "Male".to_string(),
            origin: Origin {
                name: "unknown".to_string(),
                url: None,
            },
            image: None,
            episode: Vec::new(),
        }
    }

    #[test]
    fn test_bad_api_url_only_breaks_network_commands() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(options(&dir, Some("not a url"))).unwrap();

        assert!(state.favorites.toggle(&morty()).unwrap());
        assert_eq!(state.favorites.list().len(), 1);
        assert!(matches!(state.client(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_override_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(options(&dir, Some("http://localhost:9000/api"))).unwrap();

        assert_eq!(state.settings().api_base_url, "http://localhost:9000/api");
        assert_eq!(state.stored_settings(), AppSettings::default());
    }

    #[test]
    fn test_saved_settings_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(options(&dir, None)).unwrap();
        let settings = AppSettings {
            api_base_url: "http://localhost:9000/api".to_string(),
            ..AppSettings::default()
        };
        state.save_settings(settings.clone()).unwrap();

        let restarted = AppState::new(options(&dir, None)).unwrap();
        assert_eq!(restarted.settings(), settings);
    }

    #[test]
    fn test_ephemeral_state_refuses_to_save_settings() {
        let state = AppState::new(StateOptions {
            api_url: None,
            config_dir: None,
            ephemeral: true,
        })
        .unwrap();

        assert!(state.save_settings(AppSettings::default()).is_err());
        assert!(state.client().is_ok());
    }
}
