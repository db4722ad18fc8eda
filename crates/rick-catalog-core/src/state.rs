// SPDX-License-Identifier: AGPL-3.0
// Rick Catalog Core - Screen state shared by front ends

use crate::aggregator::{load_episodes, EpisodeLoad, EpisodeSource};
use crate::client::CatalogClient;
use crate::types::{AppError, Character, Episode, PageInfo};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Character listing screen
#[derive(Debug, Default)]
pub struct CharacterDirectory {
    pub characters: Vec<Character>,
    pub page_info: Option<PageInfo>,
    pub is_loading: bool,
    pub on_error: bool,
}

impl CharacterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a page of characters. On failure only the error flag is set.
    pub async fn refresh(&mut self, client: &CatalogClient, page: Option<u32>) {
        self.is_loading = true;
        self.on_error = false;

        match client.list_characters(page).await {
            Ok(page) => {
                self.characters = page.results;
                self.page_info = Some(page.info);
            }
            Err(e) => {
                tracing::warn!("Failed to load characters: {}", e);
                self.on_error = true;
            }
        }

        self.is_loading = false;
    }
}

/// What the episode section of a character detail shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodesView {
    Loading,
    Failed(String),
    Empty,
    Loaded(Vec<Episode>),
}

impl EpisodesView {
    pub fn is_loading(&self) -> bool {
        matches!(self, EpisodesView::Loading)
    }
}

impl From<&EpisodeLoad> for EpisodesView {
    fn from(load: &EpisodeLoad) -> Self {
        if let Some(error) = load.error() {
            EpisodesView::Failed(error.user_message().to_string())
        } else if load.episodes.is_empty() {
            EpisodesView::Empty
        } else {
            EpisodesView::Loaded(load.episodes.clone())
        }
    }
}

/// Character detail screen: the character plus its episodes
#[derive(Debug)]
pub struct CharacterDetail {
    pub character: Character,
    pub episodes: EpisodesView,
    load: Option<EpisodeLoad>,
}

impl CharacterDetail {
    pub fn new(character: Character) -> Self {
        Self {
            character,
            episodes: EpisodesView::Loading,
            load: None,
        }
    }

    /// The raw aggregation result once loading has finished
    pub fn episode_load(&self) -> Option<&EpisodeLoad> {
        self.load.as_ref()
    }

    /// Load the character's episodes.
    ///
    /// Leaves the Loading state at most once. A cancelled load leaves the
    /// state untouched; calling this again after it finished does nothing.
    pub async fn load(
        &mut self,
        source: Arc<dyn EpisodeSource>,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        if !self.episodes.is_loading() {
            return Ok(());
        }

        let load = load_episodes(source, &self.character.episode, cancel).await?;
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        self.episodes = EpisodesView::from(&load);
        self.load = Some(load);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::EpisodeFailure;
    use crate::types::Origin;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    fn pilot() -> Episode {
        Episode {
            id: 1,
            name: "Pilot".to_string(),
            air_date: "Dec 2, 2013".to_string(),
            episode: "S01E01".to_string(),
        }
    }

    fn rick(episodes: &[&str]) -> Character {
        Character {
            id: 1,
            name: "Rick Sanchez".to_string(),
            status: None,
            species: None,
            gender: "Male".to_string(),
            origin: Origin {
                name: "Earth (C-137)".to_string(),
                url: None,
            },
            image: None,
            episode: episodes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Serves episode 1, fails everything else
    #[derive(Default)]
    struct PilotOnly {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EpisodeSource for PilotOnly {
        async fn fetch_episode(&self, url: &Url) -> Result<Episode, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.path().ends_with("/episode/1") {
                Ok(pilot())
            } else {
                Err(AppError::Network(format!("{} unreachable", url)))
            }
        }
    }

    #[tokio::test]
    async fn test_partial_failure_shows_error() {
        let mut detail = CharacterDetail::new(rick(&[
            "https://rickandmortyapi.com/api/episode/1",
            "https://rickandmortyapi.com/api/episode/2",
        ]));
        assert!(detail.episodes.is_loading());

        detail
            .load(Arc::new(PilotOnly::default()), &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(detail.episodes, EpisodesView::Failed(_)));
        let load = detail.episode_load().unwrap();
        assert_eq!(load.episodes, vec![pilot()]);
        assert!(load.error().is_some());
    }

    #[tokio::test]
    async fn test_load_finishes_once() {
        let source = Arc::new(PilotOnly::default());
        let mut detail = CharacterDetail::new(rick(&["https://rickandmortyapi.com/api/episode/1"]));

        detail.load(source.clone(), &CancellationToken::new()).await.unwrap();
        assert_eq!(detail.episodes, EpisodesView::Loaded(vec![pilot()]));

        detail.load(source.clone(), &CancellationToken::new()).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_episodes_is_empty() {
        let mut detail = CharacterDetail::new(rick(&["::not-a-url::"]));
        detail
            .load(Arc::new(PilotOnly::default()), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(detail.episodes, EpisodesView::Empty);
    }

    #[tokio::test]
    async fn test_cancelled_load_leaves_state_untouched() {
        let mut detail = CharacterDetail::new(rick(&["https://rickandmortyapi.com/api/episode/1"]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = detail.load(Arc::new(PilotOnly::default()), &cancel).await;

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(detail.episodes.is_loading());
        assert!(detail.episode_load().is_none());
    }

    #[test]
    fn test_view_from_load_prefers_error() {
        let load = EpisodeLoad {
            episodes: vec![pilot()],
            failures: vec![EpisodeFailure {
                url: "https://rickandmortyapi.com/api/episode/2".to_string(),
                error: AppError::Decode("bad json".to_string()),
            }],
            dispatched: 2,
            skipped: 0,
        };
        assert_eq!(
            EpisodesView::from(&load),
            EpisodesView::Failed(AppError::Decode(String::new()).user_message().to_string())
        );
    }
}
