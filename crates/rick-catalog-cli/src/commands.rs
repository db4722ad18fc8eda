// SPDX-License-Identifier: AGPL-3.0
// Rick Catalog CLI - Command Handlers

use crate::state::AppState;
use anyhow::{bail, Context};
use rick_catalog_core::{
    AppError, AppSettings, CancellationToken, Character, CharacterDetail, CharacterDirectory,
    Episode, EpisodeSource, EpisodesView,
};
use std::sync::Arc;

fn favorite_marker(state: &AppState, id: u32) -> &'static str {
    if state.favorites.is_favorite(id) {
        "*"
    } else {
        " "
    }
}

fn print_episode_line(episode: &Episode) {
    println!("  {}  {}  (aired {})", episode.episode, episode.name, episode.air_date);
}

/// List one page of characters
pub async fn list(state: &AppState, page: Option<u32>) -> anyhow::Result<()> {
    let mut directory = CharacterDirectory::new();
    directory.refresh(&state.client()?, page).await;

    if directory.on_error {
        bail!("Failed to load characters.");
    }

    for character in &directory.characters {
        println!(
            "{} {:>4}  {}",
            favorite_marker(state, character.id),
            character.id,
            character.name
        );
    }

    if let Some(info) = &directory.page_info {
        println!(
            "\nPage {} of {} ({} characters)",
            page.unwrap_or(1),
            info.pages,
            info.count
        );
    }

    Ok(())
}

fn print_character(state: &AppState, character: &Character) {
    println!("{} {}", favorite_marker(state, character.id), character.name);
    println!("  Status:  {}", character.status_label());
    println!("  Species: {}", character.species_label());
    println!("  Gender:  {}", character.gender);
    println!("  Origin:  {}", character.origin.name);
    if let Some(image) = &character.image {
        println!("  Image:   {}", image);
    }
}

/// Show a character with its episodes. Ctrl-C abandons the episode load.
pub async fn show(state: &AppState, id: u32) -> anyhow::Result<()> {
    let client = state.client()?;
    let character = client
        .get_character(id)
        .await
        .with_context(|| format!("Failed to load character {}", id))?;

    print_character(state, &character);
    println!("\nEpisodes:");

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let source: Arc<dyn EpisodeSource> = Arc::new(client);
    let mut detail = CharacterDetail::new(character);
    let result = detail.load(source, &cancel).await;
    ctrl_c.abort();

    match result {
        Ok(()) => {}
        Err(AppError::Cancelled) => {
            println!("  Loading cancelled.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    match &detail.episodes {
        EpisodesView::Loading => println!("  Loading episodes..."),
        EpisodesView::Empty => println!("  No episodes available."),
        EpisodesView::Loaded(_) => {
            if let Some(load) = detail.episode_load() {
                for episode in load.sorted_by_id() {
                    print_episode_line(&episode);
                }
            }
        }
        EpisodesView::Failed(message) => {
            println!("  {}", message);
            if let Some(load) = detail.episode_load() {
                for failure in &load.failures {
                    tracing::debug!("{}: {}", failure.url, failure.error);
                }
                println!(
                    "  ({} of {} episodes loaded)",
                    load.episodes.len(),
                    load.dispatched
                );
            }
        }
    }

    Ok(())
}

/// Show one episode
pub async fn episode(state: &AppState, id: u32) -> anyhow::Result<()> {
    let episode = state
        .client()?
        .get_episode(id)
        .await
        .with_context(|| format!("Failed to load episode {}", id))?;

    println!("{}", episode.name);
    println!("  Aired:   {}", episode.air_date);
    println!("  Episode: {}", episode.episode);
    Ok(())
}

/// List favorites in the order they were added
pub fn favorites(state: &AppState) -> anyhow::Result<()> {
    let favorites = state.favorites.list();
    if favorites.is_empty() {
        println!("No favorite characters.");
        return Ok(());
    }

    for character in favorites {
        println!("* {:>4}  {}", character.id, character.name);
    }
    Ok(())
}

/// Add or remove a favorite. Removal works offline from the stored record.
pub async fn toggle_favorite(state: &AppState, id: u32) -> anyhow::Result<()> {
    let character = match state.favorites.get(id) {
        Some(character) => character,
        None => state
            .client()?
            .get_character(id)
            .await
            .with_context(|| format!("Failed to load character {}", id))?,
    };

    let now_favorite = state
        .favorites
        .toggle(&character)
        .context("Failed to save favorites")?;

    if now_favorite {
        println!("Added {} to favorites.", character.name);
    } else {
        println!("Removed {} from favorites.", character.name);
    }
    Ok(())
}

/// Show settings, or update and persist the given fields
pub fn config(
    state: &AppState,
    base_url: Option<String>,
    connect_timeout: Option<u64>,
    request_timeout: Option<u64>,
) -> anyhow::Result<()> {
    if base_url.is_none() && connect_timeout.is_none() && request_timeout.is_none() {
        print_settings(&state.settings());
        return Ok(());
    }

    let mut settings = state.stored_settings();
    if let Some(base_url) = base_url {
        settings.api_base_url = base_url;
    }
    if let Some(secs) = connect_timeout {
        settings.connect_timeout_secs = secs;
    }
    if let Some(secs) = request_timeout {
        // Zero clears the request timeout
        settings.request_timeout_secs = (secs > 0).then_some(secs);
    }

    state
        .save_settings(settings.clone())
        .context("Failed to save settings")?;
    println!("Settings saved.");
    print_settings(&settings);
    Ok(())
}

fn print_settings(settings: &AppSettings) {
    println!("API base URL:    {}", settings.api_base_url);
    println!("Connect timeout: {}s", settings.connect_timeout_secs);
    match settings.request_timeout_secs {
        Some(secs) => println!("Request timeout: {}s", secs),
        None => println!("Request timeout: none"),
    }
}
