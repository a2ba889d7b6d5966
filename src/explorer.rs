use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

use crate::enrichment::DetailEnrichment;
use crate::favorites::{FavoritesError, FavoritesStore};
use crate::models::{FavoriteEntry, MovieDetail};
use crate::provider::MovieProvider;
use crate::render;
use crate::search::{SearchFlow, SearchOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Search,
    Favorites,
}

#[derive(Debug, Error, PartialEq)]
pub enum ExplorerError {
    #[error("No movie selected")]
    NoSelection,
    #[error("No movie at position {0}")]
    InvalidIndex(usize),
    #[error(transparent)]
    Favorites(#[from] FavoritesError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Added(FavoriteEntry),
    Updated,
}

/// One client session: search results, the open detail view, and the favorites store.
pub struct Explorer {
    favorites: Arc<FavoritesStore>,
    search: SearchFlow,
    details: Arc<DetailEnrichment>,
    tab: Tab,
}

impl Explorer {
    pub fn new(provider: Arc<dyn MovieProvider>, favorites: Arc<FavoritesStore>) -> Self {
        Self {
            favorites,
            search: SearchFlow::new(provider.clone()),
            details: Arc::new(DetailEnrichment::new(provider)),
            tab: Tab::default(),
        }
    }

    pub fn favorites(&self) -> &Arc<FavoritesStore> {
        &self.favorites
    }

    pub fn search_flow(&self) -> &SearchFlow {
        &self.search
    }

    pub fn details(&self) -> &Arc<DetailEnrichment> {
        &self.details
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub async fn search(&mut self, query: &str) -> SearchOutcome {
        self.tab = Tab::Search;
        self.search.search(query).await
    }

    /// Search results on the search tab, favorite snapshots on the favorites tab.
    pub async fn displayed_movies(&self) -> Vec<MovieDetail> {
        match self.tab {
            Tab::Search => self
                .search
                .results()
                .into_iter()
                .map(MovieDetail::from)
                .collect(),
            Tab::Favorites => self
                .favorites
                .list()
                .await
                .into_iter()
                .map(|f| f.movie)
                .collect(),
        }
    }

    /// Select by zero-based position in the displayed list.
    pub async fn select(&self, index: usize) -> Result<Option<JoinHandle<bool>>, ExplorerError> {
        let movie = self
            .displayed_movies()
            .await
            .into_iter()
            .nth(index)
            .ok_or_else(|| ExplorerError::InvalidIndex(index.saturating_add(1)))?;
        Ok(self.select_movie(movie))
    }

    pub fn select_movie(&self, movie: impl Into<MovieDetail>) -> Option<JoinHandle<bool>> {
        self.details.select_and_fetch(movie)
    }

    pub fn close_details(&self) {
        self.details.close();
    }

    /// Update the favorite if the selected movie already is one, else add whatever record
    /// is in hand without waiting for a pending detail request.
    pub async fn save_selected(
        &self,
        rating: u8,
        note: impl Into<String>,
    ) -> Result<SaveOutcome, ExplorerError> {
        let movie = self
            .details
            .current_movie()
            .ok_or(ExplorerError::NoSelection)?;
        if self.favorites.is_favorite(movie.id()).await {
            self.favorites.update(movie.id(), rating, note).await?;
            return Ok(SaveOutcome::Updated);
        }
        let entry = self.favorites.add(movie, rating, note).await?;
        Ok(SaveOutcome::Added(entry))
    }

    /// Remove the selected movie from favorites and close the detail view.
    pub async fn remove_selected(&self) -> Result<bool, ExplorerError> {
        let movie = self
            .details
            .current_movie()
            .ok_or(ExplorerError::NoSelection)?;
        let removed = self.favorites.remove(movie.id()).await;
        self.details.close();
        if removed {
            info!("Removed '{}' via detail view", movie.title());
        }
        Ok(removed)
    }

    pub async fn render_list(&self) -> String {
        let favorites = self.favorites.list().await;
        let mut sections = vec![render::tabs(self.tab, favorites.len())];

        match self.tab {
            Tab::Search => {
                let state = self.search.state();
                if state.loading {
                    sections.push("Searching...".to_string());
                }
                if let Some(notice) = render::search_notice(&state) {
                    sections.push(notice);
                }
                if !state.results.is_empty() {
                    sections.push(render::movie_list(&state.results, |id| {
                        favorites.iter().any(|f| f.id() == id)
                    }));
                }
            }
            Tab::Favorites => {
                let loaded = self.favorites.is_loaded().await;
                if let Some(notice) = render::favorites_notice(loaded, favorites.len()) {
                    sections.push(notice.to_string());
                }
                for (i, fav) in favorites.iter().enumerate() {
                    sections.push(render::favorite_line(i, fav));
                }
            }
        }
        sections.join("\n")
    }

    pub async fn render_details(&self) -> Option<String> {
        let view = self.details.view()?;
        let favorite = self.favorites.get(view.movie.id()).await;
        Some(render::detail_view(&view, favorite.as_ref()))
    }
}
