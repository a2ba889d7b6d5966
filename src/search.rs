use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};

use crate::models::MovieSummary;
use crate::provider::MovieProvider;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("No movies found. Try a different search term.")]
    NoResults,
    #[error("Failed to search movies. Please try again.")]
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub results: Vec<MovieSummary>,
    pub loading: bool,
    pub error: Option<SearchError>,
    pub search_performed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query; nothing was requested.
    Rejected,
    Found(usize),
    NoResults,
    Failed,
}

pub struct SearchFlow {
    provider: Arc<dyn MovieProvider>,
    state: watch::Sender<SearchState>,
}

impl SearchFlow {
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self { provider, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn results(&self) -> Vec<MovieSummary> {
        self.state.borrow().results.clone()
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Rejected;
        }

        self.state.send_modify(|s| {
            s.error = None;
            s.loading = true;
            s.search_performed = true;
        });

        let (results, error, outcome) = match self.provider.search_movies(query).await {
            Ok(page) if page.results.is_empty() => {
                info!("No results for '{}'", query);
                (Vec::new(), Some(SearchError::NoResults), SearchOutcome::NoResults)
            }
            Ok(page) => {
                info!(
                    "Search '{}' returned {} of {} results",
                    query,
                    page.results.len(),
                    page.total_results
                );
                let count = page.results.len();
                (page.results, None, SearchOutcome::Found(count))
            }
            Err(e) => {
                error!("Search error for '{}': {:#}", query, e);
                (Vec::new(), Some(SearchError::Failed), SearchOutcome::Failed)
            }
        };

        self.state.send_modify(|s| {
            s.results = results;
            s.error = error;
            s.loading = false;
        });
        outcome
    }
}
