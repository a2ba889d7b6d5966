//! Detail view for the selected movie.
//!
//! Selecting a movie shows the record in hand straight away and starts a detail request tagged
//! with a request id. A response is applied only while its request id is still the
//! current one, so a slow response for an earlier selection never overwrites a later one.
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::models::MovieDetail;
use crate::provider::MovieProvider;

pub const DETAILS_FAILED: &str = "Failed to load movie details";

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub request_id: u64,
    pub movie: MovieDetail,
    pub loading: bool,
    pub error: Option<String>,
}

/// Identifies one detail request; handed back to [`DetailEnrichment::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub request_id: u64,
    pub movie_id: i64,
}

pub struct DetailEnrichment {
    provider: Arc<dyn MovieProvider>,
    state: watch::Sender<Option<DetailView>>,
    // Never reset, so a response for a closed selection cannot match a later one.
    next_request: AtomicU64,
}

impl DetailEnrichment {
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            provider,
            state,
            next_request: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<DetailView>> {
        self.state.subscribe()
    }

    pub fn view(&self) -> Option<DetailView> {
        self.state.borrow().clone()
    }

    /// The record to save right now: the fetched detail if it arrived, else the selected one.
    pub fn current_movie(&self) -> Option<MovieDetail> {
        self.state.borrow().as_ref().map(|v| v.movie.clone())
    }

    /// Show `movie` and hand out a ticket for its detail request. Returns `None` when that
    /// movie is already the selection, unless its last request failed.
    pub fn select(&self, movie: impl Into<MovieDetail>) -> Option<FetchTicket> {
        let movie = movie.into();
        let mut ticket = None;
        self.state.send_if_modified(|view| {
            if view
                .as_ref()
                .is_some_and(|v| v.movie.id() == movie.id() && v.error.is_none())
            {
                return false;
            }
            let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
            ticket = Some(FetchTicket {
                request_id,
                movie_id: movie.id(),
            });
            *view = Some(DetailView {
                request_id,
                movie: movie.clone(),
                loading: true,
                error: None,
            });
            true
        });
        ticket
    }

    pub fn close(&self) {
        self.state.send_if_modified(|view| view.take().is_some());
    }

    /// Apply a finished request. Returns false when the selection has moved on and the
    /// outcome was dropped.
    pub fn apply(&self, ticket: FetchTicket, outcome: Result<MovieDetail>) -> bool {
        self.state.send_if_modified(|view| {
            let Some(current) = view.as_mut().filter(|v| v.request_id == ticket.request_id)
            else {
                debug!(
                    movie_id = ticket.movie_id,
                    request_id = ticket.request_id,
                    "Discarding stale detail response"
                );
                return false;
            };
            current.loading = false;
            match outcome {
                Ok(detail) => {
                    current.movie = detail;
                    current.error = None;
                }
                Err(e) => {
                    error!("Failed to fetch details for movie {}: {:#}", ticket.movie_id, e);
                    current.error = Some(DETAILS_FAILED.to_string());
                }
            }
            true
        })
    }

    pub async fn fetch(&self, ticket: FetchTicket) -> bool {
        let outcome = self.provider.movie_details(ticket.movie_id).await;
        self.apply(ticket, outcome)
    }

    /// Select and run the detail request in the background.
    pub fn select_and_fetch(
        self: &Arc<Self>,
        movie: impl Into<MovieDetail>,
    ) -> Option<JoinHandle<bool>> {
        let ticket = self.select(movie)?;
        let this = Arc::clone(self);
        Some(tokio::spawn(async move { this.fetch(ticket).await }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovieSummary, SearchPage};
    use async_trait::async_trait;

    struct NoProvider;

    #[async_trait]
    impl MovieProvider for NoProvider {
        async fn search_movies(&self, _query: &str) -> Result<SearchPage> {
            unreachable!("search is not used here")
        }
        async fn movie_details(&self, id: i64) -> Result<MovieDetail> {
            Err(anyhow::anyhow!("no details for {}", id))
        }
    }

    fn summary(id: i64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            poster_path: None,
            overview: String::new(),
            release_date: String::new(),
        }
    }

    fn detail(id: i64, title: &str, runtime: u32) -> MovieDetail {
        MovieDetail {
            summary: summary(id, title),
            runtime_minutes: Some(runtime),
            vote_average: Some(7.0),
        }
    }

    fn enrichment() -> DetailEnrichment {
        DetailEnrichment::new(Arc::new(NoProvider))
    }

    #[test]
    fn select_shows_summary_while_loading() {
        let details = enrichment();
        let ticket = details.select(summary(1, "Alien")).unwrap();
        let view = details.view().unwrap();
        assert_eq!(view.request_id, ticket.request_id);
        assert!(view.loading);
        assert_eq!(view.movie, MovieDetail::from(summary(1, "Alien")));
    }

    #[test]
    fn reselecting_same_movie_does_not_retrigger() {
        let details = enrichment();
        assert!(details.select(summary(1, "Alien")).is_some());
        assert!(details.select(summary(1, "Alien")).is_none());
    }

    #[test]
    fn reselecting_after_failure_retries() {
        let details = enrichment();
        let first = details.select(summary(1, "Alien")).unwrap();
        details.apply(first, Err(anyhow::anyhow!("timeout")));

        let retry = details.select(summary(1, "Alien")).unwrap();
        assert_ne!(retry.request_id, first.request_id);
        let view = details.view().unwrap();
        assert!(view.loading);
        assert!(view.error.is_none());

        assert!(details.apply(retry, Ok(detail(1, "Alien", 117))));
        assert_eq!(details.view().unwrap().movie.runtime_minutes, Some(117));
    }

    #[test]
    fn selecting_a_full_record_shows_it_while_loading() {
        let details = enrichment();
        details.select(detail(1, "Alien", 117)).unwrap();
        let view = details.view().unwrap();
        assert!(view.loading);
        assert_eq!(view.movie.runtime_minutes, Some(117));
        assert_eq!(view.movie.vote_average, Some(7.0));
    }

    #[test]
    fn success_replaces_record_wholesale() {
        let details = enrichment();
        let ticket = details.select(summary(1, "Alien")).unwrap();
        assert!(details.apply(ticket, Ok(detail(1, "Alien (Director's Cut)", 117))));
        let view = details.view().unwrap();
        assert!(!view.loading);
        assert_eq!(view.movie.title(), "Alien (Director's Cut)");
        assert_eq!(view.movie.runtime_minutes, Some(117));
    }

    #[test]
    fn failure_keeps_summary_and_sets_error() {
        let details = enrichment();
        let ticket = details.select(summary(1, "Alien")).unwrap();
        assert!(details.apply(ticket, Err(anyhow::anyhow!("503"))));
        let view = details.view().unwrap();
        assert!(!view.loading);
        assert_eq!(view.error.as_deref(), Some(DETAILS_FAILED));
        assert_eq!(view.movie, MovieDetail::from(summary(1, "Alien")));
    }

    #[test]
    fn stale_response_is_discarded() {
        let details = enrichment();
        let first = details.select(summary(1, "A")).unwrap();
        let second = details.select(summary(2, "B")).unwrap();
        assert_ne!(first.request_id, second.request_id);

        assert!(!details.apply(first, Ok(detail(1, "A", 90))));
        let view = details.view().unwrap();
        assert_eq!(view.movie.id(), 2);
        assert!(view.loading);

        assert!(details.apply(second, Ok(detail(2, "B", 100))));
        assert!(!details.apply(first, Ok(detail(1, "A", 90))));
        assert_eq!(details.view().unwrap().movie.runtime_minutes, Some(100));
    }

    #[test]
    fn response_after_close_and_reselect_is_discarded() {
        let details = enrichment();
        let first = details.select(summary(1, "A")).unwrap();
        details.close();
        assert!(details.view().is_none());
        assert!(!details.apply(first, Ok(detail(1, "A", 90))));

        let again = details.select(summary(1, "A")).unwrap();
        assert_ne!(again.request_id, first.request_id);
        assert!(!details.apply(first, Ok(detail(1, "A", 90))));
        assert!(details.view().unwrap().loading);
    }

    #[tokio::test]
    async fn fetch_failure_from_provider_sets_error() {
        let details = Arc::new(enrichment());
        let handle = details.select_and_fetch(summary(5, "Brazil")).unwrap();
        assert!(handle.await.unwrap());
        assert_eq!(details.view().unwrap().error.as_deref(), Some(DETAILS_FAILED));
        assert_eq!(details.current_movie().unwrap().id(), 5);
    }
}
