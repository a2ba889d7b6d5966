#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use movie_explorer::models::{MovieDetail, MovieSummary, SearchPage};
use movie_explorer::provider::MovieProvider;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// In-memory provider. Detail requests for "held" ids wait until released.
#[derive(Default)]
pub struct FakeProvider {
    pub searches: HashMap<String, Vec<MovieSummary>>,
    pub details: HashMap<i64, MovieDetail>,
    pub fail_search: bool,
    pub search_gate: Option<Arc<Semaphore>>,
    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub held: Mutex<HashMap<i64, Arc<Semaphore>>>,
}

impl FakeProvider {
    pub fn catalog() -> Self {
        let mut searches = HashMap::new();
        searches.insert("Inception".to_string(), vec![inception_summary()]);
        searches.insert(
            "Alien".to_string(),
            vec![summary(348, "Alien", "1979-05-25"), summary(679, "Aliens", "1986-07-18")],
        );
        searches.insert("zzzzz1".to_string(), vec![]);

        let mut details = HashMap::new();
        details.insert(27205, inception_detail());
        details.insert(348, detail(summary(348, "Alien", "1979-05-25"), 117, 8.2));
        details.insert(679, detail(summary(679, "Aliens", "1986-07-18"), 137, 7.9));

        Self {
            searches,
            details,
            ..Self::default()
        }
    }

    /// Make detail requests for `id` wait until [`FakeProvider::release`] is called.
    pub fn hold(&self, id: i64) {
        self.held
            .lock()
            .unwrap()
            .insert(id, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, id: i64) {
        if let Some(gate) = self.held.lock().unwrap().get(&id) {
            gate.add_permits(1);
        }
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieProvider for FakeProvider {
    async fn search_movies(&self, query: &str) -> Result<SearchPage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.search_gate {
            let _permit = gate.acquire().await?;
        }
        if self.fail_search {
            return Err(anyhow!("502 Bad Gateway"));
        }
        let results = self.searches.get(query).cloned().unwrap_or_default();
        Ok(SearchPage {
            page: 1,
            total_pages: if results.is_empty() { 0 } else { 1 },
            total_results: results.len() as u32,
            results,
        })
    }

    async fn movie_details(&self, id: i64) -> Result<MovieDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.held.lock().unwrap().get(&id).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await?;
        }
        self.details
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow!("404 -> movie {} not found", id))
    }
}

pub fn summary(id: i64, title: &str, release_date: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/{id}.jpg")),
        overview: format!("{title} overview"),
        release_date: release_date.to_string(),
    }
}

pub fn detail(summary: MovieSummary, runtime: u32, vote: f32) -> MovieDetail {
    MovieDetail {
        summary,
        runtime_minutes: Some(runtime),
        vote_average: Some(vote),
    }
}

pub fn inception_summary() -> MovieSummary {
    summary(27205, "Inception", "2010-07-15")
}

pub fn inception_detail() -> MovieDetail {
    detail(inception_summary(), 148, 8.4)
}
