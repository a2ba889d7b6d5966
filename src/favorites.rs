//! Favorites collection backed by a durable slot.
//!
//! The store starts out unloaded. Mutations made before [`FavoritesStore::load`] finishes
//! only touch memory and are queued; once the stored collection has been read they are
//! replayed on top of it and written back in one go. After that every mutation writes the
//! whole collection to the slot. Writing before the first read would replace whatever was
//! stored with the empty startup collection.
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::models::{FavoriteEntry, MovieDetail};
use crate::storage::SlotStore;

pub const STORAGE_KEY: &str = "movie-favorites";
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FavoritesError {
    #[error("'{title}' (id {id}) is already in your favorites")]
    AlreadyFavorite { id: i64, title: String },
    #[error("Rating must be between 0 and 5, got {0}")]
    InvalidRating(u8),
}

#[derive(Debug, Clone)]
enum Mutation {
    Add(FavoriteEntry),
    Remove(i64),
    Update { id: i64, rating: u8, note: String },
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<FavoriteEntry>,
    loaded: bool,
    pending: Vec<Mutation>,
}

pub struct FavoritesStore {
    slot: Arc<dyn SlotStore>,
    key: String,
    inner: Mutex<Inner>,
    load_gate: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(slot: Arc<dyn SlotStore>) -> Self {
        Self::with_key(slot, STORAGE_KEY)
    }

    pub fn with_key(slot: Arc<dyn SlotStore>, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
            inner: Mutex::new(Inner::default()),
            load_gate: Mutex::new(()),
        }
    }

    /// Read the slot once. Absent or unreadable data yields an empty collection; the
    /// problem is logged and never returned.
    pub async fn load(&self) {
        let _gate = self.load_gate.lock().await;
        if self.inner.lock().await.loaded {
            return;
        }

        let stored = match self.slot.read(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<FavoriteEntry>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Failed to load favorites, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load favorites, starting empty: {:#}", e);
                Vec::new()
            }
        };

        let mut inner = self.inner.lock().await;
        let pending = std::mem::take(&mut inner.pending);
        inner.entries = stored;
        for mutation in &pending {
            replay(&mut inner.entries, mutation);
        }
        inner.loaded = true;
        info!("Loaded {} favorites", inner.entries.len());

        if !pending.is_empty() {
            debug!("Replayed {} mutations made before load", pending.len());
            self.persist(&inner.entries).await;
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.inner.lock().await.loaded
    }

    pub async fn is_favorite(&self, id: i64) -> bool {
        self.inner.lock().await.entries.iter().any(|f| f.id() == id)
    }

    pub async fn get(&self, id: i64) -> Option<FavoriteEntry> {
        self.inner
            .lock()
            .await
            .entries
            .iter()
            .find(|f| f.id() == id)
            .cloned()
    }

    pub async fn list(&self) -> Vec<FavoriteEntry> {
        self.inner.lock().await.entries.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn add(
        &self,
        movie: impl Into<MovieDetail>,
        rating: u8,
        note: impl Into<String>,
    ) -> Result<FavoriteEntry, FavoritesError> {
        check_rating(rating)?;
        let movie = movie.into();
        let mut inner = self.inner.lock().await;
        if inner.entries.iter().any(|f| f.id() == movie.id()) {
            return Err(FavoritesError::AlreadyFavorite {
                id: movie.id(),
                title: movie.title().to_string(),
            });
        }

        let entry = FavoriteEntry {
            movie,
            rating,
            note: note.into(),
            added_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        inner.entries.push(entry.clone());
        info!("Added '{}' to favorites", entry.movie.title());
        self.commit(&mut inner, Mutation::Add(entry.clone())).await;
        Ok(entry)
    }

    /// Returns whether an entry was removed.
    pub async fn remove(&self, id: i64) -> bool {
        let mut inner = self.inner.lock().await;
        let before = inner.entries.len();
        inner.entries.retain(|f| f.id() != id);
        let removed = inner.entries.len() != before;
        if removed {
            info!("Removed movie {} from favorites", id);
        }
        if removed || !inner.loaded {
            self.commit(&mut inner, Mutation::Remove(id)).await;
        }
        removed
    }

    /// Rewrites rating and note only. Returns false when `id` is not a favorite.
    pub async fn update(
        &self,
        id: i64,
        rating: u8,
        note: impl Into<String>,
    ) -> Result<bool, FavoritesError> {
        check_rating(rating)?;
        let note = note.into();
        let mut inner = self.inner.lock().await;
        let found = match inner.entries.iter_mut().find(|f| f.id() == id) {
            Some(entry) => {
                entry.rating = rating;
                entry.note = note.clone();
                true
            }
            None => false,
        };
        // Before load the entry may still be in the slot, so the update is queued anyway.
        if !found && inner.loaded {
            debug!("Ignoring update for movie {}: not a favorite", id);
            return Ok(false);
        }
        self.commit(&mut inner, Mutation::Update { id, rating, note })
            .await;
        Ok(found)
    }

    async fn commit(&self, inner: &mut Inner, mutation: Mutation) {
        if inner.loaded {
            self.persist(&inner.entries).await;
        } else {
            debug!("Favorites not loaded yet, deferring write");
            inner.pending.push(mutation);
        }
    }

    async fn persist(&self, entries: &[FavoriteEntry]) {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to save favorites: {}", e);
                return;
            }
        };
        if let Err(e) = self.slot.write(&self.key, &raw).await {
            error!("Failed to save favorites: {:#}", e);
        }
    }
}

fn check_rating(rating: u8) -> Result<(), FavoritesError> {
    if rating > MAX_RATING {
        return Err(FavoritesError::InvalidRating(rating));
    }
    Ok(())
}

fn replay(entries: &mut Vec<FavoriteEntry>, mutation: &Mutation) {
    match mutation {
        Mutation::Add(entry) => {
            if entries.iter().any(|f| f.id() == entry.id()) {
                warn!(
                    "'{}' was already stored as a favorite, keeping the stored entry",
                    entry.movie.title()
                );
            } else {
                entries.push(entry.clone());
            }
        }
        Mutation::Remove(id) => entries.retain(|f| f.id() != *id),
        Mutation::Update { id, rating, note } => {
            if let Some(entry) = entries.iter_mut().find(|f| f.id() == *id) {
                entry.rating = *rating;
                entry.note = note.clone();
            }
        }
    }
}
