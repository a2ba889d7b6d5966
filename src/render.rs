//! Text rendering of explorer state. Everything here is a pure function of its inputs.
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

use crate::enrichment::DetailView;
use crate::explorer::Tab;
use crate::favorites::MAX_RATING;
use crate::models::{FavoriteEntry, MovieDetail, MovieSummary};
use crate::search::SearchState;

const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const OVERVIEW_PREVIEW_CHARS: usize = 120;

pub const NO_SEARCH_RESULTS: &str = "No results found. Try searching for a different movie.";
pub const NO_FAVORITES: &str = "No favorites yet. Search for movies and add them to your favorites!";

pub fn poster_url(poster_path: Option<&str>) -> Option<String> {
    poster_path
        .filter(|p| !p.is_empty())
        .map(|p| format!("{POSTER_BASE}{p}"))
}

pub fn release_year(release_date: &str) -> String {
    NaiveDate::parse_from_str(release_date, "%Y-%m-%d")
        .map(|d| d.year().to_string())
        .unwrap_or_else(|_| "N/A".to_string())
}

pub fn format_runtime(runtime_minutes: Option<u32>) -> String {
    match runtime_minutes {
        Some(m) if m > 0 => format!("{}h {}m", m / 60, m % 60),
        _ => "N/A".to_string(),
    }
}

/// `None` when there is no score worth showing (TMDB reports 0 for unrated titles).
pub fn format_vote(vote_average: Option<f32>) -> Option<String> {
    vote_average
        .filter(|v| *v > 0.0)
        .map(|v| format!("{:.1}", v))
}

pub fn stars(rating: u8) -> String {
    (1..=MAX_RATING)
        .map(|star| if rating >= star { '★' } else { '☆' })
        .collect()
}

fn overview_preview(overview: &str) -> String {
    if overview.is_empty() {
        return "No description available".to_string();
    }
    if overview.chars().count() > OVERVIEW_PREVIEW_CHARS {
        let cut: String = overview.chars().take(OVERVIEW_PREVIEW_CHARS).collect();
        return format!("{cut}...");
    }
    overview.to_string()
}

pub fn tabs(active: Tab, favorites_count: usize) -> String {
    let mark = |tab: Tab| if tab == active { "*" } else { " " };
    format!(
        "[{}] Search Movies   [{}] My Favorites ({})",
        mark(Tab::Search),
        mark(Tab::Favorites),
        favorites_count
    )
}

pub fn movie_card(index: usize, movie: &MovieSummary, is_favorite: bool) -> String {
    let badge = if is_favorite { " ★" } else { "" };
    format!(
        "{:>3}. {} ({}){}\n     {}",
        index + 1,
        movie.title,
        release_year(&movie.release_date),
        badge,
        overview_preview(&movie.overview)
    )
}

pub fn movie_list<F>(movies: &[MovieSummary], is_favorite: F) -> String
where
    F: Fn(i64) -> bool,
{
    movies
        .iter()
        .enumerate()
        .map(|(i, m)| movie_card(i, m, is_favorite(m.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Message line for the search tab: the error if any, else the empty state.
pub fn search_notice(state: &SearchState) -> Option<String> {
    if let Some(err) = state.error {
        return Some(err.to_string());
    }
    if state.search_performed && !state.loading && state.results.is_empty() {
        return Some(NO_SEARCH_RESULTS.to_string());
    }
    None
}

/// Suppressed until the store has loaded, so startup never flashes an empty list.
pub fn favorites_notice(loaded: bool, favorites_count: usize) -> Option<&'static str> {
    (loaded && favorites_count == 0).then_some(NO_FAVORITES)
}

fn movie_header(movie: &MovieDetail) -> String {
    let mut meta = vec![
        release_year(&movie.summary.release_date),
        format_runtime(movie.runtime_minutes),
    ];
    if let Some(vote) = format_vote(movie.vote_average) {
        meta.push(format!("⭐ {vote}"));
    }
    let mut out = format!("{}\n{}", movie.title(), meta.join(" • "));
    if let Some(url) = poster_url(movie.summary.poster_path.as_deref()) {
        let _ = write!(out, "\nPoster: {url}");
    }
    if !movie.summary.overview.is_empty() {
        let _ = write!(out, "\n\n{}", movie.summary.overview);
    }
    out
}

pub fn detail_view(view: &DetailView, favorite: Option<&FavoriteEntry>) -> String {
    if view.loading {
        return format!("{}\nLoading details...", view.movie.title());
    }
    if let Some(err) = &view.error {
        return format!("{}\n{}", view.movie.title(), err);
    }

    let mut out = movie_header(&view.movie);
    out.push_str("\n\nYour Rating & Notes");
    match favorite {
        Some(fav) => {
            let _ = write!(out, "\nRating: {}", stars(fav.rating));
            let note = if fav.note.is_empty() { "-" } else { fav.note.as_str() };
            let _ = write!(out, "\nNote: {note}");
            out.push_str("\nActions: save <rating> [note] = Update Favorite, remove = Remove from Favorites");
        }
        None => {
            out.push_str("\nActions: save <rating> [note] = Add to Favorites");
        }
    }
    out
}

pub fn favorite_line(index: usize, fav: &FavoriteEntry) -> String {
    let mut line = format!(
        "{:>3}. {} ({}) {}",
        index + 1,
        fav.movie.title(),
        release_year(&fav.movie.summary.release_date),
        stars(fav.rating)
    );
    if !fav.note.is_empty() {
        let _ = write!(line, " - {}", fav.note);
    }
    line
}
