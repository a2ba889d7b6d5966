use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{MovieDetail, SearchPage};

/// Source of movie records: TMDB itself, or the proxy sitting in front of it.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    async fn search_movies(&self, query: &str) -> Result<SearchPage>;
    async fn movie_details(&self, id: i64) -> Result<MovieDetail>;
}

pub(crate) fn http_client() -> Result<Client> {
    let user_agent = format!("movie-explorer/{}", env!("CARGO_PKG_VERSION"));
    Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and decode the body; any non-success status is an error carrying the body.
pub(crate) async fn get_json<T: for<'de> Deserialize<'de>>(client: &Client, url: &str) -> Result<T> {
    let res = client.get(url).send().await.context("request failed")?;
    let status = res.status();
    let text = res.text().await.context("reading body failed")?;
    if !status.is_success() {
        return Err(anyhow!("{} -> {}", status, text));
    }
    let parsed: T = serde_json::from_str(&text).context("JSON parse failed")?;
    Ok(parsed)
}
