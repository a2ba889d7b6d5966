//! Client for the proxy's `/api` routes, used when the terminal client should not hold the
//! TMDB key itself.
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::models::{MovieDetail, SearchPage};
use crate::provider::{get_json, http_client, MovieProvider};

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/api/search?query={}", self.base_url, urlencoding::encode(query))
    }

    fn detail_url(&self, id: i64) -> String {
        format!("{}/api/movie/{id}", self.base_url)
    }
}

#[async_trait]
impl MovieProvider for GatewayClient {
    async fn search_movies(&self, query: &str) -> Result<SearchPage> {
        get_json(&self.client, &self.search_url(query))
            .await
            .context("Search failed")
    }

    async fn movie_details(&self, id: i64) -> Result<MovieDetail> {
        get_json(&self.client, &self.detail_url(id))
            .await
            .context("Failed to fetch movie details")
    }
}
