use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::config::{Config, DEFAULT_TMDB_BASE};
use crate::models::{MovieDetail, SearchPage};
use crate::provider::{get_json, http_client, MovieProvider};

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_TMDB_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?;
        Self::with_base_url(api_key, config.tmdb_base_url.clone())
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search/movie?api_key={}&query={}&language=en-US&page=1&include_adult=false",
            self.base_url,
            self.api_key,
            urlencoding::encode(query)
        )
    }

    fn detail_url(&self, id: i64) -> String {
        format!(
            "{}/movie/{id}?api_key={}&language=en-US",
            self.base_url, self.api_key
        )
    }
}

#[async_trait]
impl MovieProvider for TmdbClient {
    async fn search_movies(&self, query: &str) -> Result<SearchPage> {
        get_json(&self.client, &self.search_url(query))
            .await
            .with_context(|| format!("TMDB search for '{}' failed", query))
    }

    async fn movie_details(&self, id: i64) -> Result<MovieDetail> {
        get_json(&self.client, &self.detail_url(id))
            .await
            .with_context(|| format!("TMDB details for movie {} failed", id))
    }
}
