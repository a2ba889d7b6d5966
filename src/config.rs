use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3146";
pub const DEFAULT_DATA_DIR: &str = ".movie-explorer";

/// Settings read from the environment (a `.env` file is loaded by the binaries first).
#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub addr: SocketAddr,
    pub gateway_url: Option<String>,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let addr_raw =
            non_empty("MOVIE_EXPLORER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse()
            .with_context(|| format!("Invalid MOVIE_EXPLORER_ADDR '{}'", addr_raw))?;

        Ok(Self {
            tmdb_api_key: non_empty("TMDB_API_KEY"),
            tmdb_base_url: non_empty("TMDB_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_TMDB_BASE.to_string()),
            addr,
            gateway_url: non_empty("MOVIE_EXPLORER_GATEWAY_URL")
                .map(|u| u.trim_end_matches('/').to_string()),
            data_dir: non_empty("MOVIE_EXPLORER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.tmdb_api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Missing required environment variable: TMDB_API_KEY"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert!(cfg.tmdb_api_key.is_none());
        assert_eq!(cfg.tmdb_base_url, DEFAULT_TMDB_BASE);
        assert_eq!(cfg.addr.port(), 3146);
        assert!(cfg.gateway_url.is_none());
        assert_eq!(cfg.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert!(cfg.require_api_key().is_err());
    }

    #[test]
    fn blank_values_count_as_unset_and_urls_lose_trailing_slash() {
        let cfg = Config::from_lookup(lookup(&[
            ("TMDB_API_KEY", "  "),
            ("MOVIE_EXPLORER_GATEWAY_URL", "http://localhost:3146/"),
            ("TMDB_BASE_URL", "http://tmdb.test/3/"),
        ]))
        .unwrap();
        assert!(cfg.tmdb_api_key.is_none());
        assert_eq!(cfg.gateway_url.as_deref(), Some("http://localhost:3146"));
        assert_eq!(cfg.tmdb_base_url, "http://tmdb.test/3");
    }

    #[test]
    fn rejects_unparseable_addr() {
        let err = Config::from_lookup(lookup(&[("MOVIE_EXPLORER_ADDR", "nope")])).unwrap_err();
        assert!(err.to_string().contains("MOVIE_EXPLORER_ADDR"));
    }
}
