pub mod config;
pub mod enrichment;
pub mod explorer;
pub mod favorites;
pub mod gateway;
pub mod models;
pub mod provider;
pub mod render;
pub mod search;
pub mod server;
pub mod storage;
pub mod tmdb;
