//! Interactive terminal client: search TMDB, open details, keep rated favorites locally.
//! Usage:
//!   cargo run --bin movie_explorer
//! Uses MOVIE_EXPLORER_GATEWAY_URL when set, otherwise TMDB_API_KEY (.env supported).
//! Favorites are kept under MOVIE_EXPLORER_DATA_DIR (default .movie-explorer).

use anyhow::Result;
use dotenvy::dotenv;
use movie_explorer::config::Config;
use movie_explorer::explorer::{Explorer, SaveOutcome, Tab};
use movie_explorer::favorites::FavoritesStore;
use movie_explorer::gateway::GatewayClient;
use movie_explorer::provider::MovieProvider;
use movie_explorer::render;
use movie_explorer::search::SearchOutcome;
use movie_explorer::storage::FileSlotStore;
use movie_explorer::tmdb::TmdbClient;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Commands:
  search <query>         search movies
  results                show the search tab
  favorites              show the favorites tab
  show <n>               open details for item n of the current tab
  save <0-5> [note]      add the open movie to favorites, or update it
  remove                 remove the open movie from favorites
  close                  close the detail view
  help                   this text
  quit                   exit";

#[derive(Debug, PartialEq)]
enum Command {
    Search(String),
    Results,
    Favorites,
    Show(usize),
    Save { rating: u8, note: String },
    Remove,
    Close,
    Help,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let cmd = match word.to_lowercase().as_str() {
        "search" | "s" => Command::Search(rest.to_string()),
        "results" | "r" => Command::Results,
        "favorites" | "favs" | "f" => Command::Favorites,
        "show" | "open" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => Command::Show(n - 1),
            _ => Command::Invalid("usage: show <n>".to_string()),
        },
        "save" => {
            let (rating, note) = match rest.split_once(char::is_whitespace) {
                Some((r, n)) => (r, n.trim()),
                None => (rest, ""),
            };
            match rating.parse::<u8>() {
                Ok(rating) => Command::Save {
                    rating,
                    note: note.to_string(),
                },
                Err(_) => Command::Invalid("usage: save <0-5> [note]".to_string()),
            }
        }
        "remove" | "rm" => Command::Remove,
        "close" => Command::Close,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Invalid(format!("unknown command '{}', try 'help'", other)),
    };
    Some(cmd)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn build_provider(config: &Config) -> Result<Arc<dyn MovieProvider>> {
    if let Some(url) = &config.gateway_url {
        info!("Using movie gateway at {}", url);
        return Ok(Arc::new(GatewayClient::new(url.clone())?));
    }
    Ok(Arc::new(TmdbClient::from_config(config)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_tracing();

    let config = Config::from_env()?;
    let provider = build_provider(&config)?;
    let slot = FileSlotStore::new(config.data_dir.clone());
    info!("Favorites stored in {}", slot.dir().display());
    let store = Arc::new(FavoritesStore::new(Arc::new(slot)));

    // Startup does not wait for the slot read; the store defers writes until it finishes.
    let loader = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });

    let mut explorer = Explorer::new(provider, store.clone());

    let mut details_rx = explorer.details().subscribe();
    let details_store = store.clone();
    tokio::spawn(async move {
        while details_rx.changed().await.is_ok() {
            let view = details_rx.borrow_and_update().clone();
            if let Some(view) = view.filter(|v| !v.loading) {
                let favorite = details_store.get(view.movie.id()).await;
                println!("\n{}\n", render::detail_view(&view, favorite.as_ref()));
            }
        }
    });

    println!("Movie Explorer - search movies, view details, and save your favorites");
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(cmd) = parse_command(&line) else {
            continue;
        };
        match cmd {
            Command::Search(query) => {
                if explorer.search(&query).await == SearchOutcome::Rejected {
                    println!("Enter something to search for.");
                    continue;
                }
                println!("{}", explorer.render_list().await);
            }
            Command::Results => {
                explorer.switch_tab(Tab::Search);
                println!("{}", explorer.render_list().await);
            }
            Command::Favorites => {
                explorer.switch_tab(Tab::Favorites);
                println!("{}", explorer.render_list().await);
            }
            Command::Show(index) => match explorer.select(index).await {
                Ok(_) => {
                    if let Some(text) = explorer.render_details().await {
                        println!("{text}");
                    }
                }
                Err(e) => println!("{e}"),
            },
            Command::Save { rating, note } => match explorer.save_selected(rating, note).await {
                Ok(SaveOutcome::Added(entry)) => {
                    println!("Added '{}' to favorites.", entry.movie.title())
                }
                Ok(SaveOutcome::Updated) => println!("Favorite updated."),
                Err(e) => println!("{e}"),
            },
            Command::Remove => match explorer.remove_selected().await {
                Ok(true) => println!("Removed from favorites."),
                Ok(false) => println!("That movie is not in your favorites."),
                Err(e) => println!("{e}"),
            },
            Command::Close => explorer.close_details(),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Invalid(msg) => println!("{msg}"),
        }
    }

    // Let the initial load finish so queued favorites reach the slot before exit.
    loader.await?;
    Ok(())
}
