use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use crate::error::{LudothekError, Result};

pub const DEFAULT_BUCKET: &str = "game-images";
pub const DEFAULT_NEWS_WINDOW: usize = 50;
pub const DEFAULT_NEWS_MAX_ITEMS: usize = 10;
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Connection settings and display limits for a [`LudothekClient`](crate::LudothekClient).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted service, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Storage bucket holding game images.
    pub bucket: String,
    /// Number of most recent play sessions the news feed is built from.
    pub news_window: usize,
    /// Maximum number of news items after grouping.
    pub news_max_items: usize,
    /// Games per catalog page.
    pub page_size: usize,
}

impl Config {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            news_window: DEFAULT_NEWS_WINDOW,
            news_max_items: DEFAULT_NEWS_MAX_ITEMS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Load the configuration from `LUDOTHEK_*` environment variables.
    ///
    /// `LUDOTHEK_URL` and `LUDOTHEK_ANON_KEY` are required, everything else
    /// falls back to its default.
    pub fn from_env() -> Result<Self> {
        let url = required("LUDOTHEK_URL")?;
        let anon_key = required("LUDOTHEK_ANON_KEY")?;

        let mut config = Self::new(url, anon_key);
        config.bucket = try_load("LUDOTHEK_BUCKET", config.bucket);
        config.news_window = try_load("LUDOTHEK_NEWS_WINDOW", config.news_window);
        config.news_max_items = try_load("LUDOTHEK_NEWS_MAX_ITEMS", config.news_max_items);
        config.page_size = try_load("LUDOTHEK_PAGE_SIZE", config.page_size).max(1);
        Ok(config)
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LudothekError::Config(format!("{key} is not set")))
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}
