use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("YOUTUBE_API_KEY is not set (export it or add it to a .env file)")]
    MissingApiKey,
}

/// Settings for one run. Loaded once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    api_key: String,
    /// Base URL for the Youtube Data API
    pub api_prefix: String,
    /// Base URL for the timedtext caption endpoint
    pub caption_prefix: String,
    pub caption_lang: String,
    pub max_results: usize,
    /// Directory the CSV file is written into
    pub output_dir: PathBuf,
}

impl Config {
    /// Read config from the environment, after loading `.env` if one exists
    pub fn load() -> Result<Config> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {:?}", path);
        }
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("YOUTUBE_API_KEY")
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let max_results = match lookup("VIDCSV_MAX_RESULTS") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("Invalid VIDCSV_MAX_RESULTS value {:?}", v))?,
            None => 500,
        };

        Ok(Config {
            api_key,
            api_prefix: lookup("YOUTUBE_API_URL")
                .unwrap_or_else(|| "https://www.googleapis.com".into()),
            caption_prefix: lookup("YOUTUBE_CAPTION_URL")
                .unwrap_or_else(|| "https://www.youtube.com".into()),
            caption_lang: lookup("VIDCSV_CAPTION_LANG").unwrap_or_else(|| "en".into()),
            max_results,
            output_dir: PathBuf::from("."),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Config pointing both upstreams at a mock server
    #[cfg(test)]
    pub fn for_test(server_url: &str, output_dir: &std::path::Path) -> Config {
        Config {
            api_key: "testkey".into(),
            api_prefix: server_url.into(),
            caption_prefix: server_url.into(),
            caption_lang: "en".into(),
            max_results: 500,
            output_dir: output_dir.into(),
        }
    }
}
