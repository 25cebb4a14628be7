use thiserror::Error;

#[derive(Error, Debug)]
pub enum WikiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch feed {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, WikiError>;
