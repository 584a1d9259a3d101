use thiserror::Error;

#[derive(Debug, Error)]
pub enum LigmapError {
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Input table error: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External tool error: {0}")]
    Tool(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for LigmapError {
    fn from(e: reqwest::Error) -> Self {
        LigmapError::Fetch(e.to_string())
    }
}

impl From<toml::de::Error> for LigmapError {
    fn from(e: toml::de::Error) -> Self {
        LigmapError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LigmapError>;
