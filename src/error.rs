use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TflvError {
    #[error("Syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("Unable to read declarations from {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("{0}")]
    Resolve(String),

    #[error("{0}")]
    Rewrite(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid path: {0}")]
    PathValidation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unable to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, TflvError>;
