//! Crate-wide error type.

use thiserror::Error;

use crate::core::domain::DomainError;
use crate::core::venue::VenueError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("connection pool error: {0}")]
    Connection(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Venue(#[from] VenueError),
}

pub type Result<T> = std::result::Result<T, Error>;
