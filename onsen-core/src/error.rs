use onsen_scraper::ScrapeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No data loaded")]
    NotLoaded,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Persistence failed: {0}")]
    Store(#[from] DataError),
}

pub type Result<T> = std::result::Result<T, DataError>;
