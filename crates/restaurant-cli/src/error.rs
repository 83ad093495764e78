use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] restaurant_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Review not sent: {0}. Retry later or use --defer to queue it.")]
    ReviewNotSent(String),
    #[error("{0} pending review(s) could not be delivered; they stay queued")]
    SyncIncomplete(usize),
}
