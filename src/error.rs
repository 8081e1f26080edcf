// ABOUTME: Application-wide error types for golive.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::config::ConfigError;
use crate::refs::RefError;
use crate::release::ReleaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
