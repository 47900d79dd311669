use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

/// Failures that can occur while collecting, transforming or writing stylesheets.
#[derive(Debug, Error)]
pub enum StyleError {
    /// The main stylesheet does not exist. Runs treat this as a no-op.
    #[error("main stylesheet not found: {}", .0.display())]
    MainStyleNotFound(PathBuf),

    #[error("filesystem error at {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The minifier rejected the stylesheet.
    #[error("malformed stylesheet: {0}")]
    MalformedInput(String),

    #[error("run exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("unknown dedup strategy '{0}' (expected 'substring' or 'line-set')")]
    UnknownStrategy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StyleError {
    pub fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StyleError::FileSystem { path: path.into(), source }
    }
}
