//! Shell error types.

use thiserror::Error;
use waypoint_core::error::NavigationError;

/// Startup and runtime errors for the page shell.
#[derive(Debug, Error)]
pub enum ShellError {
    /// An environment variable or config file value is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading pages or config from disk failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML config file or page front matter is malformed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A navigation operation was refused.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// No page is published at the path.
    #[error("page not found: {0}")]
    PageNotFound(String),

    /// The input line is not a shell command.
    #[error("unrecognised command: {0}")]
    Command(String),
}
