//! Error taxonomy for the harness.
//!
//! Class-level failures (`Configuration`, `UnsupportedTarget`, `SessionUnavailable`)
//! abort only the test class that hit them. `ArtifactWrite` is only ever logged.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported target: {kind} '{value}'")]
    UnsupportedTarget { kind: &'static str, value: String },

    #[error("Session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("Failed to write report artifact {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WebDriver error [{error}]: {message}")]
    WebDriver { error: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
