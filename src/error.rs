//! Errors raised at the crate's boundaries.
//!
//! The comparison engines themselves are total; only parsing user-supplied
//! tags, reading files and loading configuration can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Boundary errors for `coderefine`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "unknown language `{0}` (expected one of: javascript, typescript, python, cpp, java, go, rust)"
    )]
    UnknownLanguage(String),

    #[error("unknown lint level `{0}` (expected allow, warn or deny)")]
    UnknownLintLevel(String),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
