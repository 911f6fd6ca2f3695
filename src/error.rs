use std::path::PathBuf;

use thiserror::Error;

/// Why a single paper could not be resolved. Recoverable: the entry is
/// dropped and the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response carries no identifier ({0})")]
    MissingId(String),
}

/// Fatal problems with the bibliography file itself.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read bibliography {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse bibliography {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}
