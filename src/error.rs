use thiserror::Error;

pub type Result<T> = anyhow::Result<T>;

/// Failure while retrieving one of the source tables.
///
/// The loader never propagates these; each one is logged and the affected
/// table degrades to empty.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid source location `{0}`")]
    Location(String),

    #[error("invalid source url `{location}`: {source}")]
    InvalidUrl {
        location: String,
        #[source]
        source: url::ParseError,
    },
}
