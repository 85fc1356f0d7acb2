use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied value out of range, e.g. `k == 0` or a malformed predicate.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Raised by an embedding index or graph store; passed through untouched.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
