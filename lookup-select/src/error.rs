//! Error types

/// Caller contract violations.
///
/// These are programmer errors: the host passed a configuration that can
/// never work. They are reported synchronously by the operation that
/// detects them and are never folded into [`FetchError`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// `ReturnShape::Custom` was requested without a return map.
    #[error("a return map is required when the return shape is \"custom\"")]
    MissingReturnMap,

    /// Page size must be at least 1.
    #[error("invalid page size: {0} (must be greater than zero)")]
    InvalidPageSize(usize),

    /// Virtualization needs a finite, positive row height.
    #[error("invalid row height: {0} (must be a finite number greater than zero)")]
    InvalidRowHeight(f64),
}

/// Errors produced by an asynchronous data source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The source rejected the request.
    #[error("{message}")]
    Source {
        /// Message surfaced to the presentation layer.
        message: String,
    },

    /// The fetch task was dropped or aborted before it produced a result.
    #[error("fetch was cancelled")]
    Cancelled,
}

impl FetchError {
    /// Creates a source error with the given message.
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::source(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::source(message)
    }
}

/// A responder dropped without answering.
impl From<tokio::sync::oneshot::error::RecvError> for FetchError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::Cancelled
    }
}

/// Any error this crate can report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
}
