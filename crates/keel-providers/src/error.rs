//! Provider error types.

/// Errors raised by dependency providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A strict provider could not read its source.
    #[error("source '{source_name}' is unavailable: {detail}")]
    SourceUnavailable { source_name: String, detail: String },

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] keel_store::StoreError),

    /// The operation observed a cancellation request.
    #[error("provider operation cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
