use cg_core::ComponentKind;

/// Alias for `Result<T, HistoryError>`.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors raised while turning external requests into commands.
///
/// Executing, undoing and redoing commands never fails.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The request body is not valid JSON of the expected shape.
    #[error("malformed command request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The new value does not decode as the named component kind.
    #[error("invalid value for {component_type}: {source}")]
    InvalidRequest {
        /// The kind the request named.
        component_type: ComponentKind,
        /// The decoding failure.
        source: serde_json::Error,
    },

    /// A batch request with no entries.
    #[error("batch request contains no commands")]
    EmptyBatch,
}
