use cg_core::StoreError;
use cg_history::HistoryError;

/// Alias for `Result<T, LayoutError>`.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors surfaced by a [`Session`](crate::Session).
///
/// Gestures themselves never fail; only loading, saving and request intake can.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Snapshot encode or decode failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An external command request was rejected.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// A configuration file could not be parsed.
    #[error("invalid session config: {0}")]
    Config(#[source] serde_json::Error),
}
