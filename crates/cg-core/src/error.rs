use crate::component::ComponentKind;
use crate::entity::EntityId;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the store.
///
/// Missing entities and components are not errors: those operations are
/// silent no-ops. Only malformed snapshots and internal inconsistencies
/// surface here.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The snapshot payload is not valid JSON of the expected shape.
    #[error("malformed snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A component row could not be decoded as its kind's record.
    #[error("invalid {kind} component for entity {entity}: {source}")]
    InvalidComponent {
        /// The table the row belongs to.
        kind: ComponentKind,
        /// The entity the row is attached to.
        entity: EntityId,
        /// The decoding failure.
        source: serde_json::Error,
    },

    /// A component row references an entity missing from the entity list.
    #[error("{kind} component references unknown entity {entity}")]
    DanglingEntity {
        /// The table holding the dangling row.
        kind: ComponentKind,
        /// The entity that is not listed.
        entity: EntityId,
    },

    /// A snapshot contains a kind that must never be persisted.
    #[error("snapshot contains transient component kind {0}")]
    TransientInSnapshot(ComponentKind),

    /// A table and its index disagree. Indicates a broken mutation path.
    #[error("invariant violation in {kind} storage: {detail}")]
    InvariantViolation {
        /// The kind whose storage is inconsistent.
        kind: ComponentKind,
        /// What disagreed.
        detail: String,
    },
}
