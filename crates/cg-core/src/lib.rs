//! Core types for Collage: the entity-component store behind the board editor.
//!
//! The [`Store`] owns entities, one typed table per [`ComponentKind`], the
//! inverted kind → entity indices and a cache of multi-kind queries. Every
//! mutation is announced through the [`ChangeNotifier`], and the whole
//! persistent state can be written to and rebuilt from a JSON [`Snapshot`].

/// Component kinds, the tagged [`Component`] union and its typed records.
pub mod component;
/// Entity identifiers.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Tracing subscriber setup for binaries and tests.
pub mod logging;
/// Fine-grained change notification keyed by cell, kind or query.
pub mod notify;
/// Serialized snapshot payload and its validation.
pub mod snapshot;
/// The store: entities, tables, indices and cached queries.
pub mod store;
/// Kind-indexed heterogeneous table map backing the store.
mod table;

/// Re-export component types.
pub use component::{
    Component, ComponentData, ComponentKind, Hover, Interaction, LayoutConfig, LayoutRole, Meta,
    Selection, Transform, Visual,
};
/// Re-export entity identifier.
pub use entity::EntityId;
/// Re-export error types.
pub use error::{StoreError, StoreResult};
/// Re-export notifier types.
pub use notify::{ChangeEvent, ChangeKind, ChangeNotifier, SubscriptionId, Topic};
/// Re-export snapshot payload.
pub use snapshot::Snapshot;
/// Re-export the store and its query key.
pub use store::{QueryKey, QueryResult, Store};
