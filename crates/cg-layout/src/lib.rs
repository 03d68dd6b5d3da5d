//! Board layout for Collage.
//!
//! Geometry helpers, the slot resolver that decides where a dropped entity
//! lands, the drag gesture state machine, and [`Session`], the top-level
//! object that owns a store together with its history.

/// Configuration for sessions and drop resolution.
pub mod config;
/// Drag gesture state machine.
pub mod drag;
/// Error types for the layout crate.
pub mod error;
/// Points, rectangles and distances.
pub mod geometry;
/// Slot lookup and drop resolution.
pub mod resolver;
/// Top-level editing session.
pub mod session;

/// Re-export of [`config::SessionConfig`].
pub use config::SessionConfig;
/// Re-exports of drag gesture types.
pub use drag::{DragController, DropOutcome};
/// Re-exports of [`error::LayoutError`] and [`error::LayoutResult`].
pub use error::{LayoutError, LayoutResult};
/// Re-exports of geometry types.
pub use geometry::{Point, Rect};
/// Re-exports of resolver functions and results.
pub use resolver::{DropResolution, find_occupant, movables, nearest_slot, resolve_drop, slots};
/// Re-export of [`session::Session`].
pub use session::Session;
