//! Reversible commands and bounded undo/redo history for Collage.
//!
//! Every user-visible mutation of a [`cg_core::Store`] is wrapped in a
//! [`Command`] and run through [`History`], which keeps a bounded `past`
//! stack and a `future` stack that is discarded whenever a fresh command
//! executes.

/// Composite command applying sub-commands as one history entry.
pub mod batch;
/// The command trait and per-command metadata.
pub mod command;
/// Entity spawn/despawn commands.
pub mod entity;
/// Error types for the history crate.
pub mod error;
/// The undo/redo ledger.
pub mod history;
/// JSON request shapes accepted from the UI and plugin layer.
pub mod intake;
/// Component set/remove commands.
pub mod set;

/// Re-export of [`batch::Batch`].
pub use batch::Batch;
/// Re-exports of the command trait and metadata.
pub use command::{BoxedCommand, Command, CommandKind, CommandMeta};
/// Re-exports of entity commands.
pub use entity::{DespawnEntity, SpawnEntity};
/// Re-exports of [`error::HistoryError`] and [`error::HistoryResult`].
pub use error::{HistoryError, HistoryResult};
/// Re-export of the history ledger.
pub use history::{DEFAULT_MAX_HISTORY, History};
/// Re-exports of intake shapes.
pub use intake::{Intake, SetRequest};
/// Re-exports of component commands.
pub use set::{RemoveComponent, SetComponent};
