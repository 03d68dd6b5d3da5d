use std::fmt;

use cg_core::Store;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What a command does, for logs and UI labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Write one component value.
    SetComponent,
    /// Remove one component.
    RemoveComponent,
    /// Create an entity with initial components.
    SpawnEntity,
    /// Destroy an entity and everything on it.
    DespawnEntity,
    /// Several commands applied as one entry.
    Batch,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SetComponent => "set component",
            Self::RemoveComponent => "remove component",
            Self::SpawnEntity => "spawn entity",
            Self::DespawnEntity => "despawn entity",
            Self::Batch => "batch",
        };
        f.write_str(s)
    }
}

/// Identity of a command instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandMeta {
    /// Unique per command.
    pub id: Uuid,
    /// What the command does.
    pub kind: CommandKind,
    /// When the command was built.
    pub timestamp: DateTime<Utc>,
}

impl CommandMeta {
    /// Metadata for a command built now.
    pub fn new(kind: CommandKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// A reversible mutation of the store.
///
/// `execute` may be called again after `undo` (redo). Implementations
/// recompute whatever they need to restore on every `execute`, so a command
/// is only safe to re-run immediately after its own `undo`. [`History`]
/// guarantees that ordering.
///
/// Neither method may fail: addressing a vanished entity is a no-op at the
/// store level.
///
/// [`History`]: crate::History
pub trait Command: fmt::Debug {
    /// Identity and kind.
    fn meta(&self) -> &CommandMeta;

    /// Apply the mutation.
    fn execute(&mut self, store: &mut Store);

    /// Revert the last `execute`.
    fn undo(&mut self, store: &mut Store);
}

/// Owned, type-erased command.
pub type BoxedCommand = Box<dyn Command>;

