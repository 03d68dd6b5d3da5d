use cg_core::{EntityId, Store};
use cg_history::{BoxedCommand, Command, History, Intake};

use crate::config::SessionConfig;
use crate::drag::{DragController, DropOutcome};
use crate::error::LayoutResult;
use crate::geometry::Point;

/// The top-level editing session.
///
/// Owns one store, its undo history and the drag gesture state. Every
/// collaborator receives the store through this object; there is no global
/// instance.
pub struct Session {
    store: Store,
    history: History,
    drag: DragController,
    config: SessionConfig,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("entities", &self.store.entity_count())
            .field("past", &self.history.past_len())
            .field("future", &self.history.future_len())
            .field("dragging", &self.drag.active_entity())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// An empty session.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_store(Store::new(), config)
    }

    /// A session over an existing store.
    pub fn with_store(store: Store, config: SessionConfig) -> Self {
        Self {
            store,
            history: History::new(config.max_history),
            drag: DragController::new(),
            config,
        }
    }

    /// A session restored from a snapshot payload.
    pub fn from_snapshot(payload: &str, config: SessionConfig) -> LayoutResult<Self> {
        let mut store = Store::new();
        store.deserialize(payload)?;
        Ok(Self::with_store(store, config))
    }

    /// The store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access to the store, bypassing history.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// The undo history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Execute and record a command.
    pub fn execute(&mut self, command: impl Command + 'static) {
        self.history.execute(&mut self.store, command);
    }

    /// Execute and record a boxed command.
    pub fn execute_boxed(&mut self, command: BoxedCommand) {
        self.history.execute_boxed(&mut self.store, command);
    }

    /// Decode and execute an external request as one history entry.
    pub fn submit(&mut self, intake: Intake) -> LayoutResult<()> {
        self.history.submit(&mut self.store, intake)?;
        Ok(())
    }

    /// Undo the most recent entry.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.store)
    }

    /// Redo the most recently undone entry.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.store)
    }

    /// Start a drag gesture. See [`DragController::press`].
    pub fn press(&mut self, entity: EntityId, pointer: Point) -> bool {
        self.drag.press(&self.store, entity, pointer)
    }

    /// Move the active drag. See [`DragController::move_to`].
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        self.drag.move_to(&mut self.store, pointer)
    }

    /// Finish the active drag. See [`DragController::release`].
    pub fn release(&mut self) -> DropOutcome {
        self.drag
            .release(&mut self.store, &mut self.history, &self.config)
    }

    /// Abort the active drag. See [`DragController::cancel`].
    pub fn cancel(&mut self) -> bool {
        self.drag.cancel(&mut self.store)
    }

    /// Returns true while a drag gesture is active.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Serialize the store. Any active drag is cancelled first so its
    /// intermediate position is never persisted.
    pub fn save(&mut self) -> LayoutResult<String> {
        self.cancel();
        Ok(self.store.serialize()?)
    }

    /// Replace the store contents with a snapshot payload.
    ///
    /// On success the history and any drag gesture are discarded, since they
    /// refer to the previous world. On failure nothing changes.
    pub fn load(&mut self, payload: &str) -> LayoutResult<()> {
        self.store.deserialize(payload)?;
        self.drag.reset();
        self.history.clear();
        tracing::info!(entities = self.store.entity_count(), "session loaded");
        Ok(())
    }
}
