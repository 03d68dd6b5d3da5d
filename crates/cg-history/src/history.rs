use std::collections::VecDeque;

use cg_core::Store;

use crate::command::{BoxedCommand, Command, CommandMeta};
use crate::error::HistoryResult;
use crate::intake::Intake;

/// Default bound on the undo stack.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Bounded undo/redo ledger.
///
/// `past` holds executed commands, most recent at the back; the oldest is
/// evicted once `max_history` is exceeded. `future` holds undone commands,
/// most recent at the back, and is cleared whenever a fresh command executes
/// (destructive redo).
#[derive(Debug)]
pub struct History {
    past: VecDeque<BoxedCommand>,
    future: Vec<BoxedCommand>,
    max_history: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Create an empty history keeping at most `max_history` undo entries.
    ///
    /// A bound of zero keeps nothing: commands still execute but cannot be
    /// undone.
    pub fn new(max_history: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(max_history.min(DEFAULT_MAX_HISTORY)),
            future: Vec::new(),
            max_history,
        }
    }

    /// The undo bound.
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Execute `command` and record it.
    pub fn execute(&mut self, store: &mut Store, command: impl Command + 'static) {
        self.execute_boxed(store, Box::new(command));
    }

    /// Execute an already boxed command and record it.
    pub fn execute_boxed(&mut self, store: &mut Store, mut command: BoxedCommand) {
        command.execute(store);
        tracing::debug!(
            command = %command.meta().kind,
            id = %command.meta().id,
            "command executed"
        );

        self.past.push_back(command);
        while self.past.len() > self.max_history {
            if let Some(evicted) = self.past.pop_front() {
                tracing::trace!(id = %evicted.meta().id, "oldest command evicted");
            }
        }
        if !self.future.is_empty() {
            tracing::debug!(discarded = self.future.len(), "redo stack cleared");
            self.future.clear();
        }
    }

    /// Revert the most recent command. Returns false if there is nothing to undo.
    pub fn undo(&mut self, store: &mut Store) -> bool {
        let Some(mut command) = self.past.pop_back() else {
            return false;
        };
        command.undo(store);
        tracing::debug!(command = %command.meta().kind, "command undone");
        self.future.push(command);
        true
    }

    /// Re-apply the most recently undone command. Returns false if there is
    /// nothing to redo.
    pub fn redo(&mut self, store: &mut Store) -> bool {
        let Some(mut command) = self.future.pop() else {
            return false;
        };
        command.execute(store);
        tracing::debug!(command = %command.meta().kind, "command redone");
        self.past.push_back(command);
        true
    }

    /// Returns true if [`undo`](Self::undo) would do something.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Returns true if [`redo`](Self::redo) would do something.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undoable entries.
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redoable entries.
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// The command `undo` would revert.
    pub fn peek_undo(&self) -> Option<&CommandMeta> {
        self.past.back().map(|command| command.meta())
    }

    /// The command `redo` would re-apply.
    pub fn peek_redo(&self) -> Option<&CommandMeta> {
        self.future.last().map(|command| command.meta())
    }

    /// Drop both stacks. The store is left as is.
    pub fn clear(&mut self) {
        tracing::info!(
            past = self.past.len(),
            future = self.future.len(),
            "history cleared"
        );
        self.past.clear();
        self.future.clear();
    }

    /// Decode an external request and execute it as one entry.
    pub fn submit(&mut self, store: &mut Store, intake: Intake) -> HistoryResult<()> {
        let command = intake.into_command()?;
        self.execute_boxed(store, command);
        Ok(())
    }

    /// Parse a JSON request body and execute it as one entry.
    ///
    /// Nothing is executed if any part of the body is invalid.
    pub fn submit_json(&mut self, store: &mut Store, body: &str) -> HistoryResult<()> {
        let intake = Intake::from_json(body)?;
        self.submit(store, intake)
    }
}
