use cg_core::Store;

use crate::command::{BoxedCommand, Command, CommandKind, CommandMeta};

/// Ordered sub-commands recorded as a single history entry.
///
/// `execute` runs them first to last; `undo` reverts them last to first.
/// Change notifications from the whole group are delivered together.
#[derive(Debug)]
pub struct Batch {
    meta: CommandMeta,
    commands: Vec<BoxedCommand>,
}

impl Batch {
    /// Group `commands`.
    pub fn new(commands: Vec<BoxedCommand>) -> Self {
        Self {
            meta: CommandMeta::new(CommandKind::Batch),
            commands,
        }
    }

    /// Number of sub-commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if there are no sub-commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The sub-commands in execution order.
    pub fn commands(&self) -> &[BoxedCommand] {
        &self.commands
    }
}

impl FromIterator<BoxedCommand> for Batch {
    fn from_iter<I: IntoIterator<Item = BoxedCommand>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Command for Batch {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn execute(&mut self, store: &mut Store) {
        let commands = &mut self.commands;
        store.batch(|store| {
            for command in commands.iter_mut() {
                command.execute(store);
            }
        });
    }

    fn undo(&mut self, store: &mut Store) {
        let commands = &mut self.commands;
        store.batch(|store| {
            for command in commands.iter_mut().rev() {
                command.undo(store);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use cg_core::{EntityId, Transform};

    use super::*;
    use crate::set::SetComponent;

    fn at(x: f64) -> Transform {
        Transform::new(x, 0.0, 10.0, 10.0)
    }

    #[test]
    fn undo_runs_in_reverse_order() {
        let mut store = Store::new();
        let e = store.create_entity(None);
        store.add_component(e, at(0.0));

        // Two writes to the same cell: only strict reverse undo restores the
        // original value.
        let mut batch: Batch = [
            Box::new(SetComponent::new(e, at(1.0))) as BoxedCommand,
            Box::new(SetComponent::new(e, at(2.0))),
        ]
        .into_iter()
        .collect();

        batch.execute(&mut store);
        assert_eq!(store.get_component::<Transform>(e).unwrap().x, 2.0);

        batch.undo(&mut store);
        assert_eq!(store.get_component::<Transform>(e).unwrap().x, 0.0);
    }

    #[test]
    fn empty_batch_is_noop() {
        let mut store = Store::new();
        let mut batch = Batch::new(Vec::new());
        assert!(batch.is_empty());
        batch.execute(&mut store);
        batch.undo(&mut store);
        assert_eq!(store.entity_count(), 0);
    }

    #[test]
    fn reports_sub_commands() {
        let e = EntityId::new();
        let batch = Batch::new(vec![
            Box::new(SetComponent::new(e, at(1.0))),
            Box::new(SetComponent::new(e, at(2.0))),
        ]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.commands()[0].meta().kind, CommandKind::SetComponent);
        assert_eq!(batch.meta().kind, CommandKind::Batch);
    }
}
