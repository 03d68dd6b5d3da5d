use cg_core::{Component, ComponentKind, EntityId, Store};

use crate::command::{Command, CommandKind, CommandMeta};

/// Write one component value, remembering what it replaced.
///
/// The new value is copied when the command is built. Copies are shallow:
/// large payloads inside a component are shared, so callers must treat a
/// value handed to a command as frozen.
///
/// The value being replaced is read on every `execute`, not just the first.
/// If there was none, `undo` removes the component instead of writing an
/// empty placeholder.
#[derive(Debug, Clone)]
pub struct SetComponent {
    meta: CommandMeta,
    entity: EntityId,
    value: Component,
    previous: Option<Component>,
}

impl SetComponent {
    /// Build a command writing `value` onto `entity`.
    pub fn new(entity: EntityId, value: impl Into<Component>) -> Self {
        Self {
            meta: CommandMeta::new(CommandKind::SetComponent),
            entity,
            value: value.into(),
            previous: None,
        }
    }

    /// The target entity.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The value this command writes.
    pub fn value(&self) -> &Component {
        &self.value
    }

    /// The value captured by the last `execute`, if any existed.
    pub fn previous(&self) -> Option<&Component> {
        self.previous.as_ref()
    }
}

impl Command for SetComponent {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn execute(&mut self, store: &mut Store) {
        self.previous = store.get(self.entity, self.value.kind());
        store.insert(self.entity, self.value.clone());
    }

    fn undo(&mut self, store: &mut Store) {
        match &self.previous {
            Some(previous) => {
                store.insert(self.entity, previous.clone());
            }
            None => {
                store.remove_component(self.entity, self.value.kind());
            }
        }
    }
}

/// Remove one component, restoring it on undo.
#[derive(Debug, Clone)]
pub struct RemoveComponent {
    meta: CommandMeta,
    entity: EntityId,
    kind: ComponentKind,
    removed: Option<Component>,
}

impl RemoveComponent {
    /// Build a command removing `kind` from `entity`.
    pub fn new(entity: EntityId, kind: ComponentKind) -> Self {
        Self {
            meta: CommandMeta::new(CommandKind::RemoveComponent),
            entity,
            kind,
            removed: None,
        }
    }
}

impl Command for RemoveComponent {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn execute(&mut self, store: &mut Store) {
        self.removed = store.get(self.entity, self.kind);
        store.remove_component(self.entity, self.kind);
    }

    fn undo(&mut self, store: &mut Store) {
        if let Some(removed) = &self.removed {
            store.insert(self.entity, removed.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use cg_core::{Meta, Transform};

    use super::*;

    fn store_with_entity() -> (Store, EntityId) {
        let mut store = Store::new();
        let e = store.create_entity(None);
        (store, e)
    }

    #[test]
    fn undo_restores_previous_value() {
        let (mut store, e) = store_with_entity();
        let before = Transform::new(0.0, 0.0, 10.0, 10.0);
        store.add_component(e, before);

        let mut cmd = SetComponent::new(e, before.with_position(50.0, 50.0));
        cmd.execute(&mut store);
        assert_eq!(store.get_component::<Transform>(e).unwrap().x, 50.0);
        assert_eq!(cmd.previous(), Some(&Component::Transform(before)));

        cmd.undo(&mut store);
        assert_eq!(store.get_component::<Transform>(e), Some(&before));
    }

    #[test]
    fn undo_without_previous_removes_component() {
        let (mut store, e) = store_with_entity();
        let mut cmd = SetComponent::new(e, Meta::new("fresh"));
        cmd.execute(&mut store);
        assert!(store.has_component(e, ComponentKind::Meta));

        cmd.undo(&mut store);
        assert!(!store.has_component(e, ComponentKind::Meta));
        assert!(store.index(ComponentKind::Meta).unwrap().is_empty());
    }

    #[test]
    fn previous_is_recaptured_on_every_execute() {
        let (mut store, e) = store_with_entity();
        let a = Transform::new(0.0, 0.0, 1.0, 1.0);
        let b = a.with_position(5.0, 5.0);
        let c = a.with_position(9.0, 9.0);
        store.add_component(e, a);

        let mut cmd = SetComponent::new(e, c);
        cmd.execute(&mut store);
        cmd.undo(&mut store);

        // Someone else writes in between; redo now reverts to that value.
        store.add_component(e, b);
        cmd.execute(&mut store);
        cmd.undo(&mut store);
        assert_eq!(store.get_component::<Transform>(e), Some(&b));
    }

    #[test]
    fn set_on_missing_entity_is_harmless() {
        let mut store = Store::new();
        let ghost = EntityId::new();
        let mut cmd = SetComponent::new(ghost, Meta::new("x"));
        cmd.execute(&mut store);
        cmd.undo(&mut store);
        assert_eq!(store.entity_count(), 0);
    }

    #[test]
    fn remove_and_restore() {
        let (mut store, e) = store_with_entity();
        let meta = Meta::new("label");
        store.add_component(e, meta.clone());

        let mut cmd = RemoveComponent::new(e, ComponentKind::Meta);
        cmd.execute(&mut store);
        assert!(store.get_component::<Meta>(e).is_none());
        cmd.undo(&mut store);
        assert_eq!(store.get_component::<Meta>(e), Some(&meta));
    }

    #[test]
    fn remove_of_absent_component_undoes_to_nothing() {
        let (mut store, e) = store_with_entity();
        let mut cmd = RemoveComponent::new(e, ComponentKind::Visual);
        cmd.execute(&mut store);
        cmd.undo(&mut store);
        assert!(!store.has_component(e, ComponentKind::Visual));
    }
}
