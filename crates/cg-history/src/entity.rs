use cg_core::{Component, EntityId, Store};

use crate::command::{Command, CommandKind, CommandMeta};

/// Create an entity with a fixed ID and initial components.
///
/// The ID is chosen at build time so redo recreates the same entity and
/// later commands in the history keep pointing at it.
#[derive(Debug, Clone)]
pub struct SpawnEntity {
    meta: CommandMeta,
    entity: EntityId,
    components: Vec<Component>,
}

impl SpawnEntity {
    /// Spawn a fresh entity with `components`.
    pub fn new(components: Vec<Component>) -> Self {
        Self::with_id(EntityId::new(), components)
    }

    /// Spawn under a caller-chosen ID.
    pub fn with_id(entity: EntityId, components: Vec<Component>) -> Self {
        Self {
            meta: CommandMeta::new(CommandKind::SpawnEntity),
            entity,
            components,
        }
    }

    /// The ID the entity is created under.
    pub fn entity(&self) -> EntityId {
        self.entity
    }
}

impl Command for SpawnEntity {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn execute(&mut self, store: &mut Store) {
        let entity = self.entity;
        let components = &self.components;
        store.batch(|store| {
            store.create_entity(Some(entity));
            for component in components {
                store.insert(entity, component.clone());
            }
        });
    }

    fn undo(&mut self, store: &mut Store) {
        store.destroy_entity(self.entity);
    }
}

/// Destroy an entity, restoring it with all its components on undo.
#[derive(Debug, Clone)]
pub struct DespawnEntity {
    meta: CommandMeta,
    entity: EntityId,
    captured: Option<Vec<Component>>,
}

impl DespawnEntity {
    /// Build a command destroying `entity`.
    pub fn new(entity: EntityId) -> Self {
        Self {
            meta: CommandMeta::new(CommandKind::DespawnEntity),
            entity,
            captured: None,
        }
    }
}

impl Command for DespawnEntity {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn execute(&mut self, store: &mut Store) {
        self.captured = store
            .contains_entity(self.entity)
            .then(|| store.components_of(self.entity));
        store.destroy_entity(self.entity);
    }

    fn undo(&mut self, store: &mut Store) {
        let Some(components) = &self.captured else {
            return;
        };
        let entity = self.entity;
        store.batch(|store| {
            store.create_entity(Some(entity));
            for component in components {
                store.insert(entity, component.clone());
            }
        });
    }
}
