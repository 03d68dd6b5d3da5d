use std::any::Any;
use std::collections::{BTreeMap, HashMap};

use crate::component::{
    Component, ComponentData, ComponentKind, Hover, Interaction, LayoutConfig, Meta, Selection,
    Transform, Visual,
};
use crate::entity::EntityId;

/// Object-safe view over one typed table, so tables of different record
/// types can live in a single map keyed by [`ComponentKind`].
pub(crate) trait ComponentTable: std::fmt::Debug {
    /// Store a value. Returns the previous value, or hands the component back
    /// if its variant does not belong in this table.
    fn insert(&mut self, id: EntityId, component: Component)
    -> Result<Option<Component>, Component>;

    fn remove(&mut self, id: EntityId) -> Option<Component>;

    fn get(&self, id: EntityId) -> Option<Component>;

    fn ids(&self) -> Vec<EntityId>;

    fn len(&self) -> usize;

    /// Bare records keyed by entity, for snapshots.
    fn rows_json(&self) -> serde_json::Result<BTreeMap<EntityId, serde_json::Value>>;

    fn as_any(&self) -> &dyn Any;
}

/// Rows of a single record type.
#[derive(Debug)]
pub(crate) struct TypedTable<T: ComponentData> {
    rows: HashMap<EntityId, T>,
}

impl<T: ComponentData> TypedTable<T> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&T> {
        self.rows.get(&id)
    }
}

impl<T: ComponentData> ComponentTable for TypedTable<T> {
    fn insert(
        &mut self,
        id: EntityId,
        component: Component,
    ) -> Result<Option<Component>, Component> {
        let value = T::try_from_component(component)?;
        Ok(self.rows.insert(id, value).map(T::into_component))
    }

    fn remove(&mut self, id: EntityId) -> Option<Component> {
        self.rows.remove(&id).map(T::into_component)
    }

    fn get(&self, id: EntityId) -> Option<Component> {
        self.rows.get(&id).cloned().map(T::into_component)
    }

    fn ids(&self) -> Vec<EntityId> {
        self.rows.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn rows_json(&self) -> serde_json::Result<BTreeMap<EntityId, serde_json::Value>> {
        self.rows
            .iter()
            .map(|(id, row)| Ok((*id, serde_json::to_value(row)?)))
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Lazily allocated tables, one per kind.
#[derive(Debug, Default)]
pub(crate) struct TableMap {
    tables: HashMap<ComponentKind, Box<dyn ComponentTable>>,
}

impl TableMap {
    pub(crate) fn typed<T: ComponentData>(&self) -> Option<&TypedTable<T>> {
        self.tables
            .get(&T::KIND)?
            .as_any()
            .downcast_ref::<TypedTable<T>>()
    }

    pub(crate) fn get(&self, kind: ComponentKind) -> Option<&dyn ComponentTable> {
        self.tables.get(&kind).map(|t| t.as_ref())
    }

    pub(crate) fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut Box<dyn ComponentTable>> {
        self.tables.get_mut(&kind)
    }

    /// The table for `kind`, allocating it on first use.
    pub(crate) fn get_or_create(&mut self, kind: ComponentKind) -> &mut Box<dyn ComponentTable> {
        self.tables.entry(kind).or_insert_with(|| new_table(kind))
    }

    pub(crate) fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.tables.keys().copied()
    }

    pub(crate) fn clear(&mut self) {
        self.tables.clear();
    }
}

fn new_table(kind: ComponentKind) -> Box<dyn ComponentTable> {
    match kind {
        ComponentKind::Transform => Box::new(TypedTable::<Transform>::new()),
        ComponentKind::Visual => Box::new(TypedTable::<Visual>::new()),
        ComponentKind::Interaction => Box::new(TypedTable::<Interaction>::new()),
        ComponentKind::LayoutConfig => Box::new(TypedTable::<LayoutConfig>::new()),
        ComponentKind::Meta => Box::new(TypedTable::<Meta>::new()),
        ComponentKind::Selection => Box::new(TypedTable::<Selection>::new()),
        ComponentKind::Hover => Box::new(TypedTable::<Hover>::new()),
    }
}
