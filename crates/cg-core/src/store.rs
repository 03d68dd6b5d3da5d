use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::component::{Component, ComponentData, ComponentKind};
use crate::entity::EntityId;
use crate::error::{StoreError, StoreResult};
use crate::notify::{ChangeEvent, ChangeKind, ChangeNotifier, SubscriptionId, Topic};
use crate::table::TableMap;

/// Canonical cache key for a multi-kind query: sorted and deduplicated, so
/// `[Visual, Transform]` and `[Transform, Visual, Transform]` share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<ComponentKind>);

impl QueryKey {
    /// Canonicalize a list of kinds.
    pub fn new(kinds: &[ComponentKind]) -> Self {
        let mut kinds = kinds.to_vec();
        kinds.sort();
        kinds.dedup();
        Self(kinds)
    }

    /// The kinds in canonical order.
    pub fn kinds(&self) -> &[ComponentKind] {
        &self.0
    }

    /// Returns true if `kind` feeds this query.
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.0.binary_search(&kind).is_ok()
    }
}

/// A cached query result. Repeated queries with no intervening membership
/// change hand out the same allocation, so `Rc::ptr_eq` detects "unchanged".
pub type QueryResult = Rc<BTreeSet<EntityId>>;

/// The entity-component store.
///
/// Owns the entity set, one lazily allocated typed table per kind, the
/// inverted kind → entity indices, and the query cache. Operations that name
/// an unknown entity or a missing component are no-ops that report `false`
/// or `None`; the UI may legitimately race ahead of the store.
///
/// The store is single-threaded: it hands out `Rc` query results and keeps
/// its cache behind a `RefCell`.
#[derive(Debug, Default)]
pub struct Store {
    pub(crate) entities: BTreeSet<EntityId>,
    pub(crate) tables: TableMap,
    pub(crate) indices: HashMap<ComponentKind, BTreeSet<EntityId>>,
    query_cache: RefCell<HashMap<QueryKey, QueryResult>>,
    pub(crate) notifier: ChangeNotifier,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------------

    /// Create an entity, with the given ID or a fresh one. Never fails;
    /// creating an ID that already exists leaves it untouched.
    pub fn create_entity(&mut self, id: Option<EntityId>) -> EntityId {
        let id = id.unwrap_or_default();
        if self.entities.insert(id) {
            tracing::debug!(entity = %id, "entity created");
        }
        id
    }

    /// Destroy an entity and every component attached to it.
    /// Returns false if the entity was unknown.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.entities.remove(&id) {
            tracing::trace!(entity = %id, "destroy ignored: unknown entity");
            return false;
        }

        self.notifier.begin_batch();
        for kind in ComponentKind::ALL {
            let removed = self
                .tables
                .get_mut(kind)
                .and_then(|table| table.remove(id))
                .is_some();
            if removed {
                self.unindex(id, kind);
                self.notifier
                    .emit(ChangeEvent::new(id, kind, ChangeKind::Removed));
            }
        }
        self.notifier.end_batch();

        tracing::debug!(entity = %id, "entity destroyed");
        true
    }

    /// Returns true if the entity exists.
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    /// All entities in ID order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    /// Attach a typed component, replacing any existing value of its kind.
    pub fn add_component<T: ComponentData>(&mut self, id: EntityId, value: T) -> bool {
        self.insert(id, value.into_component())
    }

    /// Attach a component, replacing any existing value of its kind.
    ///
    /// The write is a full overwrite, never a merge. Returns false (and
    /// stores nothing) if the entity does not exist.
    pub fn insert(&mut self, id: EntityId, component: Component) -> bool {
        if !self.entities.contains(&id) {
            tracing::trace!(entity = %id, kind = %component.kind(), "insert ignored: unknown entity");
            return false;
        }

        let kind = component.kind();
        let previous = match self.tables.get_or_create(kind).insert(id, component) {
            Ok(previous) => previous,
            Err(rejected) => {
                tracing::error!(kind = %kind, got = %rejected.kind(), "component routed to wrong table");
                return false;
            }
        };

        self.indices.entry(kind).or_default().insert(id);
        self.invalidate(kind);

        let change = if previous.is_some() {
            ChangeKind::Updated
        } else {
            ChangeKind::Added
        };
        tracing::trace!(entity = %id, kind = %kind, ?change, "component written");
        self.notifier.emit(ChangeEvent::new(id, kind, change));
        self.debug_verify(kind);
        true
    }

    /// Detach the component of `kind`. Returns false if there was none.
    pub fn remove_component(&mut self, id: EntityId, kind: ComponentKind) -> bool {
        let removed = self
            .tables
            .get_mut(kind)
            .and_then(|table| table.remove(id))
            .is_some();
        if !removed {
            return false;
        }

        self.unindex(id, kind);
        tracing::trace!(entity = %id, kind = %kind, "component removed");
        self.notifier
            .emit(ChangeEvent::new(id, kind, ChangeKind::Removed));
        self.debug_verify(kind);
        true
    }

    /// Borrow a typed component.
    pub fn get_component<T: ComponentData>(&self, id: EntityId) -> Option<&T> {
        self.tables.typed::<T>()?.get(id)
    }

    /// Copy out the component of `kind`, if any.
    pub fn get(&self, id: EntityId, kind: ComponentKind) -> Option<Component> {
        self.tables.get(kind)?.get(id)
    }

    /// Returns true if the entity carries a component of `kind`.
    pub fn has_component(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.indices
            .get(&kind)
            .is_some_and(|index| index.contains(&id))
    }

    /// Copies of every component on an entity, in kind order.
    pub fn components_of(&self, id: EntityId) -> Vec<Component> {
        ComponentKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(id, kind))
            .collect()
    }

    /// The index for `kind`, if any component of that kind was ever stored.
    pub fn index(&self, kind: ComponentKind) -> Option<&BTreeSet<EntityId>> {
        self.indices.get(&kind)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Entities carrying every listed kind.
    ///
    /// Starts from the first kind's index (in canonical order) and drops IDs
    /// missing any later kind. If any kind has never been indexed the result
    /// is empty. An empty kind list also yields the empty set.
    pub fn query(&self, kinds: &[ComponentKind]) -> QueryResult {
        let key = QueryKey::new(kinds);
        if let Some(hit) = self.query_cache.borrow().get(&key) {
            return Rc::clone(hit);
        }

        let result = Rc::new(self.compute_query(&key));
        tracing::trace!(kinds = ?key.kinds(), matches = result.len(), "query computed");
        self.query_cache
            .borrow_mut()
            .insert(key, Rc::clone(&result));
        result
    }

    /// Number of cached query results.
    pub fn cached_queries(&self) -> usize {
        self.query_cache.borrow().len()
    }

    fn compute_query(&self, key: &QueryKey) -> BTreeSet<EntityId> {
        let Some((first, rest)) = key.kinds().split_first() else {
            return BTreeSet::new();
        };
        let Some(working) = self.indices.get(first) else {
            return BTreeSet::new();
        };

        let mut filters = Vec::with_capacity(rest.len());
        for kind in rest {
            match self.indices.get(kind) {
                Some(index) => filters.push(index),
                None => return BTreeSet::new(),
            }
        }

        working
            .iter()
            .filter(|id| filters.iter().all(|index| index.contains(id)))
            .copied()
            .collect()
    }

    fn invalidate(&mut self, kind: ComponentKind) {
        self.query_cache
            .get_mut()
            .retain(|key, _| !key.contains(kind));
    }

    pub(crate) fn invalidate_all(&mut self) {
        self.query_cache.get_mut().clear();
    }

    fn unindex(&mut self, id: EntityId, kind: ComponentKind) {
        if let Some(index) = self.indices.get_mut(&kind) {
            index.remove(&id);
        }
        self.invalidate(kind);
    }

    // -----------------------------------------------------------------------
    // Notification
    // -----------------------------------------------------------------------

    /// Run `f` as a group. Change notifications raised inside are delivered
    /// when the outermost batch returns. There is no rollback.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.notifier.begin_batch();
        let result = f(self);
        self.notifier.end_batch();
        result
    }

    /// Subscribe to changes matching `topic`.
    pub fn subscribe(
        &mut self,
        topic: Topic,
        callback: impl FnMut(&ChangeEvent) + 'static,
    ) -> SubscriptionId {
        self.notifier.subscribe(topic, callback)
    }

    /// Cancel a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Verify that every index equals its table's key set and that every
    /// component belongs to a live entity.
    pub fn check_invariants(&self) -> StoreResult<()> {
        ComponentKind::ALL
            .into_iter()
            .try_for_each(|kind| self.verify_kind(kind))
    }

    fn verify_kind(&self, kind: ComponentKind) -> StoreResult<()> {
        let table_ids: BTreeSet<EntityId> = self
            .tables
            .get(kind)
            .map(|table| table.ids().into_iter().collect())
            .unwrap_or_default();
        let empty = BTreeSet::new();
        let index = self.indices.get(&kind).unwrap_or(&empty);

        if *index != table_ids {
            return Err(StoreError::InvariantViolation {
                kind,
                detail: format!(
                    "index holds {} ids, table holds {}",
                    index.len(),
                    table_ids.len()
                ),
            });
        }
        if let Some(orphan) = table_ids.iter().find(|id| !self.entities.contains(id)) {
            return Err(StoreError::InvariantViolation {
                kind,
                detail: format!("component attached to unknown entity {orphan}"),
            });
        }
        Ok(())
    }

    #[cfg(debug_assertions)]
    fn debug_verify(&self, kind: ComponentKind) {
        if let Err(err) = self.verify_kind(kind) {
            tracing::error!(%err, "store invariant violated");
            panic!("{err}");
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_verify(&self, _kind: ComponentKind) {}
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;
    use crate::component::{Interaction, LayoutConfig, Meta, Selection, Transform, Visual};

    fn transform(x: f64, y: f64) -> Transform {
        Transform::new(x, y, 80.0, 80.0)
    }

    #[test]
    fn create_entity_with_and_without_id() {
        let mut store = Store::new();
        let generated = store.create_entity(None);
        let given = EntityId::new();
        assert_eq!(store.create_entity(Some(given)), given);
        assert!(store.contains_entity(generated));
        assert!(store.contains_entity(given));
        assert_eq!(store.entity_count(), 2);

        // Re-creating is a no-op.
        store.add_component(given, transform(1.0, 1.0));
        store.create_entity(Some(given));
        assert!(store.get_component::<Transform>(given).is_some());
    }

    #[test]
    fn add_component_overwrites_without_merging() {
        let mut store = Store::new();
        let e = store.create_entity(None);
        store.add_component(
            e,
            Visual {
                fill: Some("red".into()),
                stroke: Some("black".into()),
                ..Visual::default()
            },
        );
        store.add_component(e, Visual::filled("blue"));

        let visual = store.get_component::<Visual>(e).unwrap();
        assert_eq!(visual.fill.as_deref(), Some("blue"));
        assert!(visual.stroke.is_none());
    }

    #[test]
    fn operations_on_unknown_entities_are_noops() {
        let mut store = Store::new();
        let ghost = EntityId::new();
        assert!(!store.add_component(ghost, transform(0.0, 0.0)));
        assert!(!store.remove_component(ghost, ComponentKind::Transform));
        assert!(!store.destroy_entity(ghost));
        assert!(store.get(ghost, ComponentKind::Transform).is_none());
        assert!(store.index(ComponentKind::Transform).is_none());
        store.check_invariants().unwrap();
    }

    #[test]
    fn remove_missing_component_is_noop() {
        let mut store = Store::new();
        let e = store.create_entity(None);
        assert!(!store.remove_component(e, ComponentKind::Meta));
    }

    #[test]
    fn destroy_cascades_to_every_kind() {
        let mut store = Store::new();
        let e = store.create_entity(None);
        let keep = store.create_entity(None);
        store.add_component(e, transform(0.0, 0.0));
        store.add_component(e, Interaction::default());
        store.add_component(e, Selection::now());
        store.add_component(keep, transform(5.0, 5.0));

        assert!(store.destroy_entity(e));
        for kind in ComponentKind::ALL {
            assert!(!store.query(&[kind]).contains(&e));
            assert!(!store.has_component(e, kind));
        }
        assert!(store.query(&[ComponentKind::Transform]).contains(&keep));
        store.check_invariants().unwrap();
    }

    #[test]
    fn query_intersects_indices() {
        let mut store = Store::new();
        let both = store.create_entity(None);
        let only_t = store.create_entity(None);
        store.add_component(both, transform(0.0, 0.0));
        store.add_component(both, LayoutConfig::slot(0));
        store.add_component(only_t, transform(1.0, 1.0));

        let result = store.query(&[ComponentKind::LayoutConfig, ComponentKind::Transform]);
        assert_eq!(result.iter().copied().collect::<Vec<_>>(), vec![both]);
    }

    #[test]
    fn query_with_unindexed_kind_is_empty() {
        let mut store = Store::new();
        let e = store.create_entity(None);
        store.add_component(e, transform(0.0, 0.0));
        assert!(store.query(&[ComponentKind::Transform, ComponentKind::Meta]).is_empty());
        assert!(store.query(&[]).is_empty());
    }

    #[test]
    fn query_cache_returns_same_reference_until_invalidated() {
        let mut store = Store::new();
        let e = store.create_entity(None);
        store.add_component(e, transform(0.0, 0.0));
        store.add_component(e, Visual::default());

        let kinds = [ComponentKind::Transform, ComponentKind::Visual];
        let first = store.query(&kinds);
        let second = store.query(&[ComponentKind::Visual, ComponentKind::Transform]);
        assert!(Rc::ptr_eq(&first, &second));

        // Unrelated kind leaves the entry alone.
        store.add_component(e, Meta::new("card"));
        assert!(Rc::ptr_eq(&first, &store.query(&kinds)));

        store.remove_component(e, ComponentKind::Visual);
        let third = store.query(&kinds);
        assert!(!Rc::ptr_eq(&first, &third));
        assert!(third.is_empty());
    }

    #[test]
    fn mutation_notifies_cell_and_query_subscribers() {
        let mut store = Store::new();
        let e = store.create_entity(None);
        let cell_log = Rc::new(RefCell::new(Vec::new()));
        let query_log = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&cell_log);
        store.subscribe(Topic::Cell(e, ComponentKind::Transform), move |ev| {
            sink.borrow_mut().push(ev.change)
        });
        let sink = Rc::clone(&query_log);
        store.subscribe(
            Topic::Query(QueryKey::new(&[ComponentKind::Transform])),
            move |ev| sink.borrow_mut().push(ev.change),
        );

        store.add_component(e, transform(0.0, 0.0));
        store.add_component(e, transform(10.0, 0.0));
        store.add_component(e, Visual::default());
        store.destroy_entity(e);

        assert_eq!(
            *cell_log.borrow(),
            vec![ChangeKind::Added, ChangeKind::Updated, ChangeKind::Removed]
        );
        assert_eq!(
            *query_log.borrow(),
            vec![ChangeKind::Added, ChangeKind::Removed]
        );
    }

    #[test]
    fn batch_delivers_after_closure_returns() {
        let mut store = Store::new();
        let e = store.create_entity(None);
        let log = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&log);
        store.subscribe(Topic::All, move |_| *sink.borrow_mut() += 1);

        let seen_inside = store.batch(|s| {
            s.add_component(e, transform(0.0, 0.0));
            s.add_component(e, Visual::default());
            *log.borrow()
        });

        assert_eq!(seen_inside, 0);
        assert_eq!(*log.borrow(), 2);
    }

    #[test]
    fn components_of_lists_in_kind_order() {
        let mut store = Store::new();
        let e = store.create_entity(None);
        store.add_component(e, Meta::new("a"));
        store.add_component(e, transform(0.0, 0.0));
        let kinds: Vec<_> = store.components_of(e).iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![ComponentKind::Transform, ComponentKind::Meta]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize, ComponentKind),
        Remove(usize, ComponentKind),
        Destroy(usize),
    }

    fn kind_strategy() -> impl Strategy<Value = ComponentKind> {
        prop::sample::select(ComponentKind::ALL.to_vec())
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..6usize, kind_strategy()).prop_map(|(e, k)| Op::Add(e, k)),
            (0..6usize, kind_strategy()).prop_map(|(e, k)| Op::Remove(e, k)),
            (0..6usize).prop_map(Op::Destroy),
        ]
    }

    fn sample(kind: ComponentKind) -> Component {
        match kind {
            ComponentKind::Transform => transform(1.0, 2.0).into_component(),
            ComponentKind::Visual => Visual::default().into_component(),
            ComponentKind::Interaction => Interaction::default().into_component(),
            ComponentKind::LayoutConfig => LayoutConfig::slot(1).into_component(),
            ComponentKind::Meta => Meta::new("m").into_component(),
            ComponentKind::Selection => Selection::now().into_component(),
            ComponentKind::Hover => crate::component::Hover::now().into_component(),
        }
    }

    proptest! {
        #[test]
        fn indices_track_tables_for_any_mutation_sequence(ops in prop::collection::vec(op_strategy(), 0..60)) {
            let mut store = Store::new();
            let ids: Vec<EntityId> = (0..6).map(|_| store.create_entity(None)).collect();
            let mut destroyed = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Add(e, kind) => { store.insert(ids[e], sample(kind)); }
                    Op::Remove(e, kind) => { store.remove_component(ids[e], kind); }
                    Op::Destroy(e) => {
                        store.destroy_entity(ids[e]);
                        destroyed.insert(ids[e]);
                    }
                }
                prop_assert!(store.check_invariants().is_ok());
                for kind in ComponentKind::ALL {
                    let result = store.query(&[kind]);
                    for gone in &destroyed {
                        prop_assert!(!result.contains(gone));
                    }
                }
            }
        }
    }
}
