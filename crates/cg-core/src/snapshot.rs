use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentKind};
use crate::entity::EntityId;
use crate::error::{StoreError, StoreResult};
use crate::notify::{ChangeEvent, ChangeKind};
use crate::store::Store;

/// The persisted form of a store.
///
/// ```json
/// { "entities": [id, ...], "components": { "Transform": { id: {...} }, ... } }
/// ```
///
/// Transient kinds ([`ComponentKind::TRANSIENT`]) never appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    /// Every live entity.
    pub entities: Vec<EntityId>,
    /// Bare component records, grouped by kind, keyed by entity.
    pub components: BTreeMap<ComponentKind, BTreeMap<EntityId, serde_json::Value>>,
}

impl Store {
    /// Capture entities and every non-transient table.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        let mut components = BTreeMap::new();
        for kind in self.tables.kinds() {
            if kind.is_transient() {
                continue;
            }
            let Some(table) = self.tables.get(kind) else {
                continue;
            };
            if table.len() == 0 {
                continue;
            }
            let rows = table.rows_json()?;
            verify_rows(kind, &rows)?;
            components.insert(kind, rows);
        }

        Ok(Snapshot {
            entities: self.entities.iter().copied().collect(),
            components,
        })
    }

    /// Serialize the persistent state to a JSON payload.
    pub fn serialize(&self) -> StoreResult<String> {
        let snapshot = self.snapshot()?;
        let payload = serde_json::to_string(&snapshot)?;
        tracing::info!(
            entities = snapshot.entities.len(),
            bytes = payload.len(),
            "store serialized"
        );
        Ok(payload)
    }

    /// Replace all state with the contents of a JSON payload.
    ///
    /// The payload is fully parsed and validated before anything is touched;
    /// on error the store is left exactly as it was.
    pub fn deserialize(&mut self, payload: &str) -> StoreResult<()> {
        let snapshot: Snapshot = serde_json::from_str(payload)?;
        self.restore(snapshot)
    }

    /// Replace all state with a snapshot. Same validation as [`Store::deserialize`].
    pub fn restore(&mut self, snapshot: Snapshot) -> StoreResult<()> {
        let entities: BTreeSet<EntityId> = snapshot.entities.into_iter().collect();
        let rows = decode_rows(&entities, snapshot.components)?;

        self.notifier.begin_batch();

        let old_cells: Vec<(EntityId, ComponentKind)> = self
            .indices
            .iter()
            .flat_map(|(kind, ids)| ids.iter().map(move |id| (*id, *kind)))
            .collect();
        for (id, kind) in old_cells {
            self.notifier
                .emit(ChangeEvent::new(id, kind, ChangeKind::Removed));
        }

        self.entities.clear();
        self.tables.clear();
        self.indices.clear();
        self.invalidate_all();

        self.entities = entities;
        for (id, component) in rows {
            let kind = component.kind();
            if let Err(rejected) = self.tables.get_or_create(kind).insert(id, component) {
                tracing::error!(kind = %kind, got = %rejected.kind(), "component routed to wrong table");
                continue;
            }
            self.indices.entry(kind).or_default().insert(id);
            self.notifier
                .emit(ChangeEvent::new(id, kind, ChangeKind::Added));
        }

        self.notifier.end_batch();

        if let Err(err) = self.check_invariants() {
            tracing::error!(%err, "store inconsistent after restore");
            return Err(err);
        }
        tracing::info!(entities = self.entity_count(), "store restored");
        Ok(())
    }
}

/// Every row must decode back into its record. Non-finite floats encode as
/// `null` and would produce a payload `deserialize` refuses.
fn verify_rows(
    kind: ComponentKind,
    rows: &BTreeMap<EntityId, serde_json::Value>,
) -> StoreResult<()> {
    for (entity, value) in rows {
        Component::from_json(kind, value.clone()).map_err(|source| {
            tracing::warn!(%kind, %entity, "component cannot be persisted");
            StoreError::InvalidComponent {
                kind,
                entity: *entity,
                source,
            }
        })?;
    }
    Ok(())
}

fn decode_rows(
    entities: &BTreeSet<EntityId>,
    components: BTreeMap<ComponentKind, BTreeMap<EntityId, serde_json::Value>>,
) -> StoreResult<Vec<(EntityId, Component)>> {
    let mut rows = Vec::new();
    for (kind, table) in components {
        if kind.is_transient() {
            return Err(StoreError::TransientInSnapshot(kind));
        }
        for (entity, value) in table {
            if !entities.contains(&entity) {
                return Err(StoreError::DanglingEntity { kind, entity });
            }
            let component = Component::from_json(kind, value).map_err(|source| {
                StoreError::InvalidComponent {
                    kind,
                    entity,
                    source,
                }
            })?;
            rows.push((entity, component));
        }
    }
    Ok(rows)
}
