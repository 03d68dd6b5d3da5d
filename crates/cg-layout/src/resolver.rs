use cg_core::{ComponentKind, EntityId, Interaction, LayoutConfig, Store, Transform};

use crate::config::SessionConfig;
use crate::geometry::{self, Point, Rect};

/// Where a dropped entity ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropResolution {
    /// No slot close enough: stays where it was dropped.
    Free {
        /// Final top-left corner of the dragged entity.
        position: Point,
    },
    /// Centered in an empty slot.
    Snap {
        /// The target slot.
        slot: EntityId,
        /// Final top-left corner of the dragged entity.
        position: Point,
    },
    /// Centered in a slot whose occupant moves to the dragged entity's
    /// starting position.
    Swap {
        /// The target slot.
        slot: EntityId,
        /// Final top-left corner of the dragged entity.
        position: Point,
        /// The entity that was in the slot.
        occupant: EntityId,
        /// Final top-left corner of the occupant.
        occupant_position: Point,
    },
}

impl DropResolution {
    /// Final top-left corner of the dragged entity.
    pub fn position(&self) -> Point {
        match *self {
            Self::Free { position }
            | Self::Snap { position, .. }
            | Self::Swap { position, .. } => position,
        }
    }

    /// The slot involved, if any.
    pub fn slot(&self) -> Option<EntityId> {
        match *self {
            Self::Free { .. } => None,
            Self::Snap { slot, .. } | Self::Swap { slot, .. } => Some(slot),
        }
    }

    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Free { .. } => "free",
            Self::Snap { .. } => "snap",
            Self::Swap { .. } => "swap",
        }
    }
}

/// Entities that are drop targets: a slot [`LayoutConfig`] and a [`Transform`].
/// Returned in ID order.
pub fn slots(store: &Store) -> Vec<EntityId> {
    store
        .query(&[ComponentKind::Transform, ComponentKind::LayoutConfig])
        .iter()
        .copied()
        .filter(|id| {
            store
                .get_component::<LayoutConfig>(*id)
                .is_some_and(LayoutConfig::is_slot)
        })
        .collect()
}

/// Entities that can be picked up: draggable, unlocked, not a slot.
/// Returned in ID order.
pub fn movables(store: &Store) -> Vec<EntityId> {
    store
        .query(&[ComponentKind::Transform, ComponentKind::Interaction])
        .iter()
        .copied()
        .filter(|id| {
            store
                .get_component::<Interaction>(*id)
                .is_some_and(Interaction::can_drag)
        })
        .filter(|id| {
            !store
                .get_component::<LayoutConfig>(*id)
                .is_some_and(LayoutConfig::is_slot)
        })
        .collect()
}

/// The entity whose center is closest to `slot`'s center, if that closest
/// distance is at most `threshold_px`.
///
/// `slot` itself, `exclude` and candidates without a transform are skipped.
/// On an exact tie the earlier candidate wins.
pub fn find_occupant(
    slot: EntityId,
    store: &Store,
    candidates: impl IntoIterator<Item = EntityId>,
    exclude: Option<EntityId>,
    threshold_px: f64,
) -> Option<EntityId> {
    let slot_center = geometry::center(store.get_component::<Transform>(slot)?);

    let mut best: Option<(EntityId, f64)> = None;
    for candidate in candidates {
        if candidate == slot || Some(candidate) == exclude {
            continue;
        }
        let Some(t) = store.get_component::<Transform>(candidate) else {
            continue;
        };
        let d = geometry::distance(slot_center, geometry::center(t));
        if !d.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((candidate, d));
        }
    }

    best.filter(|(_, d)| *d <= threshold_px).map(|(id, _)| id)
}

/// The slot whose center is closest to `point`, with that distance.
/// There is no cut-off: any slot at a finite distance qualifies.
pub fn nearest_slot(store: &Store, point: Point) -> Option<(EntityId, f64)> {
    let mut best: Option<(EntityId, f64)> = None;
    for slot in slots(store) {
        let Some(t) = store.get_component::<Transform>(slot) else {
            continue;
        };
        let d = geometry::distance(point, geometry::center(t));
        if !d.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((slot, d));
        }
    }
    best
}

/// Decide where `dragged` lands when released at `live`.
///
/// The nearest slot is a snap target only if its center is closer than
/// `slot width × snap_ratio` to the live center. A snapped entity is
/// centered in the slot. If another movable entity already sits in the slot
/// (within `occupant_threshold_px`), it is sent to the dragged entity's
/// `original` position.
pub fn resolve_drop(
    store: &Store,
    dragged: EntityId,
    live: &Transform,
    original: &Transform,
    config: &SessionConfig,
) -> DropResolution {
    let dropped_at = Point::new(live.x, live.y);

    let Some((slot, d)) = nearest_slot(store, geometry::center(live)) else {
        return DropResolution::Free {
            position: dropped_at,
        };
    };
    let Some(slot_t) = store.get_component::<Transform>(slot) else {
        return DropResolution::Free {
            position: dropped_at,
        };
    };
    let limit = slot_t.width * config.snap_ratio;
    if !d.is_finite() || d >= limit {
        tracing::trace!(%slot, distance = d, "nearest slot out of snap range");
        return DropResolution::Free {
            position: dropped_at,
        };
    }

    let position = Rect::from(slot_t).centered_origin(live.width, live.height);
    let occupant = find_occupant(
        slot,
        store,
        movables(store),
        Some(dragged),
        config.occupant_threshold_px,
    );

    match occupant {
        None => DropResolution::Snap { slot, position },
        Some(occupant) => DropResolution::Swap {
            slot,
            position,
            occupant,
            occupant_position: Point::new(original.x, original.y),
        },
    }
}
