use cg_core::{EntityId, Interaction, Store, Transform};
use cg_history::{Batch, BoxedCommand, History, SetComponent};

use crate::config::SessionConfig;
use crate::geometry::Point;
use crate::resolver::{DropResolution, resolve_drop};

/// What a release did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// No gesture was active.
    Idle,
    /// Released without moving. Nothing recorded.
    Click {
        /// The pressed entity.
        entity: EntityId,
    },
    /// The entity disappeared mid-gesture. Nothing recorded.
    Vanished {
        /// The entity that was being dragged.
        entity: EntityId,
    },
    /// One history entry was recorded.
    Placed {
        /// The dragged entity.
        entity: EntityId,
        /// Where it (and any displaced occupant) went.
        resolution: DropResolution,
    },
}

impl DropOutcome {
    /// Returns true if the release recorded a history entry.
    pub fn recorded(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    entity: EntityId,
    original: Transform,
    grab_offset: Point,
    moved: bool,
}

/// Single-gesture drag state machine: idle or dragging one entity.
///
/// While dragging, pointer moves write the entity's transform straight into
/// the store so it can be drawn, bypassing history. On release that trail is
/// rewound to the pre-drag transform and the final placement goes through
/// [`History`] as exactly one entry.
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    /// An idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// The entity being dragged.
    pub fn active_entity(&self) -> Option<EntityId> {
        self.active.map(|drag| drag.entity)
    }

    /// Start dragging `entity` grabbed at `pointer`.
    ///
    /// Ignored (returns false) while another gesture is active, or if the
    /// entity has no transform or is not draggable.
    pub fn press(&mut self, store: &Store, entity: EntityId, pointer: Point) -> bool {
        if let Some(drag) = &self.active {
            tracing::warn!(active = %drag.entity, pressed = %entity, "press ignored: drag already active");
            return false;
        }
        let draggable = store
            .get_component::<Interaction>(entity)
            .is_some_and(Interaction::can_drag);
        if !draggable {
            tracing::debug!(%entity, "press ignored: not draggable");
            return false;
        }
        let Some(original) = store.get_component::<Transform>(entity).copied() else {
            tracing::debug!(%entity, "press ignored: no transform");
            return false;
        };

        self.active = Some(ActiveDrag {
            entity,
            original,
            grab_offset: pointer - Point::new(original.x, original.y),
            moved: false,
        });
        tracing::debug!(%entity, %pointer, "drag started");
        true
    }

    /// Follow the pointer. Writes the live transform directly; not undoable.
    /// Returns false if no gesture is active or the pointer is not finite.
    pub fn move_to(&mut self, store: &mut Store, pointer: Point) -> bool {
        let Some(drag) = self.active.as_mut() else {
            return false;
        };
        if !pointer.x.is_finite() || !pointer.y.is_finite() {
            tracing::warn!(entity = %drag.entity, %pointer, "ignoring non-finite pointer");
            return false;
        }
        let Some(current) = store.get_component::<Transform>(drag.entity).copied() else {
            return false;
        };
        let origin = pointer - drag.grab_offset;
        store.add_component(drag.entity, current.with_position(origin.x, origin.y));
        drag.moved = true;
        true
    }

    /// Finish the gesture, record the placement and return to idle.
    pub fn release(
        &mut self,
        store: &mut Store,
        history: &mut History,
        config: &SessionConfig,
    ) -> DropOutcome {
        let Some(drag) = self.active.take() else {
            return DropOutcome::Idle;
        };
        let entity = drag.entity;
        if !drag.moved {
            tracing::debug!(%entity, "released without moving");
            return DropOutcome::Click { entity };
        }
        let Some(live) = store.get_component::<Transform>(entity).copied() else {
            tracing::warn!(%entity, "dragged entity vanished before release");
            return DropOutcome::Vanished { entity };
        };

        let resolution = resolve_drop(store, entity, &live, &drag.original, config);

        // Rewind the pointer trail so the recorded command captures the
        // pre-drag transform as its undo target.
        store.add_component(entity, drag.original);

        let place = |t: &Transform, at: Point| SetComponent::new(entity, t.with_position(at.x, at.y));
        let command: BoxedCommand = match resolution {
            DropResolution::Free { position } | DropResolution::Snap { position, .. } => {
                Box::new(place(&drag.original, position))
            }
            DropResolution::Swap {
                position,
                occupant,
                occupant_position,
                ..
            } => {
                let mut commands: Vec<BoxedCommand> =
                    vec![Box::new(place(&drag.original, position))];
                if let Some(occupant_t) = store.get_component::<Transform>(occupant) {
                    commands.push(Box::new(SetComponent::new(
                        occupant,
                        occupant_t.with_position(occupant_position.x, occupant_position.y),
                    )));
                }
                Box::new(Batch::new(commands))
            }
        };
        history.execute_boxed(store, command);

        tracing::info!(%entity, outcome = resolution.label(), position = %resolution.position(), "drop resolved");
        DropOutcome::Placed { entity, resolution }
    }

    /// Abort the gesture: restore the pre-drag transform and record nothing.
    /// Returns false if no gesture was active.
    pub fn cancel(&mut self, store: &mut Store) -> bool {
        let Some(drag) = self.active.take() else {
            return false;
        };
        if drag.moved && store.contains_entity(drag.entity) {
            store.add_component(drag.entity, drag.original);
        }
        tracing::debug!(entity = %drag.entity, "drag cancelled");
        true
    }

    /// Forget any active gesture without touching the store.
    pub(crate) fn reset(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use cg_core::{ComponentKind, LayoutConfig};

    use super::*;

    struct Board {
        store: Store,
        history: History,
        drag: DragController,
        config: SessionConfig,
    }

    impl Board {
        fn new() -> Self {
            Self {
                store: Store::new(),
                history: History::default(),
                drag: DragController::new(),
                config: SessionConfig::default(),
            }
        }

        fn item(&mut self, x: f64, y: f64) -> EntityId {
            let id = self.store.create_entity(None);
            self.store.add_component(id, Transform::new(x, y, 80.0, 80.0));
            self.store.add_component(id, Interaction::default());
            id
        }

        fn slot(&mut self, x: f64, y: f64) -> EntityId {
            let id = self.store.create_entity(None);
            self.store.add_component(id, Transform::new(x, y, 80.0, 80.0));
            self.store.add_component(id, LayoutConfig::slot(0));
            id
        }

        fn pos(&self, id: EntityId) -> (f64, f64) {
            let t = self.store.get_component::<Transform>(id).unwrap();
            (t.x, t.y)
        }

        fn release(&mut self) -> DropOutcome {
            self.drag
                .release(&mut self.store, &mut self.history, &self.config)
        }
    }

    #[test]
    fn release_over_own_slot_snaps_with_one_command() {
        let mut b = Board::new();
        let slot = b.slot(100.0, 100.0);
        let item = b.item(100.0, 100.0);

        assert!(b.drag.press(&b.store, item, Point::new(140.0, 140.0)));
        b.drag.move_to(&mut b.store, Point::new(145.0, 143.0));
        let outcome = b.release();

        assert_eq!(
            outcome,
            DropOutcome::Placed {
                entity: item,
                resolution: DropResolution::Snap {
                    slot,
                    position: Point::new(100.0, 100.0),
                },
            }
        );
        assert_eq!(b.pos(item), (100.0, 100.0));
        assert_eq!(b.history.past_len(), 1);
    }

    #[test]
    fn swap_is_one_batch_reverted_by_one_undo() {
        let mut b = Board::new();
        b.slot(300.0, 100.0);
        let a = b.item(100.0, 100.0);
        let occupant = b.item(300.0, 100.0);

        assert!(b.drag.press(&b.store, a, Point::new(110.0, 110.0)));
        b.drag.move_to(&mut b.store, Point::new(200.0, 150.0));
        b.drag.move_to(&mut b.store, Point::new(305.0, 112.0));
        let outcome = b.release();
        assert!(outcome.recorded());

        assert_eq!(b.pos(a), (300.0, 100.0));
        assert_eq!(b.pos(occupant), (100.0, 100.0));
        assert_eq!(b.history.past_len(), 1);
        assert_eq!(
            b.history.peek_undo().map(|m| m.kind),
            Some(cg_history::CommandKind::Batch)
        );

        assert!(b.history.undo(&mut b.store));
        assert_eq!(b.pos(a), (100.0, 100.0));
        assert_eq!(b.pos(occupant), (300.0, 100.0));
    }

    #[test]
    fn undo_after_free_drop_restores_pre_drag_position() {
        let mut b = Board::new();
        let item = b.item(0.0, 0.0);

        b.drag.press(&b.store, item, Point::new(10.0, 10.0));
        for step in 1..=20 {
            let p = f64::from(step) * 10.0;
            b.drag.move_to(&mut b.store, Point::new(10.0 + p, 10.0 + p));
        }
        let outcome = b.release();
        assert!(matches!(
            outcome,
            DropOutcome::Placed {
                resolution: DropResolution::Free { .. },
                ..
            }
        ));
        assert_eq!(b.pos(item), (200.0, 200.0));
        assert_eq!(b.history.past_len(), 1);

        b.history.undo(&mut b.store);
        assert_eq!(b.pos(item), (0.0, 0.0));
    }

    #[test]
    fn second_press_is_ignored() {
        let mut b = Board::new();
        let first = b.item(0.0, 0.0);
        let second = b.item(200.0, 0.0);

        assert!(b.drag.press(&b.store, first, Point::new(1.0, 1.0)));
        assert!(!b.drag.press(&b.store, second, Point::new(201.0, 1.0)));
        assert_eq!(b.drag.active_entity(), Some(first));
    }

    #[test]
    fn cancel_restores_and_records_nothing() {
        let mut b = Board::new();
        let item = b.item(0.0, 0.0);

        b.drag.press(&b.store, item, Point::new(0.0, 0.0));
        b.drag.move_to(&mut b.store, Point::new(500.0, 500.0));
        assert_eq!(b.pos(item), (500.0, 500.0));

        assert!(b.drag.cancel(&mut b.store));
        assert_eq!(b.pos(item), (0.0, 0.0));
        assert!(!b.drag.is_dragging());
        assert_eq!(b.history.past_len(), 0);
        assert!(!b.drag.cancel(&mut b.store));
    }

    #[test]
    fn click_records_nothing() {
        let mut b = Board::new();
        let item = b.item(0.0, 0.0);
        b.drag.press(&b.store, item, Point::new(5.0, 5.0));
        assert_eq!(b.release(), DropOutcome::Click { entity: item });
        assert_eq!(b.history.past_len(), 0);
        assert_eq!(b.release(), DropOutcome::Idle);
    }

    #[test]
    fn press_on_locked_or_plain_entity_is_ignored() {
        let mut b = Board::new();
        let locked = b.item(0.0, 0.0);
        b.store.add_component(
            locked,
            Interaction {
                locked: true,
                ..Interaction::default()
            },
        );
        let slot = b.slot(100.0, 0.0);

        assert!(!b.drag.press(&b.store, locked, Point::default()));
        assert!(!b.drag.press(&b.store, slot, Point::default()));
        assert!(!b.drag.is_dragging());
    }

    #[test]
    fn entity_destroyed_mid_drag_records_nothing() {
        let mut b = Board::new();
        let item = b.item(0.0, 0.0);
        b.drag.press(&b.store, item, Point::default());
        b.drag.move_to(&mut b.store, Point::new(50.0, 50.0));
        b.store.destroy_entity(item);

        assert_eq!(b.release(), DropOutcome::Vanished { entity: item });
        assert_eq!(b.history.past_len(), 0);
        assert!(!b.store.has_component(item, ComponentKind::Transform));
    }

    #[test]
    fn grab_offset_is_preserved() {
        let mut b = Board::new();
        let item = b.item(10.0, 20.0);
        b.drag.press(&b.store, item, Point::new(30.0, 50.0));
        b.drag.move_to(&mut b.store, Point::new(130.0, 150.0));
        assert_eq!(b.pos(item), (110.0, 120.0));
    }

    #[test]
    fn non_finite_pointer_is_ignored() {
        let mut b = Board::new();
        let item = b.item(0.0, 0.0);
        b.drag.press(&b.store, item, Point::new(10.0, 10.0));

        assert!(!b.drag.move_to(&mut b.store, Point::new(f64::INFINITY, 0.0)));
        assert!(!b.drag.move_to(&mut b.store, Point::new(f64::NAN, f64::NAN)));
        assert_eq!(b.pos(item), (0.0, 0.0));
        assert!(b.drag.is_dragging());

        assert_eq!(b.release(), DropOutcome::Click { entity: item });
        assert_eq!(b.history.past_len(), 0);
    }
}
