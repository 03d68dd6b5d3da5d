use std::fmt;

use crate::component::ComponentKind;
use crate::entity::EntityId;
use crate::store::QueryKey;

/// What happened to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The entity gained a component of this kind.
    Added,
    /// An existing component was overwritten.
    Updated,
    /// The component was removed (directly or by destroying the entity).
    Removed,
}

impl ChangeKind {
    /// Added and Removed change the kind's index; Updated does not.
    pub fn touches_index(self) -> bool {
        matches!(self, Self::Added | Self::Removed)
    }
}

/// One mutation of one `(entity, kind)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeEvent {
    /// The entity whose cell changed.
    pub entity: EntityId,
    /// The component kind of the cell.
    pub kind: ComponentKind,
    /// How it changed.
    pub change: ChangeKind,
}

impl ChangeEvent {
    /// Build an event.
    pub fn new(entity: EntityId, kind: ComponentKind, change: ChangeKind) -> Self {
        Self {
            entity,
            kind,
            change,
        }
    }
}

/// What a subscriber wants to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// Every change to one `(entity, kind)` cell.
    Cell(EntityId, ComponentKind),
    /// Every change to any cell of one kind.
    Kind(ComponentKind),
    /// Membership changes feeding a cached query: Added or Removed of any
    /// kind in the key.
    Query(QueryKey),
    /// Everything.
    All,
}

impl Topic {
    /// Returns true if `event` is relevant to this topic.
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        match self {
            Self::Cell(entity, kind) => *entity == event.entity && *kind == event.kind,
            Self::Kind(kind) => *kind == event.kind,
            Self::Query(key) => event.change.touches_index() && key.contains(event.kind),
            Self::All => true,
        }
    }
}

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ChangeEvent)>;

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    callback: Callback,
}

/// Push-based change delivery.
///
/// Events are delivered synchronously, in mutation order, to every
/// subscriber whose [`Topic`] matches. While a batch is open events are
/// queued and delivered when the outermost batch closes.
#[derive(Default)]
pub struct ChangeNotifier {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    batch_depth: usize,
    pending: Vec<ChangeEvent>,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscribers.len())
            .field("batch_depth", &self.batch_depth)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl ChangeNotifier {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events matching `topic`.
    pub fn subscribe(
        &mut self,
        topic: Topic,
        callback: impl FnMut(&ChangeEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        tracing::trace!(?topic, ?id, "subscribed");
        self.subscribers.push(Subscriber {
            id,
            topic,
            callback: Box::new(callback),
        });
        id
    }

    /// Drop a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` now, or queue it if a batch is open.
    pub fn emit(&mut self, event: ChangeEvent) {
        if self.batch_depth > 0 {
            self.pending.push(event);
        } else {
            self.deliver(&event);
        }
    }

    /// Open a (possibly nested) batch.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close a batch; closing the outermost one flushes the queue in order.
    pub fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 && !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            tracing::trace!(events = pending.len(), "flushing batched changes");
            for event in &pending {
                self.deliver(event);
            }
        }
    }

    /// True while inside a batch.
    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    fn deliver(&mut self, event: &ChangeEvent) {
        for subscriber in &mut self.subscribers {
            if subscriber.topic.matches(event) {
                (subscriber.callback)(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder(
        notifier: &mut ChangeNotifier,
        topic: Topic,
    ) -> (SubscriptionId, Rc<RefCell<Vec<ChangeEvent>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let id = notifier.subscribe(topic, move |e| sink.borrow_mut().push(*e));
        (id, log)
    }

    #[test]
    fn cell_topic_only_sees_its_cell() {
        let mut n = ChangeNotifier::new();
        let a = EntityId::new();
        let b = EntityId::new();
        let (_, log) = recorder(&mut n, Topic::Cell(a, ComponentKind::Transform));

        n.emit(ChangeEvent::new(a, ComponentKind::Transform, ChangeKind::Added));
        n.emit(ChangeEvent::new(a, ComponentKind::Visual, ChangeKind::Added));
        n.emit(ChangeEvent::new(b, ComponentKind::Transform, ChangeKind::Added));
        n.emit(ChangeEvent::new(a, ComponentKind::Transform, ChangeKind::Updated));

        let seen: Vec<_> = log.borrow().iter().map(|e| e.change).collect();
        assert_eq!(seen, vec![ChangeKind::Added, ChangeKind::Updated]);
    }

    #[test]
    fn query_topic_ignores_updates() {
        let mut n = ChangeNotifier::new();
        let key = QueryKey::new(&[ComponentKind::Visual, ComponentKind::Transform]);
        let (_, log) = recorder(&mut n, Topic::Query(key));
        let e = EntityId::new();

        n.emit(ChangeEvent::new(e, ComponentKind::Transform, ChangeKind::Updated));
        n.emit(ChangeEvent::new(e, ComponentKind::Meta, ChangeKind::Added));
        assert!(log.borrow().is_empty());

        n.emit(ChangeEvent::new(e, ComponentKind::Visual, ChangeKind::Removed));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn batch_defers_until_outermost_end() {
        let mut n = ChangeNotifier::new();
        let (_, log) = recorder(&mut n, Topic::All);
        let e = EntityId::new();

        n.begin_batch();
        n.emit(ChangeEvent::new(e, ComponentKind::Transform, ChangeKind::Added));
        n.begin_batch();
        n.emit(ChangeEvent::new(e, ComponentKind::Visual, ChangeKind::Added));
        n.end_batch();
        assert!(log.borrow().is_empty());
        assert!(n.in_batch());
        n.end_batch();

        let kinds: Vec<_> = log.borrow().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ComponentKind::Transform, ComponentKind::Visual]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut n = ChangeNotifier::new();
        let (id, log) = recorder(&mut n, Topic::Kind(ComponentKind::Meta));
        let e = EntityId::new();

        n.emit(ChangeEvent::new(e, ComponentKind::Meta, ChangeKind::Added));
        assert!(n.unsubscribe(id));
        assert!(!n.unsubscribe(id));
        n.emit(ChangeEvent::new(e, ComponentKind::Meta, ChangeKind::Removed));

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(n.subscriber_count(), 0);
    }

    #[test]
    fn unbalanced_end_batch_is_harmless() {
        let mut n = ChangeNotifier::new();
        let (_, log) = recorder(&mut n, Topic::All);
        n.end_batch();
        n.emit(ChangeEvent::new(
            EntityId::new(),
            ComponentKind::Hover,
            ChangeKind::Added,
        ));
        assert_eq!(log.borrow().len(), 1);
    }
}
