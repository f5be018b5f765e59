//! Explicit observer contract between view models and layer renderers.
//! Publishing fans a change out to every live subscriber queue; each
//! renderer drains its own queue on the update thread and re-pulls the
//! item collections it cares about.

use std::collections::VecDeque;

use tracing::error;

use crate::world::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewProperty {
    GridPosition,
    VisualKey,
    TooltipText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChange {
    EntityAdded(EntityId),
    EntityRemoved(EntityId),
    EntityProperty {
        id: EntityId,
        property: ViewProperty,
    },
    TileFieldReplaced,
    TileFieldProperty {
        property: ViewProperty,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(usize);

#[derive(Debug, Default)]
pub struct ChangeBus {
    queues: Vec<Option<VecDeque<ViewChange>>>,
}

impl ChangeBus {
    pub fn subscribe(&mut self) -> SubscriberId {
        self.queues.push(Some(VecDeque::new()));
        SubscriberId(self.queues.len() - 1)
    }

    /// An unsubscribed slot is never reused; its queue is dropped and it
    /// receives nothing further.
    pub fn unsubscribe(&mut self, subscriber: SubscriberId) {
        match self.queues.get_mut(subscriber.0) {
            Some(slot) => *slot = None,
            None => error!(subscriber = subscriber.0, "unsubscribe_unknown_subscriber"),
        }
    }

    pub fn publish(&mut self, change: ViewChange) {
        for queue in self.queues.iter_mut().flatten() {
            queue.push_back(change);
        }
    }

    pub fn drain(&mut self, subscriber: SubscriberId) -> Vec<ViewChange> {
        match self.queues.get_mut(subscriber.0) {
            Some(Some(queue)) => queue.drain(..).collect(),
            Some(None) => Vec::new(),
            None => {
                error!(subscriber = subscriber.0, "drain_unknown_subscriber");
                Vec::new()
            }
        }
    }

    pub fn pending_count(&self, subscriber: SubscriberId) -> usize {
        self.queues
            .get(subscriber.0)
            .and_then(Option::as_ref)
            .map_or(0, VecDeque::len)
    }

    pub fn live_subscriber_count(&self) -> usize {
        self.queues.iter().flatten().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_reaches_every_live_subscriber() {
        let mut bus = ChangeBus::default();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.publish(ViewChange::EntityAdded(EntityId(1)));

        assert_eq!(bus.drain(first), vec![ViewChange::EntityAdded(EntityId(1))]);
        assert_eq!(
            bus.drain(second),
            vec![ViewChange::EntityAdded(EntityId(1))]
        );
    }

    #[test]
    fn drain_empties_only_the_callers_queue() {
        let mut bus = ChangeBus::default();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.publish(ViewChange::TileFieldReplaced);
        assert_eq!(bus.drain(first).len(), 1);
        assert_eq!(bus.pending_count(first), 0);
        assert_eq!(bus.pending_count(second), 1);
    }

    #[test]
    fn unsubscribed_queue_receives_nothing_further() {
        let mut bus = ChangeBus::default();
        let subscriber = bus.subscribe();
        bus.publish(ViewChange::EntityRemoved(EntityId(3)));
        bus.unsubscribe(subscriber);

        bus.publish(ViewChange::EntityAdded(EntityId(4)));

        assert_eq!(bus.drain(subscriber), Vec::new());
        assert_eq!(bus.live_subscriber_count(), 0);
    }

    #[test]
    fn changes_drain_in_publish_order() {
        let mut bus = ChangeBus::default();
        let subscriber = bus.subscribe();

        bus.publish(ViewChange::EntityAdded(EntityId(1)));
        bus.publish(ViewChange::EntityProperty {
            id: EntityId(1),
            property: ViewProperty::VisualKey,
        });
        bus.publish(ViewChange::EntityRemoved(EntityId(1)));

        let drained = bus.drain(subscriber);
        assert_eq!(
            drained,
            vec![
                ViewChange::EntityAdded(EntityId(1)),
                ViewChange::EntityProperty {
                    id: EntityId(1),
                    property: ViewProperty::VisualKey,
                },
                ViewChange::EntityRemoved(EntityId(1)),
            ]
        );
    }
}
