use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::types::CellCount;

/// The four named events a board publishes to its collaborators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    CellsToGo,
    MinesToFlag,
    Lost,
    Won,
}

impl EventKind {
    pub(crate) const COUNT: usize = 4;

    const fn index(self) -> usize {
        match self {
            Self::CellsToGo => 0,
            Self::MinesToFlag => 1,
            Self::Lost => 2,
            Self::Won => 3,
        }
    }
}

/// Payload delivered to subscribers. Counter events carry the old and new
/// values, terminal events carry the flag that flipped to `true`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoardEvent {
    CellsToGo { old: CellCount, new: CellCount },
    MinesToFlag { old: isize, new: isize },
    Lost(bool),
    Won(bool),
}

impl BoardEvent {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::CellsToGo { .. } => EventKind::CellsToGo,
            Self::MinesToFlag { .. } => EventKind::MinesToFlag,
            Self::Lost(_) => EventKind::Lost,
            Self::Won(_) => EventKind::Won,
        }
    }
}

/// Handle returned by `subscribe`, used to remove that one registration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberId(u64);

type Callback = Box<dyn FnMut(&BoardEvent)>;

/// Per-event-kind subscriber lists. Delivery is synchronous on the thread
/// performing the mutation, in registration order within one kind.
#[derive(Default)]
pub(crate) struct EventBus {
    next_id: u64,
    channels: [Vec<(SubscriberId, Callback)>; EventKind::COUNT],
}

impl EventBus {
    pub(crate) fn subscribe<F>(&mut self, kind: EventKind, callback: F) -> SubscriberId
    where
        F: FnMut(&BoardEvent) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.channels[kind.index()].push((id, Box::new(callback)));
        id
    }

    /// Removes exactly one registration matching `id`, reporting whether
    /// anything was removed.
    pub(crate) fn unsubscribe(&mut self, kind: EventKind, id: SubscriberId) -> bool {
        let channel = &mut self.channels[kind.index()];
        if let Some(pos) = channel.iter().position(|(sub_id, _)| *sub_id == id) {
            channel.remove(pos);
            true
        } else {
            false
        }
    }

    pub(crate) fn emit(&mut self, event: &BoardEvent) {
        for (_, callback) in &mut self.channels[event.kind().index()] {
            callback(event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("cells_to_go", &self.channels[0].len())
            .field("mines_to_flag", &self.channels[1].len())
            .field("lost", &self.channels[2].len())
            .field("won", &self.channels[3].len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<BoardEvent>>>) -> impl FnMut(&BoardEvent) + 'static {
        let log = Rc::clone(log);
        move |event| log.borrow_mut().push(*event)
    }

    #[test]
    fn same_kind_delivery_follows_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::default();

        for tag in [1, 2, 3] {
            let order = Rc::clone(&order);
            bus.subscribe(EventKind::Won, move |_| order.borrow_mut().push(tag));
        }

        bus.emit(&BoardEvent::Won(true));
        assert_eq!(*order.borrow(), [1, 2, 3]);
    }

    #[test]
    fn events_only_reach_subscribers_of_their_kind() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::default();
        bus.subscribe(EventKind::Lost, recorder(&log));

        bus.emit(&BoardEvent::Won(true));
        bus.emit(&BoardEvent::CellsToGo { old: 2, new: 1 });
        assert!(log.borrow().is_empty());

        bus.emit(&BoardEvent::Lost(true));
        assert_eq!(*log.borrow(), [BoardEvent::Lost(true)]);
    }

    #[test]
    fn unsubscribe_removes_exactly_one_registration() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::default();

        let first = bus.subscribe(EventKind::MinesToFlag, recorder(&log));
        let _second = bus.subscribe(EventKind::MinesToFlag, recorder(&log));

        assert!(bus.unsubscribe(EventKind::MinesToFlag, first));
        assert!(!bus.unsubscribe(EventKind::MinesToFlag, first));

        bus.emit(&BoardEvent::MinesToFlag { old: 5, new: 4 });
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn unsubscribe_under_wrong_kind_is_rejected() {
        let mut bus = EventBus::default();
        let id = bus.subscribe(EventKind::Won, |_| {});
        assert!(!bus.unsubscribe(EventKind::Lost, id));
        assert!(bus.unsubscribe(EventKind::Won, id));
    }
}
