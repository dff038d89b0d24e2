//! Typed figure events and their FIFO dispatch queue.
//!
//! Handlers never run re-entrantly: events raised while another event is
//! being handled are queued and dispatched afterwards, in emission order.

use std::collections::VecDeque;

use crate::geom::Margin;
use crate::mark::MarkId;
use crate::scale::DomainChanged;
use crate::selector::SelectorId;

/// Notifications raised by a figure.
#[derive(Debug, Clone, PartialEq)]
pub enum FigureEvent {
    /// A scale's resolved domain changed.
    DomainChanged(DomainChanged),
    /// The figure margin changed after axis space was recomputed.
    MarginUpdated(Margin),
    /// A selector wrote a new selection onto a mark.
    SelectionChanged {
        /// Selector that produced the selection.
        selector: SelectorId,
        /// Target mark.
        mark: MarkId,
        /// Selected indices; `None` clears the selection.
        selected: Option<Vec<usize>>,
    },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FigureEvent) + Send>;

/// Pending events plus external listeners.
#[derive(Default)]
pub struct EventBus {
    queue: VecDeque<FigureEvent>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called for every dispatched event.
    pub fn subscribe(&mut self, listener: impl FnMut(&FigureEvent) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Queue an event.
    pub fn emit(&mut self, event: FigureEvent) {
        tracing::trace!(?event, "event queued");
        self.queue.push_back(event);
    }

    /// Take the oldest pending event.
    pub fn pop(&mut self) -> Option<FigureEvent> {
        self.queue.pop_front()
    }

    /// Number of pending events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Call every listener with `event`, in subscription order.
    pub fn notify(&mut self, event: &FigureEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.queue.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn events_pop_in_emission_order() {
        let mut bus = EventBus::new();
        bus.emit(FigureEvent::MarginUpdated(Margin::uniform(1.0)));
        bus.emit(FigureEvent::MarginUpdated(Margin::uniform(2.0)));
        assert_eq!(bus.pending(), 2);
        assert_eq!(bus.pop(), Some(FigureEvent::MarginUpdated(Margin::uniform(1.0))));
        assert_eq!(bus.pop(), Some(FigureEvent::MarginUpdated(Margin::uniform(2.0))));
        assert!(bus.pop().is_none());
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let seen = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let counter = Arc::clone(&seen);
        let id = bus.subscribe(move |_| *counter.lock().unwrap() += 1);
        let event = FigureEvent::MarginUpdated(Margin::default());
        bus.notify(&event);
        assert!(bus.unsubscribe(id));
        bus.notify(&event);
        assert_eq!(*seen.lock().unwrap(), 1);
        assert!(!bus.unsubscribe(id));
    }
}
