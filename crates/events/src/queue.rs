//! Bounded in-memory queue for events that arrive before the catalog.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::event::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedEvent<E> {
    pub event: E,
    pub queued_at: DateTime<Utc>,
}

/// FIFO of deferred events.
///
/// - No IO / no async
/// - Bounded: at capacity the oldest event is dropped
/// - Replaying is safe because handlers re-read live control state
#[derive(Debug)]
pub struct PendingEvents<E> {
    events: VecDeque<QueuedEvent<E>>,
    capacity: usize,
}

impl<E: Event> PendingEvents<E> {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Queue `event`; returns the event dropped to make room, if any.
    pub fn push(&mut self, event: E) -> Option<E> {
        let dropped = if self.events.len() >= self.capacity {
            self.events.pop_front().map(|q| q.event)
        } else {
            None
        };
        if let Some(old) = &dropped {
            tracing::warn!(event_type = old.event_type(), capacity = self.capacity, "pending event queue full; dropping oldest");
        }

        self.events.push_back(QueuedEvent {
            event,
            queued_at: Utc::now(),
        });
        dropped
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<QueuedEvent<E>> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
