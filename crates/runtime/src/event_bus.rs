/// An emitted event tagged with its position in the emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<E> {
    pub seq: u64,
    pub payload: E,
}

/// Ordered queue of events raised by state mutators and drained by
/// whatever keeps widgets or scene objects in sync.
///
/// Sequence numbers keep increasing across drains so a consumer can tell
/// whether it already saw an event.
#[derive(Debug)]
pub struct EventBus<E> {
    next_seq: u64,
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, payload: E) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event { seq, payload });
        seq
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }

    /// Drains and returns payloads only, in emission order.
    pub fn drain_payloads(&mut self) -> Vec<E> {
        self.drain().into_iter().map(|e| e.payload).collect()
    }
}
