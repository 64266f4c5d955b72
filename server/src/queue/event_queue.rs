use crossbeam_queue::SegQueue;

use uplink_shared::Value;

use super::OutboundQueue;

type CueSource = Box<dyn Fn() -> Option<Value> + Send + Sync>;

/// FIFO of opaque event bodies, for scalar & event lanes.
///
/// A queue built with [`EventQueue::cued`] also resolves a bare `cue_down`
/// by reading the lane's current value when the cue is pulled, so a burst of
/// value changes collapses into one event carrying the latest value.
pub struct EventQueue {
    events: SegQueue<Value>,
    cue: Option<CueSource>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: SegQueue::new(),
            cue: None,
        }
    }

    pub fn cued<F>(source: F) -> Self
    where
        F: Fn() -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            events: SegQueue::new(),
            cue: Some(Box::new(source)),
        }
    }

    pub fn enqueue(&self, body: Value) {
        self.events.push(body);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboundQueue for EventQueue {
    fn dequeue(&self) -> Option<Value> {
        self.events.pop()
    }

    fn next_cued(&self) -> Option<Value> {
        self.cue.as_ref().and_then(|source| source())
    }

    fn has_queued(&self) -> bool {
        !self.events.is_empty()
    }
}
