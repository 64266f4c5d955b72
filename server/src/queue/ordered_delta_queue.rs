use crossbeam_queue::SegQueue;

use uplink_shared::{ListDelta, Value};

use super::OutboundQueue;

type ListSnapshot = Box<dyn Fn() -> Vec<Value> + Send + Sync>;

/// FIFO of ordered-list mutations, for list lanes
pub struct OrderedDeltaQueue {
    deltas: SegQueue<ListDelta>,
    snapshot: Option<ListSnapshot>,
}

impl OrderedDeltaQueue {
    pub fn new() -> Self {
        Self {
            deltas: SegQueue::new(),
            snapshot: None,
        }
    }

    /// A queue that answers a sync request with one `update` per list item
    pub fn synced<F>(snapshot: F) -> Self
    where
        F: Fn() -> Vec<Value> + Send + Sync + 'static,
    {
        Self {
            deltas: SegQueue::new(),
            snapshot: Some(Box::new(snapshot)),
        }
    }

    pub fn enqueue(&self, delta: ListDelta) {
        self.deltas.push(delta);
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

impl Default for OrderedDeltaQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboundQueue for OrderedDeltaQueue {
    fn dequeue(&self) -> Option<Value> {
        self.deltas.pop().map(ListDelta::into_value)
    }

    fn has_queued(&self) -> bool {
        !self.deltas.is_empty()
    }

    fn will_sync(&self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        for (index, value) in snapshot().into_iter().enumerate() {
            self.deltas.push(ListDelta::Update { index, value });
        }
    }
}
