use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use uplink_server::{ConnectionInfo, Envelope, EnvelopeKind, UplinkTransport};

/// Transport double that records every call a session makes on it
#[derive(Default)]
pub struct TestTransport {
    pushed: Mutex<Vec<Envelope>>,
    feeds: AtomicUsize,
    pulls_up: AtomicUsize,
    skips: AtomicUsize,
    connection: ConnectionInfo,
}

impl TestTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_connection(connection: ConnectionInfo) -> Arc<Self> {
        Arc::new(Self {
            connection,
            ..Self::default()
        })
    }

    /// Every envelope pushed so far, oldest first
    pub fn pushed(&self) -> Vec<Envelope> {
        self.pushed.lock().unwrap().clone()
    }

    /// Drains the envelopes pushed since the last call
    pub fn take_pushed(&self) -> Vec<Envelope> {
        std::mem::take(&mut *self.pushed.lock().unwrap())
    }

    pub fn pushed_kinds(&self) -> Vec<EnvelopeKind> {
        self.pushed
            .lock()
            .unwrap()
            .iter()
            .map(Envelope::kind)
            .collect()
    }

    pub fn feed_count(&self) -> usize {
        self.feeds.load(Ordering::SeqCst)
    }

    pub fn pull_up_count(&self) -> usize {
        self.pulls_up.load(Ordering::SeqCst)
    }

    pub fn skip_count(&self) -> usize {
        self.skips.load(Ordering::SeqCst)
    }
}

impl UplinkTransport for TestTransport {
    fn push_down(&self, envelope: Envelope) {
        self.pushed.lock().unwrap().push(envelope);
    }

    fn feed_down(&self) {
        self.feeds.fetch_add(1, Ordering::SeqCst);
    }

    fn pull_up(&self) {
        self.pulls_up.fetch_add(1, Ordering::SeqCst);
    }

    fn skip_down(&self) {
        self.skips.fetch_add(1, Ordering::SeqCst);
    }

    fn connection_info(&self) -> ConnectionInfo {
        self.connection.clone()
    }
}
