use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use uplink_server::{
    CommandMessage, Envelope, LaneAddress, LinkRequest, OutboundQueue, SyncRequest,
    UnlinkRequest, UplinkConfig, UplinkSession, Value,
};

use super::{ManualStage, TestLane, TestTransport};

/// One session wired to recording doubles, with the transport's side of
/// the credit exchange played by [`pump`](UplinkHarness::pump).
pub struct UplinkHarness<Q: OutboundQueue + 'static> {
    pub transport: Arc<TestTransport>,
    pub lane: Arc<TestLane>,
    pub stage: Arc<ManualStage>,
    pub session: Arc<UplinkSession<Q>>,
    served: AtomicUsize,
}

impl<Q: OutboundQueue + 'static> UplinkHarness<Q> {
    pub fn new(queue: Q) -> Self {
        Self::with_config(queue, UplinkConfig::default())
    }

    pub fn with_config(queue: Q, config: UplinkConfig) -> Self {
        Self::with_transport(queue, config, TestTransport::new())
    }

    pub fn with_transport(queue: Q, config: UplinkConfig, transport: Arc<TestTransport>) -> Self {
        let lane = TestLane::new();
        let stage = ManualStage::new();
        let session =
            UplinkSession::open(Self::address(), config, queue, &transport, &lane, stage.clone());
        Self {
            transport,
            lane,
            stage,
            session,
            served: AtomicUsize::new(0),
        }
    }

    pub fn address() -> LaneAddress {
        LaneAddress::new("/house/kitchen", "light")
    }

    // Peer

    pub fn link(&self) {
        self.session.push_up(Envelope::LinkRequest(LinkRequest::new(
            Self::address(),
            1.0,
            2.0,
            Value::Absent,
        )));
    }

    pub fn sync(&self) {
        self.session.push_up(Envelope::SyncRequest(SyncRequest::new(
            Self::address(),
            1.0,
            2.0,
            Value::Absent,
        )));
    }

    pub fn request_unlink(&self) {
        self.session.push_up(Envelope::UnlinkRequest(UnlinkRequest::new(
            Self::address(),
            Value::Absent,
        )));
    }

    pub fn command(&self, body: impl Into<Value>) {
        self.session.push_up(Envelope::Command(CommandMessage::new(
            Self::address(),
            body.into(),
        )));
    }

    // Transport

    /// Feeds the transport has issued but not yet answered with a pull
    pub fn outstanding(&self) -> usize {
        self.transport.feed_count() - self.served.load(Ordering::SeqCst)
    }

    /// Answers one outstanding feed with a `pull_down`, running the stage
    /// until it is idle. False if no feed was outstanding.
    pub fn pull_once(&self) -> bool {
        if self.outstanding() == 0 {
            return false;
        }
        self.served.fetch_add(1, Ordering::SeqCst);
        self.session.pull_down();
        self.stage.run_all();
        true
    }

    /// Answers feeds until the session stops asking, returning what it pushed
    pub fn pump(&self) -> Vec<Envelope> {
        while self.pull_once() {}
        self.transport.take_pushed()
    }
}
