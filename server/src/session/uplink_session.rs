use std::{
    net::SocketAddr,
    sync::{Arc, Weak},
};

use arc_swap::ArcSwap;
use log::{debug, trace, warn};

use uplink_shared::{
    AtomicStatus, CommandMessage, Envelope, EventMessage, Facet, LaneAddress, LinkRequest,
    LinkedResponse, SessionId, SessionStatus, SyncRequest, SyncedResponse, UnlinkRequest,
    UnlinkedResponse, Value,
};

use crate::{
    observer::{Capability, ObserverRegistry},
    ConnectionInfo, ObserverError, OutboundQueue, UplinkConfig, UplinkError, UplinkLane,
    UplinkObserver, UplinkTransport, WorkerStage,
};

// LinkParams
struct LinkParams {
    prio: f32,
    rate: f32,
    body: Value,
}

/// The server side of one subscriber's link to a lane.
///
/// A session sits between a multiplexing transport, which calls
/// [`push_up`](UplinkSession::push_up) with inbound envelopes and
/// [`pull_down`](UplinkSession::pull_down) whenever it may deliver an
/// outbound one, and the lane, which produces events through the session's
/// [`OutboundQueue`]. Every piece of shared state lives in a single
/// [`AtomicStatus`] word; no lock is held across a collaborator call.
///
/// Downstream delivery follows a credit of one: `UplinkTransport::feed_down`
/// is called only on the rising edge of `FeedingDown`, and each resulting
/// `pull_down` either hands the credit back to the transport, if more work
/// remains, or clears `FeedingDown`.
pub struct UplinkSession<Q: OutboundQueue> {
    address: LaneAddress,
    identity: SessionId,
    config: UplinkConfig,
    status: AtomicStatus,
    queue: Q,
    observers: ArcSwap<ObserverRegistry>,
    link: ArcSwap<LinkParams>,
    transport: Weak<dyn UplinkTransport>,
    lane: Weak<dyn UplinkLane>,
    stage: Arc<dyn WorkerStage>,
}

impl<Q: OutboundQueue + 'static> UplinkSession<Q> {
    /// Creates a session for a subscriber the transport and lane have just admitted
    pub fn open<T, L>(
        address: LaneAddress,
        config: UplinkConfig,
        queue: Q,
        transport: &Arc<T>,
        lane: &Arc<L>,
        stage: Arc<dyn WorkerStage>,
    ) -> Arc<Self>
    where
        T: UplinkTransport + 'static,
        L: UplinkLane + 'static,
    {
        let identity = config.identity.unwrap_or_else(SessionId::generate);
        let transport: Weak<dyn UplinkTransport> = Arc::<T>::downgrade(transport);
        let lane: Weak<dyn UplinkLane> = Arc::<L>::downgrade(lane);
        let link = LinkParams {
            prio: config.default_prio,
            rate: config.default_rate,
            body: Value::Absent,
        };

        debug!("opening uplink {} to {}", identity, address);

        Arc::new(Self {
            address,
            identity,
            config,
            status: AtomicStatus::default(),
            queue,
            observers: ArcSwap::from_pointee(ObserverRegistry::new()),
            link: ArcSwap::from_pointee(link),
            transport,
            lane,
            stage,
        })
    }

    // Accessors

    pub fn address(&self) -> &LaneAddress {
        &self.address
    }

    pub fn node_uri(&self) -> &str {
        &self.address.node
    }

    pub fn lane_uri(&self) -> &str {
        &self.address.lane
    }

    /// Priority adopted from the most recent link or sync request
    pub fn prio(&self) -> f32 {
        self.link.load().prio
    }

    /// Rate adopted from the most recent link or sync request
    pub fn rate(&self) -> f32 {
        self.link.load().rate
    }

    pub fn link_body(&self) -> Value {
        self.link.load().body.clone()
    }

    pub fn identity(&self) -> SessionId {
        self.identity
    }

    pub fn status(&self) -> SessionStatus {
        self.status.load()
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn observers(&self) -> Arc<ObserverRegistry> {
        self.observers.load_full()
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        self.transport
            .upgrade()
            .map(|transport| transport.connection_info())
            .unwrap_or_default()
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.connection_info().remote_addr
    }

    pub fn is_secure(&self) -> bool {
        self.connection_info().secure
    }

    // Observers

    pub fn observe(&self, observer: Arc<dyn UplinkObserver>) {
        self.observers
            .rcu(|registry| registry.observe(observer.clone()));
    }

    pub fn unobserve(&self, observer: &Arc<dyn UplinkObserver>) {
        self.observers.rcu(|registry| registry.unobserve(observer));
    }

    // Upstream

    /// Inbound entry point, called by the transport with the next envelope
    /// from the peer. Never blocks on a non-preemptive observer.
    pub fn push_up(self: &Arc<Self>, envelope: Envelope) {
        let (old, _) = self.status.update(|status| {
            if status.is_draining() || status.is_pulling_up() {
                None
            } else {
                Some(status.with(Facet::PullingUp))
            }
        });
        if old.is_draining() {
            debug!(
                "uplink {} dropped {:?} while unlinking",
                self.identity,
                envelope.kind()
            );
            return;
        }

        match envelope {
            Envelope::Command(command) => self.did_receive_command(command),
            Envelope::LinkRequest(request) => self.did_request_link(request),
            Envelope::SyncRequest(request) => self.did_request_sync(request),
            Envelope::UnlinkRequest(request) => self.did_request_unlink(request),
            other => {
                trace!(
                    "uplink {} treats {:?} as a credit return",
                    self.identity,
                    other.kind()
                );
                self.cue_up();
            }
        }
    }

    /// The transport has inbound work for this session. Coalesced while a
    /// pull is already in flight.
    pub fn feed_up(&self) {
        let (old, new) = self.status.update(|status| {
            if status.is_draining() {
                None
            } else if status.is_pulling_up() {
                Some(status.with(Facet::FeedingUp))
            } else {
                Some(status.with(Facet::PullingUp))
            }
        });
        if !old.is_pulling_up() && new.is_pulling_up() {
            if let Some(transport) = self.transport() {
                transport.pull_up();
            }
        }
    }

    /// Returns upstream credit once the previous envelope has been handled
    pub fn cue_up(&self) {
        let (old, _) = self.status.update(|status| {
            if status.is_draining() {
                None
            } else {
                Some(status.without(Facet::FeedingUp).with(Facet::PullingUp))
            }
        });
        if old.is_draining() {
            return;
        }
        if let Some(transport) = self.transport() {
            transport.pull_up();
        }
    }

    fn did_receive_command(self: &Arc<Self>, command: CommandMessage) {
        if let Some(lane) = self.lane() {
            lane.push_up_command(&command);
        }
        let session = self.clone();
        self.observers
            .load()
            .dispatch(
                Capability::OnCommand,
                move |observer| observer.on_command(&command),
                self.failure_report(),
            )
            .then(self.stage.as_ref(), move || session.cue_up());
    }

    fn did_request_link(self: &Arc<Self>, request: LinkRequest) {
        if self.status().link().is_none() {
            self.cue_up();
            return;
        }
        self.adopt_link(request.prio, request.rate, &request.body);
        if !self.claim_feed(SessionStatus::link) {
            self.cue_up();
            return;
        }
        debug!("uplink {} linking to {}", self.identity, self.address);

        let session = self.clone();
        self.observers
            .load()
            .dispatch(
                Capability::OnLink,
                move |observer| observer.on_link(&request),
                self.failure_report(),
            )
            .then(self.stage.as_ref(), move || session.cue_up());
    }

    fn did_request_sync(self: &Arc<Self>, request: SyncRequest) {
        if self.status().sync().is_none() {
            self.cue_up();
            return;
        }
        self.adopt_link(request.prio, request.rate, &request.body);
        let (old, new) = self.status.update(SessionStatus::sync);
        if old == new {
            self.cue_up();
            return;
        }
        // the snapshot belongs to the winning sync only
        self.queue.will_sync();
        self.feed_on_edge(old, new);
        debug!("uplink {} syncing with {}", self.identity, self.address);

        let session = self.clone();
        self.observers
            .load()
            .dispatch(
                Capability::OnSync,
                move |observer| observer.on_sync(&request),
                self.failure_report(),
            )
            .then(self.stage.as_ref(), move || session.cue_up());
    }

    fn did_request_unlink(&self, request: UnlinkRequest) {
        if !self.claim_feed(SessionStatus::unlink) {
            return;
        }
        debug!("uplink {} unlinking from {}", self.identity, self.address);

        self.observers
            .load()
            .dispatch(
                Capability::OnUnlink,
                move |observer| observer.on_unlink(&request),
                self.failure_report(),
            )
            .detach(self.stage.as_ref());
    }

    fn adopt_link(&self, prio: f32, rate: f32, body: &Value) {
        self.link.store(Arc::new(LinkParams {
            prio: self.config.adopt_prio(prio),
            rate: self.config.adopt_rate(rate),
            body: body.clone(),
        }));
    }

    // Downstream

    /// Outbound entry point. The transport calls this once per `feed_down`;
    /// the delivery itself always runs on the worker stage.
    pub fn pull_down(self: &Arc<Self>) {
        let session = self.clone();
        self.stage
            .execute(Box::new(move || session.run_pull_down()));
    }

    /// Marks cued data pending and requests a delivery opportunity
    pub fn cue_down(&self) {
        self.claim_feed(SessionStatus::cue_down);
    }

    /// Requests a delivery opportunity for work already in the queue
    pub fn feed_down(&self) {
        self.claim_feed(SessionStatus::feed_down);
    }

    /// Tears the link down. The only cancellation primitive: no further
    /// delivery follows the pending `Unlinked` acknowledgement.
    pub fn unlink(&self) {
        if self.claim_feed(SessionStatus::unlink) {
            debug!("uplink {} unlinking from {}", self.identity, self.address);
        }
    }

    fn run_pull_down(&self) {
        let Some(transport) = self.transport() else {
            return;
        };
        if self.status().is_closed() {
            transport.skip_down();
            return;
        }

        let (old, _) = self
            .status
            .update(|status| status.is_unlinking().then_some(SessionStatus::CLOSED));
        if old.is_unlinking() {
            let response = UnlinkedResponse {
                address: self.address.clone(),
                body: Value::Absent,
            };
            self.dispatch_inline(Capability::OnUnlinked, |observer| {
                observer.on_unlinked(&response)
            });
            debug!("uplink {} unlinked from {}", self.identity, self.address);
            transport.push_down(Envelope::Unlinked(response));
            self.did_close();
            return;
        }

        if self.take(Facet::Linking) {
            let link = self.link.load();
            let response = LinkedResponse {
                address: self.address.clone(),
                prio: link.prio,
                rate: link.rate,
                body: if self.config.echo_link_body {
                    link.body.clone()
                } else {
                    Value::Absent
                },
            };
            self.dispatch_inline(Capability::OnLinked, |observer| {
                observer.on_linked(&response)
            });
            debug!("uplink {} linked to {}", self.identity, self.address);
            transport.push_down(Envelope::Linked(response));
            self.finish_pull(transport.as_ref());
            return;
        }

        if let Some(body) = self.next_event() {
            let event = EventMessage::new(self.address.clone(), body);
            self.dispatch_inline(Capability::OnEvent, |observer| observer.on_event(&event));
            transport.push_down(Envelope::Event(event));
            self.finish_pull(transport.as_ref());
            return;
        }

        if self.take(Facet::Syncing) {
            let response = SyncedResponse {
                address: self.address.clone(),
                body: Value::Absent,
            };
            self.dispatch_inline(Capability::OnSynced, |observer| {
                observer.on_synced(&response)
            });
            debug!("uplink {} synced with {}", self.identity, self.address);
            transport.push_down(Envelope::Synced(response));
            self.finish_pull(transport.as_ref());
            return;
        }

        transport.skip_down();
        self.finish_pull(transport.as_ref());
    }

    fn next_event(&self) -> Option<Value> {
        self.queue.dequeue().or_else(|| {
            if self.take(Facet::CuedDown) {
                self.queue.next_cued()
            } else {
                None
            }
        })
    }

    /// Hands the downstream credit back to the transport if work remains,
    /// or clears `FeedingDown` otherwise.
    fn finish_pull(&self, transport: &dyn UplinkTransport) {
        if self.queue.has_cued() {
            self.status.update(|status| {
                if status.is_closed() || status.is_cued_down() {
                    None
                } else {
                    Some(status.with(Facet::CuedDown))
                }
            });
        }

        let queued = self.queue.has_queued();
        let (_, new) = self.status.update(|status| {
            let more = status.has_pending_down() || queued;
            if status.is_closed() || status.is_feeding_down() == more {
                None
            } else if more {
                Some(status.with(Facet::FeedingDown))
            } else {
                Some(status.without(Facet::FeedingDown))
            }
        });
        if new.is_feeding_down() {
            transport.feed_down();
            return;
        }

        // a producer may have enqueued while FeedingDown was still set
        if self.queue.has_cued() {
            self.cue_down();
        } else if self.queue.has_queued() {
            self.feed_down();
        }
    }

    // Lifecycle

    /// Closes the session; only the first call has any effect
    pub fn close(&self) {
        let (old, _) = self
            .status
            .update(|status| (!status.is_closed()).then_some(SessionStatus::CLOSED));
        if !old.is_closed() {
            self.did_close();
        }
    }

    /// The transport reports that the underlying connection has closed
    pub fn did_close_down(&self) {
        debug!("uplink {} lost its connection", self.identity);
        self.close();
    }

    pub fn did_fail(&self, error: UplinkError) {
        match self.lane.upgrade() {
            Some(lane) => lane.did_fail(error),
            None => warn!("uplink {} failed without a lane: {}", self.identity, error),
        }
    }

    fn did_close(&self) {
        debug!("uplink {} closed", self.identity);
        self.observers
            .load()
            .dispatch(
                Capability::OnClose,
                |observer| observer.on_close(),
                self.failure_report(),
            )
            .detach(self.stage.as_ref());
        if let Some(lane) = self.lane() {
            lane.close_uplink(self.identity);
        }
    }

    // Logging

    pub fn trace(&self, message: &str) {
        if let Some(lane) = self.lane.upgrade() {
            lane.trace(message);
        }
    }

    pub fn debug(&self, message: &str) {
        if let Some(lane) = self.lane.upgrade() {
            lane.debug(message);
        }
    }

    pub fn info(&self, message: &str) {
        if let Some(lane) = self.lane.upgrade() {
            lane.info(message);
        }
    }

    pub fn warn(&self, message: &str) {
        if let Some(lane) = self.lane.upgrade() {
            lane.warn(message);
        }
    }

    pub fn error(&self, message: &str) {
        if let Some(lane) = self.lane.upgrade() {
            lane.error(message);
        }
    }

    // Helpers

    pub(crate) fn ensure_open(&self, operation: &'static str) -> Result<(), UplinkError> {
        if self.status().is_draining() {
            return Err(UplinkError::Closed { operation });
        }
        Ok(())
    }

    /// Applies `transition` and calls `feed_down` on the rising edge of
    /// `FeedingDown`. Returns whether the status changed.
    fn claim_feed<F>(&self, transition: F) -> bool
    where
        F: FnMut(SessionStatus) -> Option<SessionStatus>,
    {
        let (old, new) = self.status.update(transition);
        self.feed_on_edge(old, new);
        old != new
    }

    fn feed_on_edge(&self, old: SessionStatus, new: SessionStatus) {
        if !old.is_feeding_down() && new.is_feeding_down() {
            if let Some(transport) = self.transport() {
                transport.feed_down();
            }
        }
    }

    /// Clears `facet`; true for the one caller that observed it set
    fn take(&self, facet: Facet) -> bool {
        let (old, new) = self.status.update(|status| status.take(facet));
        old != new
    }

    fn dispatch_inline<F>(&self, capability: Capability, call: F)
    where
        F: Fn(&dyn UplinkObserver) -> Result<(), ObserverError>,
    {
        self.observers
            .load()
            .dispatch_inline(capability, call, |error| self.did_fail(error));
    }

    fn failure_report(&self) -> impl Fn(UplinkError) + Send + 'static {
        let lane = self.lane.clone();
        let identity = self.identity;
        move |error| match lane.upgrade() {
            Some(lane) => lane.did_fail(error),
            None => warn!("uplink {} failed without a lane: {}", identity, error),
        }
    }

    fn transport(&self) -> Option<Arc<dyn UplinkTransport>> {
        let transport = self.transport.upgrade();
        if transport.is_none() {
            self.did_fail(UplinkError::TransportGone);
        }
        transport
    }

    fn lane(&self) -> Option<Arc<dyn UplinkLane>> {
        let lane = self.lane.upgrade();
        if lane.is_none() {
            warn!("uplink {} outlived its lane", self.identity);
        }
        lane
    }
}
