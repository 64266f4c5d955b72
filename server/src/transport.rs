use std::net::SocketAddr;

use uplink_shared::Envelope;

/// Read-only metadata about the connection a session is multiplexed over
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub remote_addr: Option<SocketAddr>,
    pub secure: bool,
}

impl ConnectionInfo {
    pub fn new(remote_addr: SocketAddr, secure: bool) -> Self {
        Self {
            remote_addr: Some(remote_addr),
            secure,
        }
    }
}

/// The multiplexing transport a session delivers envelopes through.
///
/// Every downstream exchange is a credit of one: after `feed_down` the
/// transport owes the session exactly one `pull_down`, in reply to which
/// the session calls either `push_down` or `skip_down`.
pub trait UplinkTransport: Send + Sync {
    /// Delivers one outbound envelope to the subscriber
    fn push_down(&self, envelope: Envelope);

    /// Asks the transport to schedule a `pull_down` on the session
    fn feed_down(&self);

    /// Asks the transport to deliver the next inbound envelope via `push_up`
    fn pull_up(&self);

    /// Declines the current delivery opportunity
    fn skip_down(&self);

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo::default()
    }
}
