use std::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use thiserror::Error;

/// Errors raised when a status word violates the session lattice
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// Bits outside of any known facet are set
    #[error("Status word {bits:#x} has bits that do not belong to any facet")]
    UnknownBits { bits: u32 },

    /// Two facets that can never coexist are both set
    #[error("Status {status} combines {first} with {second}, which are mutually exclusive")]
    Exclusive {
        status: String,
        first: &'static str,
        second: &'static str,
    },

    /// A facet is set without the facet it depends on
    #[error("Status {status} has {facet} without {requires}")]
    MissingRequirement {
        status: String,
        facet: &'static str,
        requires: &'static str,
    },
}

/// One boolean facet of a [`SessionStatus`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facet {
    Linking,
    Linked,
    Syncing,
    Unlinking,
    /// A key or value is pending delivery but has not been materialized yet
    CuedDown,
    /// The transport owes the session exactly one pull
    FeedingDown,
    /// An upstream feed arrived while a pull was in flight
    FeedingUp,
    /// The session has asked for, or is processing, one inbound envelope
    PullingUp,
    Closed,
}

impl Facet {
    pub const ALL: [Facet; 9] = [
        Facet::Linking,
        Facet::Linked,
        Facet::Syncing,
        Facet::Unlinking,
        Facet::CuedDown,
        Facet::FeedingDown,
        Facet::FeedingUp,
        Facet::PullingUp,
        Facet::Closed,
    ];

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn name(self) -> &'static str {
        match self {
            Facet::Linking => "Linking",
            Facet::Linked => "Linked",
            Facet::Syncing => "Syncing",
            Facet::Unlinking => "Unlinking",
            Facet::CuedDown => "CuedDown",
            Facet::FeedingDown => "FeedingDown",
            Facet::FeedingUp => "FeedingUp",
            Facet::PullingUp => "PullingUp",
            Facet::Closed => "Closed",
        }
    }
}

const ALL_BITS: u32 = (1 << Facet::ALL.len()) - 1;
const HANDSHAKE: [Facet; 3] = [Facet::Linking, Facet::Linked, Facet::Syncing];

/// Immutable snapshot of a session's overlapping protocol facets.
///
/// Snapshots are plain values; the live status of a session is an
/// [`AtomicStatus`] that is only ever replaced through
/// [`AtomicStatus::update`]. The named transitions below (`link`, `sync`,
/// `unlink`, ..) return `None` when the transition does not apply, which
/// leaves the live word untouched.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionStatus(u32);

impl SessionStatus {
    pub const IDLE: SessionStatus = SessionStatus(0);
    pub const CLOSED: SessionStatus = SessionStatus(Facet::Closed.bit());

    /// Builds a status from raw bits, rejecting words that break the lattice
    pub fn from_bits(bits: u32) -> Result<Self, StatusError> {
        if bits & !ALL_BITS != 0 {
            return Err(StatusError::UnknownBits { bits });
        }
        let status = Self(bits);
        status.validate()?;
        Ok(status)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn has(self, facet: Facet) -> bool {
        self.0 & facet.bit() != 0
    }

    pub fn with(self, facet: Facet) -> Self {
        Self(self.0 | facet.bit())
    }

    pub fn without(self, facet: Facet) -> Self {
        Self(self.0 & !facet.bit())
    }

    pub fn is_idle(self) -> bool {
        self.0 == 0
    }

    pub fn is_linking(self) -> bool {
        self.has(Facet::Linking)
    }

    pub fn is_linked(self) -> bool {
        self.has(Facet::Linked)
    }

    pub fn is_syncing(self) -> bool {
        self.has(Facet::Syncing)
    }

    pub fn is_unlinking(self) -> bool {
        self.has(Facet::Unlinking)
    }

    pub fn is_cued_down(self) -> bool {
        self.has(Facet::CuedDown)
    }

    pub fn is_feeding_down(self) -> bool {
        self.has(Facet::FeedingDown)
    }

    pub fn is_feeding_up(self) -> bool {
        self.has(Facet::FeedingUp)
    }

    pub fn is_pulling_up(self) -> bool {
        self.has(Facet::PullingUp)
    }

    pub fn is_closed(self) -> bool {
        self.has(Facet::Closed)
    }

    /// Acknowledgements or cued items are owed to the subscriber
    pub fn has_pending_down(self) -> bool {
        self.is_unlinking() || self.is_linking() || self.is_syncing() || self.is_cued_down()
    }

    /// Upstream work is no longer accepted
    pub fn is_draining(self) -> bool {
        self.is_unlinking() || self.is_closed()
    }

    // Transitions

    /// `LinkRequest`: begin the handshake and claim a downstream credit
    pub fn link(self) -> Option<Self> {
        if self.is_draining() || self.is_linked() {
            return None;
        }
        Some(
            self.with(Facet::Linking)
                .with(Facet::Linked)
                .with(Facet::FeedingDown),
        )
    }

    /// `SyncRequest`: as `link`, additionally owing a `Synced` acknowledgement
    pub fn sync(self) -> Option<Self> {
        if self.is_draining() || self.is_syncing() {
            return None;
        }
        let mut next = self.with(Facet::Syncing).with(Facet::FeedingDown);
        if !self.is_linked() {
            next = next.with(Facet::Linking).with(Facet::Linked);
        }
        Some(next)
    }

    /// Peer- or lane-initiated teardown; supersedes every handshake phase
    pub fn unlink(self) -> Option<Self> {
        if self.is_draining() {
            return None;
        }
        let mut next = self;
        for facet in HANDSHAKE {
            next = next.without(facet);
        }
        Some(next.with(Facet::Unlinking).with(Facet::FeedingDown))
    }

    /// Marks data pending delivery and claims a downstream credit
    pub fn cue_down(self) -> Option<Self> {
        if self.is_closed() || (self.is_cued_down() && self.is_feeding_down()) {
            return None;
        }
        Some(self.with(Facet::CuedDown).with(Facet::FeedingDown))
    }

    /// Claims a downstream credit if none is outstanding
    pub fn feed_down(self) -> Option<Self> {
        if self.is_closed() || self.is_feeding_down() {
            return None;
        }
        Some(self.with(Facet::FeedingDown))
    }

    /// Clears `facet` if it is set, so exactly one caller observes the edge
    pub fn take(self, facet: Facet) -> Option<Self> {
        if self.is_closed() || !self.has(facet) {
            return None;
        }
        Some(self.without(facet))
    }

    /// Checks the lattice invariants
    pub fn validate(self) -> Result<(), StatusError> {
        if self.is_closed() {
            if let Some(facet) = Facet::ALL
                .iter()
                .copied()
                .find(|facet| *facet != Facet::Closed && self.has(*facet))
            {
                return Err(self.exclusive(Facet::Closed, facet));
            }
            return Ok(());
        }
        if self.is_unlinking() {
            if let Some(facet) = HANDSHAKE.iter().copied().find(|facet| self.has(*facet)) {
                return Err(self.exclusive(Facet::Unlinking, facet));
            }
        }
        for facet in [Facet::Linking, Facet::Syncing] {
            if self.has(facet) && !self.is_linked() {
                return Err(StatusError::MissingRequirement {
                    status: self.to_string(),
                    facet: facet.name(),
                    requires: Facet::Linked.name(),
                });
            }
        }
        Ok(())
    }

    fn exclusive(self, first: Facet, second: Facet) -> StatusError {
        StatusError::Exclusive {
            status: self.to_string(),
            first: first.name(),
            second: second.name(),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_idle() {
            return write!(f, "Idle");
        }
        let mut first = true;
        for facet in Facet::ALL {
            if self.has(facet) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", facet.name())?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionStatus({})", self)
    }
}

/// The live status word of one session
pub struct AtomicStatus {
    bits: AtomicU32,
}

impl AtomicStatus {
    pub fn new(status: SessionStatus) -> Self {
        Self {
            bits: AtomicU32::new(status.bits()),
        }
    }

    pub fn load(&self) -> SessionStatus {
        SessionStatus(self.bits.load(Ordering::Acquire))
    }

    /// Applies `transition` in a compare-and-swap retry loop.
    ///
    /// `transition` may run several times under contention and must be free
    /// of side effects. Returning `None` leaves the word untouched. Returns
    /// the `(old, new)` pair of the winning attempt; both are equal when
    /// nothing changed, so callers detect edges by comparing facets of the two.
    pub fn update<F>(&self, mut transition: F) -> (SessionStatus, SessionStatus)
    where
        F: FnMut(SessionStatus) -> Option<SessionStatus>,
    {
        let mut old = self.load();
        loop {
            let Some(new) = transition(old) else {
                return (old, old);
            };
            debug_assert!(
                new.validate().is_ok(),
                "invalid status transition {} -> {}: {:?}",
                old,
                new,
                new.validate()
            );
            if new == old {
                return (old, old);
            }
            match self.bits.compare_exchange_weak(
                old.bits(),
                new.bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    log::trace!("status {} -> {}", old, new);
                    return (old, new);
                }
                Err(actual) => old = SessionStatus(actual),
            }
        }
    }
}

impl Default for AtomicStatus {
    fn default() -> Self {
        Self::new(SessionStatus::IDLE)
    }
}

impl fmt::Debug for AtomicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomicStatus({})", self.load())
    }
}
