use std::fmt;

/// Opaque identity of one uplink session.
///
/// Assigned once when the session opens and used by the lane to address
/// the session when closing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Wraps an identity supplied by the peer
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Generates a fresh, non-zero random identity
    pub fn generate() -> Self {
        Self(fastrand::u64(1..))
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
