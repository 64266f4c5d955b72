use std::default::Default;

use uplink_shared::SessionId;

/// Contains Config properties which will be used by an Uplink Session
#[derive(Clone, Debug)]
pub struct UplinkConfig {
    /// Priority reported before a link request arrives, and adopted when a
    /// request carries a non-finite priority
    pub default_prio: f32,
    /// Rate reported before a link request arrives, and adopted when a
    /// request carries a non-finite rate
    pub default_rate: f32,
    /// Determines whether the `Linked` acknowledgement echoes the body of
    /// the link request that produced it
    pub echo_link_body: bool,
    /// Identity supplied by the peer. A random identity is generated when
    /// this is `None`.
    pub identity: Option<SessionId>,
}

impl Default for UplinkConfig {
    fn default() -> Self {
        Self {
            default_prio: 0.0,
            default_rate: 0.0,
            echo_link_body: false,
            identity: None,
        }
    }
}

impl UplinkConfig {
    pub(crate) fn adopt_prio(&self, prio: f32) -> f32 {
        if prio.is_finite() {
            prio
        } else {
            self.default_prio
        }
    }

    pub(crate) fn adopt_rate(&self, rate: f32) -> f32 {
        if rate.is_finite() {
            rate
        } else {
            self.default_rate
        }
    }
}
