use std::fmt;

/// One callback interface an observer may implement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    OnEvent,
    OnCommand,
    OnLink,
    OnLinked,
    OnSync,
    OnSynced,
    OnUnlink,
    OnUnlinked,
    OnClose,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::OnEvent,
        Capability::OnCommand,
        Capability::OnLink,
        Capability::OnLinked,
        Capability::OnSync,
        Capability::OnSynced,
        Capability::OnUnlink,
        Capability::OnUnlinked,
        Capability::OnClose,
    ];

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn name(self) -> &'static str {
        match self {
            Capability::OnEvent => "on-event",
            Capability::OnCommand => "on-command",
            Capability::OnLink => "on-link",
            Capability::OnLinked => "on-linked",
            Capability::OnSync => "on-sync",
            Capability::OnSynced => "on-synced",
            Capability::OnUnlink => "on-unlink",
            Capability::OnUnlinked => "on-unlinked",
            Capability::OnClose => "on-close",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of capabilities, one bit per [`Capability`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u16);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);

    pub const fn all() -> Self {
        Capabilities((1 << Capability::ALL.len()) - 1)
    }

    pub fn of(capabilities: &[Capability]) -> Self {
        capabilities
            .iter()
            .fold(Self::NONE, |set, capability| set.with(*capability))
    }

    pub fn with(self, capability: Capability) -> Self {
        Capabilities(self.0 | capability.bit())
    }

    pub fn without(self, capability: Capability) -> Self {
        Capabilities(self.0 & !capability.bit())
    }

    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn intersect(self, other: Capabilities) -> Self {
        Capabilities(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(*capability))
    }
}

impl From<Capability> for Capabilities {
    fn from(capability: Capability) -> Self {
        Capabilities::NONE.with(capability)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
