use std::fmt;

/// Identifier of a peer participating in the session.
pub type ClientId = u32;

/// The distinguished client id held by the server peer.
pub const SERVER_CLIENT_ID: ClientId = 0;

/// Engine tick counter, published by the caller each update.
pub type Frame = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Server,
    Client,
}

impl HostType {
    pub fn is_server(self) -> bool {
        self == HostType::Server
    }

    pub fn is_client(self) -> bool {
        self == HostType::Client
    }
}

/// Local authority role of a replicated object.
///
/// Exactly one peer at a time holds `OwnedAuthoritative` for a given logical
/// object; every other participating peer holds `Replicated`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NetworkObjectRole {
    /// Not participating in replication.
    #[default]
    None,
    /// Another peer holds authority; local state follows inbound updates.
    Replicated,
    /// The local peer holds authority and emits state updates.
    OwnedAuthoritative,
}

/// Stable 128-bit object identifier assigned by the object system.
///
/// Unique per peer but not globally; independently-spawned representations of
/// the same logical object are reconciled through the remap table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(u128);

impl NetId {
    pub const ZERO: NetId = NetId(0);

    pub const fn new(value: u128) -> Self {
        NetId(value)
    }

    pub const fn value(self) -> u128 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Stable 128-bit prefab asset identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PrefabId(u128);

impl PrefabId {
    pub const ZERO: PrefabId = PrefabId(0);

    pub const fn new(value: u128) -> Self {
        PrefabId(value)
    }

    pub const fn value(self) -> u128 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for PrefabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}
