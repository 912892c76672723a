use crate::types::ClientId;

/// Delivery guarantees requested from the transport for a given message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Delivered exactly once, in send order. Carries spawn, despawn and
    /// role messages.
    ReliableOrdered,
    /// Best-effort delivery, may drop or reorder. Carries per-frame state
    /// updates; the receiver enforces owner-frame monotonicity instead.
    Unreliable,
}

/// The transport collaborator the replication core sends through.
///
/// The core hands over fully-assembled payloads; the peer owns framing,
/// reliability and connection state. `targets` names the destination client
/// ids, and a client peer always addresses the server, receiving
/// `[SERVER_CLIENT_ID]`. Sends are non-blocking; reliability is entirely the
/// channel's concern.
pub trait MessagePeer {
    fn send(&mut self, channel: ChannelKind, targets: &[ClientId], payload: &[u8]);
}
