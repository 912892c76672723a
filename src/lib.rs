//! # netreplica
//! Server-authoritative replication of game objects over a message-based
//! transport: spawn/despawn propagation, per-frame state broadcast with
//! owner-frame ordering, ownership transfer, identity reconciliation for
//! independently-created objects, and late-join catch-up.
//!
//! The crate is engine-agnostic: the object system, scene graph, prefab
//! manager and transport are collaborators expressed as traits
//! ([`ObjectWorldMut`], [`MessagePeer`]), and objects are addressed through
//! an opaque handle type chosen by the integration.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod messages;
mod object;
mod queues;
mod registry;
mod remote;
mod replicator;
mod serializers;
mod stream;
mod transport;
mod types;
mod world;

pub use messages::{
    MessageId, ObjectDespawnMessage, ObjectReplicateMessage, ObjectRoleMessage,
    ObjectSpawnMessage, TypeName, MAX_REPLICATED_DATA_SIZE, TYPE_NAME_LEN,
};
pub use object::{NetObject, NetObjectHooks, NetSerializable};
pub use queues::{ReplicationQueues, SpawnIntent};
pub use registry::{ObjectRegistry, RemapTable, ReplicatedObject};
pub use replicator::{NetworkReplicator, ReplicatorConfig};
pub use serializers::{
    SerdeOp, SerializeFn, SerializerEntry, SerializerError, SerializerRegistry, SerializerTag,
};
pub use stream::{NetworkStream, SerdeErr, WireSerde};
pub use transport::{ChannelKind, MessagePeer};
pub use types::{
    ClientId, Frame, HostType, NetId, NetworkObjectRole, PrefabId, SERVER_CLIENT_ID,
};
pub use world::{ObjectWorldMut, PrefabSpawnError, TypeKind, TypeLookup};
