use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use log::{error, info, warn};

use crate::messages::{
    ObjectDespawnMessage, ObjectReplicateMessage, ObjectRoleMessage, ObjectSpawnMessage, TypeName,
    MAX_REPLICATED_DATA_SIZE,
};
use crate::object::NetObjectHooks;
use crate::queues::{propagate_spawn_ownership, ReplicationQueues};
use crate::registry::{ObjectRegistry, ReplicatedObject};
use crate::serializers::{SerdeOp, SerializeFn, SerializerRegistry, SerializerTag};
use crate::stream::{NetworkStream, WireSerde};
use crate::transport::{ChannelKind, MessagePeer};
use crate::types::{ClientId, Frame, HostType, NetId, NetworkObjectRole, PrefabId, SERVER_CLIENT_ID};
use crate::world::{ObjectWorldMut, TypeKind};

/// Tuning knobs for a replicator instance.
pub struct ReplicatorConfig {
    /// Initial capacity of the cached serialization streams.
    pub scratch_capacity: usize,
    /// Log inbound messages that are dropped by policy (unknown object,
    /// unauthorized sender, stale frame). Off by default; drops are silent.
    pub log_drops: bool,
}

impl Default for ReplicatorConfig {
    fn default() -> Self {
        Self {
            scratch_capacity: 4096,
            log_drops: false,
        }
    }
}

pub(crate) struct ReplicatorState<O> {
    pub(crate) registry: ObjectRegistry<O>,
    pub(crate) queues: ReplicationQueues<O>,
    pub(crate) serializers: SerializerRegistry,
    pub(crate) connected_clients: Vec<ClientId>,
    pub(crate) new_clients: Vec<ClientId>,
    pub(crate) cached_targets: Vec<ClientId>,
    pub(crate) write_stream: NetworkStream,
    pub(crate) read_stream: NetworkStream,
    pub(crate) message_stream: NetworkStream,
}

/// The replication core.
///
/// Keeps the registry of replicated objects, drains spawn/despawn intents
/// once per frame, broadcasts object state, and applies inbound replication
/// messages. The same type drives both the server and client peers; behavior
/// branches on the host type where the flows differ.
///
/// All state sits behind one coarse mutex: every public entry point locks it
/// for its full duration, so game code may call in from any thread while the
/// network tick runs the update. Engine access goes through
/// [`ObjectWorldMut`] parameters; nothing engine-side is retained between
/// calls.
pub struct NetworkReplicator<O: Copy + Eq + Hash + Send + Sync> {
    pub(crate) host_type: HostType,
    pub(crate) local_client_id: ClientId,
    pub(crate) log_drops: bool,
    pub(crate) state: Mutex<ReplicatorState<O>>,
}

impl<O: Copy + Eq + Hash + Send + Sync> NetworkReplicator<O> {
    fn with_host(host_type: HostType, local_client_id: ClientId, config: ReplicatorConfig) -> Self {
        Self {
            host_type,
            local_client_id,
            log_drops: config.log_drops,
            state: Mutex::new(ReplicatorState {
                registry: ObjectRegistry::new(),
                queues: ReplicationQueues::new(),
                serializers: SerializerRegistry::new(),
                connected_clients: Vec::new(),
                new_clients: Vec::new(),
                cached_targets: Vec::new(),
                write_stream: NetworkStream::with_capacity(config.scratch_capacity),
                read_stream: NetworkStream::with_capacity(config.scratch_capacity),
                message_stream: NetworkStream::with_capacity(config.scratch_capacity),
            }),
        }
    }

    /// Creates the replicator for the server peer.
    pub fn server(config: ReplicatorConfig) -> Self {
        Self::with_host(HostType::Server, SERVER_CLIENT_ID, config)
    }

    /// Creates the replicator for a client peer with its session client id.
    pub fn client(local_client_id: ClientId, config: ReplicatorConfig) -> Self {
        debug_assert_ne!(local_client_id, SERVER_CLIENT_ID);
        Self::with_host(HostType::Client, local_client_id, config)
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn local_client_id(&self) -> ClientId {
        self.local_client_id
    }

    pub fn is_server(&self) -> bool {
        self.host_type.is_server()
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, ReplicatorState<O>> {
        self.state.lock().expect("replication state lock poisoned")
    }

    /// Registers a serialization callback pair for an object type.
    pub fn add_serializer(
        &self,
        kind: TypeKind,
        serialize: SerializeFn,
        deserialize: SerializeFn,
        serialize_tag: SerializerTag,
        deserialize_tag: SerializerTag,
    ) {
        self.lock_state().serializers.add_serializer(
            kind,
            serialize,
            deserialize,
            serialize_tag,
            deserialize_tag,
        );
    }

    /// Registers an object for replication without announcing it.
    pub fn add_object<W: ObjectWorldMut<O>>(&self, world: &mut W, object: O, parent: Option<O>) {
        let mut guard = self.lock_state();
        guard.registry.add_object(world, self.host_type, object, parent);
    }

    /// Drops the replication record for an object, if any.
    pub fn remove_object<W: ObjectWorldMut<O>>(&self, world: &W, object: &O) {
        let mut guard = self.lock_state();
        if !world.object_alive(object) {
            return;
        }
        let id = world.object_id(object);
        if guard.registry.remove(&id).is_some() {
            info!("remove object {}", id);
        }
    }

    /// Queues the object for a replicated spawn, broadcast to all peers.
    pub fn spawn_object<W: ObjectWorldMut<O>>(&self, world: &W, object: O) {
        self.spawn_object_with_targets(world, object, Vec::new());
    }

    /// Queues the object for a replicated spawn addressed to an explicit set
    /// of clients. Dropped when the object was already spawned.
    pub fn spawn_object_with_targets<W: ObjectWorldMut<O>>(
        &self,
        world: &W,
        object: O,
        target_client_ids: Vec<ClientId>,
    ) {
        let mut guard = self.lock_state();
        if !world.object_alive(&object) {
            return;
        }
        let id = world.object_id(&object);
        if guard.registry.get(&id).map_or(false, |item| item.spawned) {
            return;
        }
        guard.queues.enqueue_spawn(object, target_client_ids);
    }

    /// Despawns an object owned by the local peer: queues the despawn
    /// message and destroys the object locally right away.
    pub fn despawn_object<W: ObjectWorldMut<O>>(&self, world: &mut W, object: &O) {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        if !world.object_alive(object) {
            return;
        }
        let id = world.object_id(object);
        let Some(item) = state.registry.get(&id) else {
            return;
        };
        if item.object != *object || !item.spawned || item.owner_client_id != self.local_client_id
        {
            return;
        }
        let has_hooks = item.has_hooks;
        state.queues.enqueue_despawn(id);
        state.queues.remove_spawn(object);
        if has_hooks {
            invoke_hook(world, object, |hooks| hooks.on_network_despawn());
        }
        destroy_net_object(world, object);
    }

    /// The peer that owns the object; `SERVER_CLIENT_ID` when unknown.
    pub fn object_owner<W: ObjectWorldMut<O>>(&self, world: &W, object: &O) -> ClientId {
        let guard = self.lock_state();
        if !world.object_alive(object) {
            return SERVER_CLIENT_ID;
        }
        guard
            .registry
            .get(&world.object_id(object))
            .map(|item| item.owner_client_id)
            .unwrap_or(SERVER_CLIENT_ID)
    }

    /// The local role for the object; `None` when not participating.
    pub fn object_role<W: ObjectWorldMut<O>>(&self, world: &W, object: &O) -> NetworkObjectRole {
        let guard = self.lock_state();
        if !world.object_alive(object) {
            return NetworkObjectRole::None;
        }
        guard
            .registry
            .get(&world.object_id(object))
            .map(|item| item.role)
            .unwrap_or(NetworkObjectRole::None)
    }

    /// Transfers ownership of an object, or adjusts the local role.
    ///
    /// Only the owning peer may give ownership away; doing so announces the
    /// change on the reliable channel. Non-owners may only adjust their local
    /// role. With `hierarchical`, the change cascades to every registered
    /// object whose replication parent is this object.
    pub fn set_ownership<W: ObjectWorldMut<O>, P: MessagePeer>(
        &self,
        world: &W,
        peer: &mut P,
        object: &O,
        owner_client_id: ClientId,
        local_role: NetworkObjectRole,
        hierarchical: bool,
    ) {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        if !world.object_alive(object) {
            return;
        }
        let id = world.object_id(object);
        match state.registry.get(&id) {
            Some(item) => {
                if item.object != *object {
                    return;
                }
            }
            None => {
                // Not registered yet; the object may be awaiting its first
                // replication pass with a pending spawn intent.
                for intent in state.queues.spawns.iter_mut() {
                    if intent.object == *object {
                        intent.has_ownership = true;
                        intent.hierarchical = hierarchical;
                        intent.owner_client_id = owner_client_id;
                        intent.role = local_role;
                        break;
                    }
                }
                return;
            }
        }
        let ReplicatorState {
            registry,
            connected_clients,
            cached_targets,
            message_stream,
            ..
        } = state;
        apply_ownership(
            registry,
            connected_clients,
            cached_targets,
            message_stream,
            peer,
            self.host_type,
            self.local_client_id,
            id,
            owner_client_id,
            local_role,
            hierarchical,
        );
    }

    /// Flags a locally-authoritative object as changed.
    pub fn mark_dirty<W: ObjectWorldMut<O>>(&self, world: &W, object: &O) {
        let guard = self.lock_state();
        if !world.object_alive(object) {
            return;
        }
        let Some(item) = guard.registry.get(&world.object_id(object)) else {
            return;
        };
        if item.object != *object || item.role != NetworkObjectRole::OwnedAuthoritative {
            return;
        }
        // Every authoritative record is rebroadcast each pass, so there is
        // no per-object dirty state to arm.
        // TODO: skip unchanged records in the state broadcast and re-arm
        // them here instead.
    }

    /// Server-side: a client finished connecting and should receive
    /// late-join catch-up on the next update.
    pub fn client_connected(&self, client_id: ClientId) {
        if self.host_type.is_client() {
            return;
        }
        let mut guard = self.lock_state();
        if !guard.connected_clients.contains(&client_id) {
            guard.connected_clients.push(client_id);
        }
        if !guard.new_clients.contains(&client_id) {
            guard.new_clients.push(client_id);
        }
    }

    /// Server-side: a client left the session. Every spawned object owned by
    /// that client is destroyed locally; no despawn messages are emitted,
    /// since remaining clients clean up through their own scene lifecycles.
    pub fn client_disconnected<W: ObjectWorldMut<O>>(&self, world: &mut W, client_id: ClientId) {
        if self.host_type.is_client() {
            return;
        }
        let mut guard = self.lock_state();
        let state = &mut *guard;
        state.connected_clients.retain(|id| *id != client_id);
        state.new_clients.retain(|id| *id != client_id);

        for id in state.registry.ids() {
            let Some(item) = state.registry.get(&id) else {
                continue;
            };
            if !item.spawned
                || item.owner_client_id != client_id
                || !world.object_alive(&item.object)
            {
                continue;
            }
            let object = item.object;
            let has_hooks = item.has_hooks;
            info!("remove object {} (owner {} disconnected)", id, client_id);
            if has_hooks {
                invoke_hook(world, &object, |hooks| hooks.on_network_despawn());
            }
            destroy_net_object(world, &object);
            state.registry.remove(&id);
        }
    }

    pub fn connected_clients(&self) -> Vec<ClientId> {
        self.lock_state().connected_clients.clone()
    }

    /// Publishes the id remap table to the object lookup so that message
    /// dispatch resolves remote object ids to local records. Call before
    /// handing received messages to [`process_message`]; the matching
    /// [`update`] unpublishes it.
    ///
    /// [`process_message`]: NetworkReplicator::process_message
    /// [`update`]: NetworkReplicator::update
    pub fn pre_update<W: ObjectWorldMut<O>>(&self, world: &mut W) {
        let guard = self.lock_state();
        world.set_id_remapping(Some(guard.registry.remap_forward()));
    }

    /// Runs one replication pass: late-join catch-up, despawn and spawn
    /// drains on the reliable channel, then the unreliable state broadcast.
    pub fn update<W: ObjectWorldMut<O>, P: MessagePeer>(
        &self,
        frame: Frame,
        world: &mut W,
        peer: &mut P,
    ) {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        let is_client = self.host_type.is_client();
        let local_client_id = self.local_client_id;

        if state.registry.is_empty() && state.queues.is_empty() {
            world.set_id_remapping(None);
            return;
        }
        // Keep the id lookup mapping installed for serializers that resolve
        // object references while the pass runs.
        world.set_id_remapping(Some(state.registry.remap_forward()));

        // Sync previously spawned objects with late-joining clients.
        if !is_client && !state.new_clients.is_empty() {
            let ReplicatorState {
                registry,
                new_clients,
                cached_targets,
                message_stream,
                ..
            } = &mut *state;
            for item in registry.iter() {
                if !item.spawned || !world.object_alive(&item.object) {
                    continue;
                }
                build_targets(
                    new_clients,
                    &item.target_client_ids,
                    SERVER_CLIENT_ID,
                    cached_targets,
                );
                if cached_targets.is_empty() {
                    continue;
                }
                send_object_spawn(
                    self.host_type,
                    registry,
                    item,
                    world,
                    message_stream,
                    peer,
                    cached_targets,
                );
            }
            new_clients.clear();
        }

        // Collect this frame's default target set.
        {
            let ReplicatorState {
                connected_clients,
                cached_targets,
                ..
            } = &mut *state;
            build_targets(connected_clients, &[], SERVER_CLIENT_ID, cached_targets);
        }
        if !is_client && state.cached_targets.is_empty() {
            // Server with nobody to send to; queued intents stay pending.
            world.set_id_remapping(None);
            return;
        }

        // Despawns go out before any spawn from the same frame.
        if !state.queues.despawns.is_empty() {
            let ReplicatorState {
                registry,
                queues,
                cached_targets,
                message_stream,
                ..
            } = &mut *state;
            for id in queues.despawns.drain(..) {
                info!("despawn object {}", id);
                let object_id = if is_client {
                    registry.canonical_id(&id)
                } else {
                    id
                };
                message_stream.initialize();
                ObjectDespawnMessage { object_id }.ser(message_stream);
                send_message(
                    self.host_type,
                    peer,
                    ChannelKind::ReliableOrdered,
                    cached_targets,
                    message_stream.as_bytes(),
                );
            }
        }

        // Spawn drain.
        if !state.queues.spawns.is_empty() {
            propagate_spawn_ownership(&*world, &mut state.queues.spawns);
            let intents = std::mem::take(&mut state.queues.spawns);
            for intent in intents {
                if !world.object_alive(&intent.object) {
                    continue;
                }
                let id = world.object_id(&intent.object);
                if !state.registry.contains(&id) {
                    state
                        .registry
                        .add_object(world, self.host_type, intent.object, None);
                    if !state.registry.contains(&id) {
                        continue;
                    }
                }
                {
                    let Some(item) = state.registry.get_mut(&id) else {
                        continue;
                    };
                    if item.spawned {
                        continue;
                    }
                    // Only the authoritative owner announces the spawn.
                    if item.owner_client_id != local_client_id
                        || item.role != NetworkObjectRole::OwnedAuthoritative
                    {
                        continue;
                    }
                    if intent.has_ownership {
                        item.owner_client_id = intent.owner_client_id;
                        item.role = intent.role;
                    }
                    if !intent.targets.is_empty() {
                        if is_client {
                            warn!(
                                "object {}: custom target lists are not forwarded to the server",
                                id
                            );
                        }
                        item.target_client_ids = intent.targets.clone();
                    }
                }
                if intent.has_ownership && intent.hierarchical {
                    let ReplicatorState {
                        registry,
                        connected_clients,
                        cached_targets,
                        message_stream,
                        ..
                    } = &mut *state;
                    apply_ownership(
                        registry,
                        connected_clients,
                        cached_targets,
                        message_stream,
                        peer,
                        self.host_type,
                        local_client_id,
                        id,
                        intent.owner_client_id,
                        intent.role,
                        true,
                    );
                }
                info!("spawn object {}", id);
                let ReplicatorState {
                    registry,
                    connected_clients,
                    cached_targets,
                    message_stream,
                    ..
                } = &mut *state;
                let Some(item) = registry.get(&id) else {
                    continue;
                };
                build_targets(
                    connected_clients,
                    &item.target_client_ids,
                    SERVER_CLIENT_ID,
                    cached_targets,
                );
                send_object_spawn(
                    self.host_type,
                    registry,
                    item,
                    world,
                    message_stream,
                    peer,
                    cached_targets,
                );
                if let Some(item) = registry.get_mut(&id) {
                    item.spawned = true;
                }
            }
        }

        // State broadcast over all records; dead back-references are purged
        // here rather than in a separate sweep.
        for id in state.registry.ids() {
            let Some(item) = state.registry.get(&id) else {
                continue;
            };
            let alive = world.object_alive(&item.object);
            let object = item.object;
            let parent_id = item.parent_id;
            let owner_client_id = item.owner_client_id;
            let role = item.role;
            let has_hooks = item.has_hooks;
            if !alive {
                info!("remove object {} (object destroyed)", id);
                state.registry.remove(&id);
                continue;
            }

            // Clients send only their own authoritative objects; the server
            // additionally forwards state of client-owned objects to the
            // other peers.
            let should_send = role == NetworkObjectRole::OwnedAuthoritative
                || (!is_client && owner_client_id != local_client_id);
            if !should_send {
                continue;
            }

            if has_hooks {
                invoke_hook(world, &object, |hooks| hooks.on_network_serialize());
            }

            let kind = world.object_type(&object);
            let entry = match state.serializers.resolve(&*world, kind) {
                Ok(entry) => entry,
                Err(_) => {
                    if let Some(item) = state.registry.get_mut(&id) {
                        if !item.missing_serializer_warned {
                            item.missing_serializer_warned = true;
                            error!(
                                "cannot serialize object {} (missing serialization logic)",
                                id
                            );
                        }
                    }
                    continue;
                }
            };
            state.write_stream.initialize();
            {
                let Some(instance) = world.object_mut(&object) else {
                    continue;
                };
                entry.call(SerdeOp::Serialize, instance, &mut state.write_stream);
            }
            let size = state.write_stream.position();
            assert!(
                size <= MAX_REPLICATED_DATA_SIZE,
                "object {} serialized {} bytes, above the {}-byte message limit",
                id,
                size,
                MAX_REPLICATED_DATA_SIZE
            );

            let ReplicatorState {
                registry,
                connected_clients,
                cached_targets,
                write_stream,
                message_stream,
                ..
            } = &mut *state;
            let (object_id, parent_id) = if is_client {
                (registry.canonical_id(&id), registry.canonical_id(&parent_id))
            } else {
                (id, parent_id)
            };
            let type_name = TypeName::from_str(world.type_name(&kind).unwrap_or_default());
            message_stream.initialize();
            ObjectReplicateMessage {
                owner_frame: frame,
                object_id,
                parent_id,
                type_name,
                data_size: size as u16,
            }
            .ser(message_stream);
            message_stream.write_bytes(write_stream.as_bytes());
            if !is_client {
                let Some(item) = registry.get(&id) else {
                    continue;
                };
                build_targets(
                    connected_clients,
                    &item.target_client_ids,
                    owner_client_id,
                    cached_targets,
                );
            }
            send_message(
                self.host_type,
                peer,
                ChannelKind::Unreliable,
                cached_targets,
                message_stream.as_bytes(),
            );
        }

        world.set_id_remapping(None);
    }

    /// Synchronous shutdown: destroys every spawned object and drops all
    /// replication state.
    pub fn clear<W: ObjectWorldMut<O>>(&self, world: &mut W) {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        info!("network replicator shutdown");
        for id in state.registry.ids() {
            let Some(item) = state.registry.get(&id) else {
                continue;
            };
            if !item.spawned || !world.object_alive(&item.object) {
                continue;
            }
            let object = item.object;
            if item.has_hooks {
                invoke_hook(world, &object, |hooks| hooks.on_network_despawn());
            }
            destroy_net_object(world, &object);
        }
        state.registry.clear();
        state.queues.clear();
        state.connected_clients.clear();
        state.new_clients.clear();
        state.cached_targets.clear();
        world.set_id_remapping(None);
    }
}

/// Ownership transition for one record, cascading to registered children
/// when `hierarchical`.
#[allow(clippy::too_many_arguments)]
fn apply_ownership<O, P>(
    registry: &mut ObjectRegistry<O>,
    connected_clients: &[ClientId],
    cached_targets: &mut Vec<ClientId>,
    message_stream: &mut NetworkStream,
    peer: &mut P,
    host_type: HostType,
    local_client_id: ClientId,
    id: NetId,
    new_owner: ClientId,
    new_role: NetworkObjectRole,
    hierarchical: bool,
) where
    O: Copy + Eq + Hash,
    P: MessagePeer,
{
    let mut announce_owner = None;
    {
        let Some(item) = registry.get_mut(&id) else {
            return;
        };
        if item.owner_client_id == local_client_id {
            if item.owner_client_id != new_owner {
                // Giving ownership away; authority leaves with it.
                if new_role == NetworkObjectRole::OwnedAuthoritative {
                    error!(
                        "object {}: cannot keep the authoritative role while giving ownership away",
                        id
                    );
                    return;
                }
                item.owner_client_id = new_owner;
                item.last_owner_frame = 1;
                item.role = new_role;
                announce_owner = Some(new_owner);
            } else if new_role != NetworkObjectRole::OwnedAuthoritative {
                error!("object {}: the owning peer must keep the authoritative role", id);
                return;
            }
        } else {
            // Local role adjustment only; ownership stays remote.
            if new_role == NetworkObjectRole::OwnedAuthoritative {
                error!(
                    "object {}: owned by client {}, cannot claim authority locally",
                    id, item.owner_client_id
                );
                return;
            }
            item.role = new_role;
        }
    }

    if let Some(owner_client_id) = announce_owner {
        let object_id = if host_type.is_client() {
            registry.canonical_id(&id)
        } else {
            id
        };
        build_targets(connected_clients, &[], SERVER_CLIENT_ID, cached_targets);
        send_object_role(
            host_type,
            peer,
            message_stream,
            cached_targets,
            object_id,
            owner_client_id,
        );
    }

    if hierarchical {
        for child in registry.children_of(&id) {
            apply_ownership(
                registry,
                connected_clients,
                cached_targets,
                message_stream,
                peer,
                host_type,
                local_client_id,
                child,
                new_owner,
                new_role,
                true,
            );
        }
    }
}

/// Collects the connected clients a message should go to: everyone but
/// `excluded`, narrowed to `filter` when it is non-empty.
pub(crate) fn build_targets(
    clients: &[ClientId],
    filter: &[ClientId],
    excluded: ClientId,
    out: &mut Vec<ClientId>,
) {
    out.clear();
    for client_id in clients {
        if *client_id == excluded {
            continue;
        }
        if !filter.is_empty() && !filter.contains(client_id) {
            continue;
        }
        out.push(*client_id);
    }
}

/// Routes a finished payload: clients always address the server, the server
/// sends to the computed target list.
pub(crate) fn send_message<P: MessagePeer>(
    host_type: HostType,
    peer: &mut P,
    channel: ChannelKind,
    targets: &[ClientId],
    payload: &[u8],
) {
    if host_type.is_client() {
        peer.send(channel, &[SERVER_CLIENT_ID], payload);
    } else if !targets.is_empty() {
        peer.send(channel, targets, payload);
    }
}

pub(crate) fn send_object_spawn<O, W, P>(
    host_type: HostType,
    registry: &ObjectRegistry<O>,
    item: &ReplicatedObject<O>,
    world: &W,
    stream: &mut NetworkStream,
    peer: &mut P,
    targets: &[ClientId],
) where
    O: Copy + Eq + Hash,
    W: ObjectWorldMut<O>,
    P: MessagePeer,
{
    let (object_id, parent_id) = if host_type.is_client() {
        (
            registry.canonical_id(&item.object_id),
            registry.canonical_id(&item.parent_id),
        )
    } else {
        (item.object_id, item.parent_id)
    };
    let (prefab_id, prefab_object_id) = world
        .prefab_link(&item.object)
        .unwrap_or((PrefabId::ZERO, NetId::ZERO));
    let kind = world.object_type(&item.object);
    let type_name = TypeName::from_str(world.type_name(&kind).unwrap_or_default());

    stream.initialize();
    ObjectSpawnMessage {
        object_id,
        parent_id,
        prefab_id,
        prefab_object_id,
        owner_client_id: item.owner_client_id,
        type_name,
    }
    .ser(stream);
    send_message(
        host_type,
        peer,
        ChannelKind::ReliableOrdered,
        targets,
        stream.as_bytes(),
    );
}

pub(crate) fn send_object_role<P: MessagePeer>(
    host_type: HostType,
    peer: &mut P,
    stream: &mut NetworkStream,
    targets: &[ClientId],
    object_id: NetId,
    owner_client_id: ClientId,
) {
    stream.initialize();
    ObjectRoleMessage {
        object_id,
        owner_client_id,
    }
    .ser(stream);
    send_message(
        host_type,
        peer,
        ChannelKind::ReliableOrdered,
        targets,
        stream.as_bytes(),
    );
}

/// Runs a lifecycle hook on an object that advertises the capability.
pub(crate) fn invoke_hook<O, W, F>(world: &mut W, object: &O, hook: F)
where
    O: Copy + Eq + Hash,
    W: ObjectWorldMut<O>,
    F: FnOnce(&mut dyn NetObjectHooks),
{
    if let Some(instance) = world.object_mut(object) {
        if let Some(hooks) = instance.hooks() {
            hook(hooks);
        }
    }
}

/// Destroys a replicated object. A script component takes its owning actor
/// down with it.
pub(crate) fn destroy_net_object<O, W>(world: &mut W, object: &O)
where
    O: Copy + Eq + Hash,
    W: ObjectWorldMut<O>,
{
    if let Some(actor) = world.script_parent(object) {
        world.destroy_object(&actor);
    } else {
        world.destroy_object(object);
    }
}
