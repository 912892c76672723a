use std::hash::Hash;

use log::{error, info, warn};

use crate::messages::{
    MessageId, ObjectDespawnMessage, ObjectReplicateMessage, ObjectRoleMessage, ObjectSpawnMessage,
};
use crate::registry::ReplicatedObject;
use crate::replicator::{
    build_targets, destroy_net_object, invoke_hook, send_object_role, NetworkReplicator,
    ReplicatorState,
};
use crate::serializers::SerdeOp;
use crate::stream::{SerdeErr, WireSerde};
use crate::transport::MessagePeer;
use crate::types::{ClientId, NetId, NetworkObjectRole, SERVER_CLIENT_ID};
use crate::world::ObjectWorldMut;

impl<O: Copy + Eq + Hash + Send + Sync> NetworkReplicator<O> {
    /// Applies one received replication message.
    ///
    /// `sender` identifies the client the transport received the message
    /// from; it is `None` when the message came down from the server, in
    /// which case ownership of relayed traffic is not re-validated. Returns
    /// an error only for malformed packets; messages dropped by policy
    /// (unknown object, unauthorized sender, stale frame) return `Ok`.
    pub fn process_message<W: ObjectWorldMut<O>, P: MessagePeer>(
        &self,
        sender: Option<ClientId>,
        data: &[u8],
        world: &mut W,
        peer: &mut P,
    ) -> Result<(), SerdeErr> {
        let Some(&lead) = data.first() else {
            return Err(SerdeErr::OutOfBytes {
                position: 0,
                needed: 1,
            });
        };
        let Some(message_id) = MessageId::from_u8(lead) else {
            return Err(SerdeErr::InvalidValue {
                field: "message id",
            });
        };
        let mut guard = self.lock_state();
        let state = &mut *guard;
        match message_id {
            MessageId::ObjectReplicate => self.on_object_replicate(state, sender, data, world),
            MessageId::ObjectSpawn => self.on_object_spawn(state, sender, data, world),
            MessageId::ObjectDespawn => self.on_object_despawn(state, sender, data, world),
            MessageId::ObjectRole => self.on_object_role(state, sender, data, world, peer),
        }
    }

    fn on_object_replicate<W: ObjectWorldMut<O>>(
        &self,
        state: &mut ReplicatorState<O>,
        sender: Option<ClientId>,
        data: &[u8],
        world: &mut W,
    ) -> Result<(), SerdeErr> {
        state.read_stream.initialize_read(data);
        let msg = ObjectReplicateMessage::de(&mut state.read_stream)?;
        if state.read_stream.remaining() < msg.data_size as usize {
            return Err(SerdeErr::OutOfBytes {
                position: state.read_stream.position(),
                needed: msg.data_size as usize - state.read_stream.remaining(),
            });
        }

        let Some(key) = state.registry.resolve_id_reconciling(
            &*world,
            &msg.object_id,
            &msg.parent_id,
            msg.type_name.as_str(),
        ) else {
            // Replication can arrive before the spawn message; the next
            // frame's state lands once the spawn is in.
            if self.log_drops {
                warn!("replicate for unknown object {}", msg.object_id);
            }
            return Ok(());
        };
        let Some(item) = state.registry.get_mut(&key) else {
            return Ok(());
        };
        if !world.object_alive(&item.object) {
            return Ok(());
        }
        if let Some(sender) = sender {
            if item.owner_client_id != sender {
                if self.log_drops {
                    warn!("replicate for object {} from non-owner client {}", key, sender);
                }
                return Ok(());
            }
        }
        if item.role == NetworkObjectRole::OwnedAuthoritative {
            // Stale traffic from before an ownership change landed here.
            return Ok(());
        }
        if msg.owner_frame <= item.last_owner_frame {
            if self.log_drops {
                warn!(
                    "stale replicate for object {} (frame {}, already at {})",
                    key, msg.owner_frame, item.last_owner_frame
                );
            }
            return Ok(());
        }
        item.last_owner_frame = msg.owner_frame;
        let object = item.object;
        let has_hooks = item.has_hooks;

        let kind = world.object_type(&object);
        match state.serializers.resolve(&*world, kind) {
            Ok(entry) => {
                let Some(instance) = world.object_mut(&object) else {
                    return Ok(());
                };
                entry.call(SerdeOp::Deserialize, instance, &mut state.read_stream);
            }
            Err(_) => {
                if let Some(item) = state.registry.get_mut(&key) {
                    if !item.missing_serializer_warned {
                        item.missing_serializer_warned = true;
                        error!(
                            "cannot deserialize object {} (missing serialization logic)",
                            key
                        );
                    }
                }
            }
        }
        if has_hooks {
            invoke_hook(world, &object, |hooks| hooks.on_network_deserialize());
        }
        Ok(())
    }

    fn on_object_spawn<W: ObjectWorldMut<O>>(
        &self,
        state: &mut ReplicatorState<O>,
        _sender: Option<ClientId>,
        data: &[u8],
        world: &mut W,
    ) -> Result<(), SerdeErr> {
        state.read_stream.initialize_read(data);
        let msg = ObjectSpawnMessage::de(&mut state.read_stream)?;

        if let Some(key) = state.registry.resolve_id_reconciling(
            &*world,
            &msg.object_id,
            &msg.parent_id,
            msg.type_name.as_str(),
        ) {
            let Some(item) = state.registry.get_mut(&key) else {
                return Ok(());
            };
            item.spawned = true;
            if self.host_type.is_client() {
                // The server's view of ownership wins over local state.
                item.owner_client_id = msg.owner_client_id;
                if item.role == NetworkObjectRole::OwnedAuthoritative {
                    item.role = NetworkObjectRole::Replicated;
                }
            } else if item.owner_client_id != msg.owner_client_id {
                warn!(
                    "object {} spawned remotely with owner {} but is owned by {}",
                    key, msg.owner_client_id, item.owner_client_id
                );
            }
            return Ok(());
        }

        // Recreate the object locally.
        let parent_key = state.registry.resolve_id(&msg.parent_id);
        let parent_object = parent_key
            .and_then(|key| state.registry.get(&key))
            .map(|record| record.object)
            .filter(|object| world.object_alive(object));
        let lookup_parent = state.registry.resolve_remote_id(&msg.parent_id);

        let mut object: Option<O> = None;
        if msg.prefab_id.is_valid() {
            let mut prefab_instance: Option<O> = None;
            let mut fresh_instance = false;
            if let Some(parent) = parent_object {
                if world.prefab_link(&parent).map(|(prefab, _)| prefab) == Some(msg.prefab_id) {
                    // The parent object is the prefab instance itself.
                    prefab_instance = Some(parent);
                }
            }
            if prefab_instance.is_none() {
                if let Some(parent_actor) = world.find_object(&lookup_parent) {
                    // An instance of the prefab may already hang under the
                    // parent, created locally but not yet networked.
                    for child in world.scene_children(&parent_actor) {
                        if world.prefab_link(&child).map(|(prefab, _)| prefab)
                            != Some(msg.prefab_id)
                        {
                            continue;
                        }
                        if let Some(sub_object) =
                            world.find_prefab_object(&child, &msg.prefab_object_id)
                        {
                            if !state.registry.contains(&world.object_id(&sub_object)) {
                                object = Some(sub_object);
                                prefab_instance = Some(child);
                                break;
                            }
                        }
                    }
                }
            }
            let instance = match prefab_instance {
                Some(instance) => instance,
                None => match world.spawn_prefab(&msg.prefab_id) {
                    Ok(root) => {
                        fresh_instance = true;
                        root
                    }
                    Err(err) => {
                        error!("{}", err);
                        return Ok(());
                    }
                },
            };
            if object.is_none() {
                match world.find_prefab_object(&instance, &msg.prefab_object_id) {
                    Some(sub_object) => object = Some(sub_object),
                    None => {
                        error!(
                            "failed to find object {} in prefab {}",
                            msg.prefab_object_id, msg.prefab_id
                        );
                        if fresh_instance {
                            world.destroy_object(&instance);
                        }
                        return Ok(());
                    }
                }
            }
        } else {
            let Some(kind) = world.find_type(msg.type_name.as_str()) else {
                error!("failed to spawn object of type {}", msg.type_name.as_str());
                return Ok(());
            };
            match world.new_object(&kind) {
                Some(new_object) => object = Some(new_object),
                None => {
                    error!("failed to spawn object of type {}", msg.type_name.as_str());
                    return Ok(());
                }
            }
        }
        let Some(object) = object else {
            return Ok(());
        };

        let object_id = world.object_id(&object);
        let parent_record_id = parent_key
            .and_then(|key| state.registry.get(&key))
            .map(|record| record.object_id)
            .unwrap_or(NetId::ZERO);
        let has_hooks = world
            .object_mut(&object)
            .map(|instance| instance.hooks().is_some())
            .unwrap_or(false);
        let mut role = NetworkObjectRole::Replicated;
        if msg.owner_client_id == self.local_client_id {
            // The server spawned an object this peer should own.
            role = NetworkObjectRole::OwnedAuthoritative;
        }
        info!("add new object {} (parent {})", object_id, parent_record_id);
        state.registry.insert(ReplicatedObject {
            object,
            object_id,
            parent_id: parent_record_id,
            owner_client_id: msg.owner_client_id,
            last_owner_frame: 0,
            role,
            spawned: true,
            missing_serializer_warned: false,
            target_client_ids: Vec::new(),
            has_hooks,
        });
        info!("remap object {} into local object {}", msg.object_id, object_id);
        state.registry.insert_remap(msg.object_id, object_id);

        // Scene parenting for objects that live in the scene graph.
        if let Some(parent) = parent_object {
            world.set_scene_parent(&object, &parent);
        } else if let Some(parent) = world.find_object(&lookup_parent) {
            world.set_scene_parent(&object, &parent);
        }

        if has_hooks {
            invoke_hook(world, &object, |hooks| hooks.on_network_spawn());
        }
        Ok(())
    }

    fn on_object_despawn<W: ObjectWorldMut<O>>(
        &self,
        state: &mut ReplicatorState<O>,
        sender: Option<ClientId>,
        data: &[u8],
        world: &mut W,
    ) -> Result<(), SerdeErr> {
        state.read_stream.initialize_read(data);
        let msg = ObjectDespawnMessage::de(&mut state.read_stream)?;
        let Some(key) = state.registry.resolve_id(&msg.object_id) else {
            error!("failed to despawn object {}", msg.object_id);
            return Ok(());
        };
        let Some(item) = state.registry.get(&key) else {
            return Ok(());
        };
        if !world.object_alive(&item.object) || !item.spawned {
            return Ok(());
        }
        if let Some(sender) = sender {
            if item.owner_client_id != sender {
                if self.log_drops {
                    warn!("despawn for object {} from non-owner client {}", key, sender);
                }
                return Ok(());
            }
        }
        let object = item.object;
        let has_hooks = item.has_hooks;
        info!("despawn object {}", key);
        if has_hooks {
            invoke_hook(world, &object, |hooks| hooks.on_network_despawn());
        }
        state.registry.remove(&key);
        destroy_net_object(world, &object);
        Ok(())
    }

    fn on_object_role<W: ObjectWorldMut<O>, P: MessagePeer>(
        &self,
        state: &mut ReplicatorState<O>,
        sender: Option<ClientId>,
        data: &[u8],
        world: &mut W,
        peer: &mut P,
    ) -> Result<(), SerdeErr> {
        state.read_stream.initialize_read(data);
        let msg = ObjectRoleMessage::de(&mut state.read_stream)?;
        let Some(key) = state.registry.resolve_id(&msg.object_id) else {
            error!("role update for unknown object {}", msg.object_id);
            return Ok(());
        };
        {
            let Some(item) = state.registry.get_mut(&key) else {
                return Ok(());
            };
            if !world.object_alive(&item.object) {
                return Ok(());
            }
            if let Some(sender) = sender {
                if item.owner_client_id != sender {
                    if self.log_drops {
                        warn!(
                            "role update for object {} from non-owner client {}",
                            key, sender
                        );
                    }
                    return Ok(());
                }
            }
            item.owner_client_id = msg.owner_client_id;
            item.last_owner_frame = 1;
            if item.owner_client_id == self.local_client_id {
                // This peer was handed ownership.
                item.role = NetworkObjectRole::OwnedAuthoritative;
                item.last_owner_frame = 0;
            } else if item.role == NetworkObjectRole::OwnedAuthoritative {
                item.role = NetworkObjectRole::Replicated;
            }
        }
        if self.host_type.is_server() {
            // Broadcast the change to everyone but the originating client.
            let ReplicatorState {
                connected_clients,
                cached_targets,
                message_stream,
                ..
            } = state;
            let excluded = sender.unwrap_or(SERVER_CLIENT_ID);
            build_targets(connected_clients, &[], excluded, cached_targets);
            send_object_role(
                self.host_type,
                peer,
                message_stream,
                cached_targets,
                key,
                msg.owner_client_id,
            );
        }
        Ok(())
    }
}
