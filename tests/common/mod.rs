//! In-memory object world and transport used by the integration tests.
#![allow(dead_code)]

use std::any::Any;
use std::collections::HashMap;

use netreplica::{
    ChannelKind, ClientId, MessagePeer, NetId, NetObject, NetObjectHooks, NetworkReplicator,
    NetworkStream, ObjectWorldMut, PrefabId, PrefabSpawnError, ReplicatorConfig, SerializerTag,
    TypeKind, TypeLookup, WireSerde,
};

/// Opaque object handle handed to the replicator.
pub type Handle = u32;

pub struct TypeInfo {
    pub name: String,
    pub base: Option<TypeKind>,
    pub serializable: bool,
    pub constructor: Option<fn() -> Box<dyn NetObject>>,
}

pub struct TestObject {
    pub net_id: NetId,
    pub kind: TypeKind,
    pub scene_parent: Option<Handle>,
    pub script_parent: Option<Handle>,
    pub prefab: Option<(PrefabId, NetId)>,
    pub alive: bool,
    pub instance: Box<dyn NetObject>,
}

pub struct PrefabPart {
    pub kind: TypeKind,
    pub prefab_object_id: NetId,
}

pub struct PrefabTemplate {
    pub root_kind: TypeKind,
    pub root_prefab_object_id: NetId,
    pub scripts: Vec<PrefabPart>,
}

/// A scriptable stand-in for the engine's object system, scene graph and
/// prefab manager.
pub struct TestWorld {
    pub objects: HashMap<Handle, TestObject>,
    id_to_handle: HashMap<NetId, Handle>,
    next_handle: Handle,
    next_net_id: u128,
    types: HashMap<TypeKind, TypeInfo>,
    names: HashMap<String, TypeKind>,
    prefabs: HashMap<PrefabId, PrefabTemplate>,
    pub published_mapping: Option<HashMap<NetId, NetId>>,
    pub prefab_spawn_count: usize,
}

impl TestWorld {
    /// `net_id_base` keeps object ids distinct across peers.
    pub fn new(net_id_base: u128) -> Self {
        Self {
            objects: HashMap::new(),
            id_to_handle: HashMap::new(),
            next_handle: 1,
            next_net_id: net_id_base + 1,
            types: HashMap::new(),
            names: HashMap::new(),
            prefabs: HashMap::new(),
            published_mapping: None,
            prefab_spawn_count: 0,
        }
    }

    pub fn register_type<T: 'static>(
        &mut self,
        name: &str,
        constructor: Option<fn() -> Box<dyn NetObject>>,
    ) -> TypeKind {
        let kind = TypeKind::of::<T>();
        self.types.insert(
            kind,
            TypeInfo {
                name: name.to_string(),
                base: None,
                serializable: false,
                constructor,
            },
        );
        self.names.insert(name.to_string(), kind);
        kind
    }

    pub fn register_prefab(&mut self, prefab_id: PrefabId, template: PrefabTemplate) {
        self.prefabs.insert(prefab_id, template);
    }

    fn allocate_net_id(&mut self) -> NetId {
        let id = NetId::new(self.next_net_id);
        self.next_net_id += 1;
        id
    }

    pub fn insert_object(
        &mut self,
        kind: TypeKind,
        instance: Box<dyn NetObject>,
        scene_parent: Option<Handle>,
    ) -> Handle {
        let net_id = self.allocate_net_id();
        self.insert_with_id(kind, instance, scene_parent, net_id)
    }

    pub fn insert_with_id(
        &mut self,
        kind: TypeKind,
        instance: Box<dyn NetObject>,
        scene_parent: Option<Handle>,
        net_id: NetId,
    ) -> Handle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.objects.insert(
            handle,
            TestObject {
                net_id,
                kind,
                scene_parent,
                script_parent: None,
                prefab: None,
                alive: true,
                instance,
            },
        );
        self.id_to_handle.insert(net_id, handle);
        handle
    }

    /// Inserts a script component attached to `actor`.
    pub fn insert_script(
        &mut self,
        kind: TypeKind,
        instance: Box<dyn NetObject>,
        actor: Handle,
    ) -> Handle {
        let handle = self.insert_object(kind, instance, Some(actor));
        self.objects.get_mut(&handle).unwrap().script_parent = Some(actor);
        handle
    }

    pub fn set_prefab_link(&mut self, handle: Handle, prefab_id: PrefabId, prefab_object_id: NetId) {
        self.objects.get_mut(&handle).unwrap().prefab = Some((prefab_id, prefab_object_id));
    }

    pub fn net_id(&self, handle: Handle) -> NetId {
        self.objects[&handle].net_id
    }

    pub fn is_alive(&self, handle: Handle) -> bool {
        self.objects.get(&handle).map(|o| o.alive).unwrap_or(false)
    }

    pub fn actor<T: 'static>(&self, handle: Handle) -> &T {
        self.objects[&handle]
            .instance
            .as_any()
            .downcast_ref::<T>()
            .unwrap()
    }

    pub fn actor_mut<T: 'static>(&mut self, handle: Handle) -> &mut T {
        self.objects
            .get_mut(&handle)
            .unwrap()
            .instance
            .as_any_mut()
            .downcast_mut::<T>()
            .unwrap()
    }

    fn destroy_recursive(&mut self, handle: Handle) {
        let children: Vec<Handle> = self
            .objects
            .iter()
            .filter(|(_, object)| {
                object.alive
                    && (object.scene_parent == Some(handle) || object.script_parent == Some(handle))
            })
            .map(|(child, _)| *child)
            .collect();
        for child in children {
            self.destroy_recursive(child);
        }
        if let Some(object) = self.objects.get_mut(&handle) {
            object.alive = false;
        }
    }

    fn search_prefab_object(&self, root: Handle, prefab_object_id: &NetId) -> Option<Handle> {
        let object = self.objects.get(&root)?;
        if !object.alive {
            return None;
        }
        if let Some((_, poid)) = object.prefab {
            if poid == *prefab_object_id {
                return Some(root);
            }
        }
        let children: Vec<Handle> = self
            .objects
            .iter()
            .filter(|(_, child)| {
                child.alive
                    && (child.scene_parent == Some(root) || child.script_parent == Some(root))
            })
            .map(|(child, _)| *child)
            .collect();
        for child in children {
            if let Some(found) = self.search_prefab_object(child, prefab_object_id) {
                return Some(found);
            }
        }
        None
    }
}

impl TypeLookup for TestWorld {
    fn find_type(&self, name: &str) -> Option<TypeKind> {
        self.names.get(name).copied()
    }

    fn type_name(&self, kind: &TypeKind) -> Option<&str> {
        self.types.get(kind).map(|info| info.name.as_str())
    }

    fn base_type(&self, kind: &TypeKind) -> Option<TypeKind> {
        self.types.get(kind).and_then(|info| info.base)
    }

    fn implements_serializable(&self, kind: &TypeKind) -> bool {
        self.types
            .get(kind)
            .map(|info| info.serializable)
            .unwrap_or(false)
    }
}

impl ObjectWorldMut<Handle> for TestWorld {
    fn object_alive(&self, object: &Handle) -> bool {
        self.is_alive(*object)
    }

    fn object_id(&self, object: &Handle) -> NetId {
        self.objects[object].net_id
    }

    fn object_type(&self, object: &Handle) -> TypeKind {
        self.objects[object].kind
    }

    fn find_object(&self, id: &NetId) -> Option<Handle> {
        let direct = self.id_to_handle.get(id).copied();
        let handle = direct.or_else(|| {
            let mapping = self.published_mapping.as_ref()?;
            let local = mapping.get(id)?;
            self.id_to_handle.get(local).copied()
        })?;
        self.is_alive(handle).then_some(handle)
    }

    fn object_mut(&mut self, object: &Handle) -> Option<&mut dyn NetObject> {
        let entry = self.objects.get_mut(object)?;
        if !entry.alive {
            return None;
        }
        Some(entry.instance.as_mut())
    }

    fn new_object(&mut self, kind: &TypeKind) -> Option<Handle> {
        let constructor = self.types.get(kind)?.constructor?;
        Some(self.insert_object(*kind, constructor(), None))
    }

    fn destroy_object(&mut self, object: &Handle) {
        self.destroy_recursive(*object);
    }

    fn scene_parent(&self, object: &Handle) -> Option<Handle> {
        self.objects.get(object)?.scene_parent
    }

    fn set_scene_parent(&mut self, object: &Handle, parent: &Handle) {
        if let Some(entry) = self.objects.get_mut(object) {
            entry.scene_parent = Some(*parent);
        }
    }

    fn scene_children(&self, object: &Handle) -> Vec<Handle> {
        self.objects
            .iter()
            .filter(|(_, child)| child.alive && child.scene_parent == Some(*object))
            .map(|(child, _)| *child)
            .collect()
    }

    fn script_parent(&self, object: &Handle) -> Option<Handle> {
        self.objects.get(object)?.script_parent
    }

    fn prefab_link(&self, object: &Handle) -> Option<(PrefabId, NetId)> {
        self.objects.get(object)?.prefab
    }

    fn spawn_prefab(&mut self, prefab_id: &PrefabId) -> Result<Handle, PrefabSpawnError> {
        let template = self
            .prefabs
            .get(prefab_id)
            .ok_or(PrefabSpawnError::MissingPrefab {
                prefab_id: *prefab_id,
            })?;
        let root_kind = template.root_kind;
        let root_poid = template.root_prefab_object_id;
        let scripts: Vec<(TypeKind, NetId)> = template
            .scripts
            .iter()
            .map(|part| (part.kind, part.prefab_object_id))
            .collect();

        let root_constructor =
            self.types
                .get(&root_kind)
                .and_then(|info| info.constructor)
                .ok_or(PrefabSpawnError::SpawnFailed {
                    prefab_id: *prefab_id,
                })?;
        let root = self.insert_object(root_kind, root_constructor(), None);
        self.set_prefab_link(root, *prefab_id, root_poid);
        for (kind, poid) in scripts {
            let constructor = self.types.get(&kind).and_then(|info| info.constructor);
            if let Some(constructor) = constructor {
                let script = self.insert_script(kind, constructor(), root);
                self.set_prefab_link(script, *prefab_id, poid);
            }
        }
        self.prefab_spawn_count += 1;
        Ok(root)
    }

    fn find_prefab_object(&self, root: &Handle, prefab_object_id: &NetId) -> Option<Handle> {
        self.search_prefab_object(*root, prefab_object_id)
    }

    fn set_id_remapping(&mut self, mapping: Option<&HashMap<NetId, NetId>>) {
        self.published_mapping = mapping.cloned();
    }
}

/// A test game object with one replicated field and hook counters.
#[derive(Default)]
pub struct TestActor {
    pub x: u32,
    pub spawn_hooks: u32,
    pub despawn_hooks: u32,
    pub serialize_hooks: u32,
    pub deserialize_hooks: u32,
}

impl NetObjectHooks for TestActor {
    fn on_network_spawn(&mut self) {
        self.spawn_hooks += 1;
    }
    fn on_network_despawn(&mut self) {
        self.despawn_hooks += 1;
    }
    fn on_network_serialize(&mut self) {
        self.serialize_hooks += 1;
    }
    fn on_network_deserialize(&mut self) {
        self.deserialize_hooks += 1;
    }
}

impl NetObject for TestActor {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn hooks(&mut self) -> Option<&mut dyn NetObjectHooks> {
        Some(self)
    }
}

pub fn new_test_actor() -> Box<dyn NetObject> {
    Box::new(TestActor::default())
}

pub fn serialize_test_actor(
    instance: &mut dyn NetObject,
    stream: &mut NetworkStream,
    _tag: SerializerTag,
) {
    let actor = instance.as_any_mut().downcast_mut::<TestActor>().unwrap();
    actor.x.ser(stream);
}

pub fn deserialize_test_actor(
    instance: &mut dyn NetObject,
    stream: &mut NetworkStream,
    _tag: SerializerTag,
) {
    let actor = instance.as_any_mut().downcast_mut::<TestActor>().unwrap();
    actor.x = u32::de(stream).unwrap();
}

#[derive(Clone, Debug)]
pub struct SentMessage {
    pub channel: ChannelKind,
    pub targets: Vec<ClientId>,
    pub payload: Vec<u8>,
}

/// Captures outbound messages for inspection and redelivery.
#[derive(Default)]
pub struct TestPeer {
    pub sent: Vec<SentMessage>,
}

impl TestPeer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<SentMessage> {
        std::mem::take(&mut self.sent)
    }

    pub fn sent_of_kind(&self, message_id: u8) -> Vec<&SentMessage> {
        self.sent
            .iter()
            .filter(|message| message.payload.first() == Some(&message_id))
            .collect()
    }
}

impl MessagePeer for TestPeer {
    fn send(&mut self, channel: ChannelKind, targets: &[ClientId], payload: &[u8]) {
        self.sent.push(SentMessage {
            channel,
            targets: targets.to_vec(),
            payload: payload.to_vec(),
        });
    }
}

/// One peer of a simulated session.
pub struct Endpoint {
    pub world: TestWorld,
    pub peer: TestPeer,
    pub replicator: NetworkReplicator<Handle>,
}

impl Endpoint {
    pub fn server() -> Self {
        let mut world = TestWorld::new(0x1000);
        register_standard_types(&mut world);
        Self {
            world,
            peer: TestPeer::new(),
            replicator: NetworkReplicator::server(ReplicatorConfig::default()),
        }
    }

    pub fn client(client_id: ClientId) -> Self {
        let mut world = TestWorld::new(0x9000 * client_id as u128);
        register_standard_types(&mut world);
        Self {
            world,
            peer: TestPeer::new(),
            replicator: NetworkReplicator::client(client_id, ReplicatorConfig::default()),
        }
    }

    pub fn register_actor_serializer(&self) {
        self.replicator.add_serializer(
            TypeKind::of::<TestActor>(),
            serialize_test_actor,
            deserialize_test_actor,
            0,
            0,
        );
    }

    /// Creates a plain actor object in the world without registering it.
    pub fn new_actor(&mut self, scene_parent: Option<Handle>) -> Handle {
        self.world
            .insert_object(TypeKind::of::<TestActor>(), new_test_actor(), scene_parent)
    }

    pub fn update(&mut self, frame: u32) {
        self.replicator
            .update(frame, &mut self.world, &mut self.peer);
    }
}

pub fn register_standard_types(world: &mut TestWorld) {
    world.register_type::<TestActor>("game::TestActor", Some(new_test_actor));
}

/// Delivers every captured message from `from` into `to`, as `sender`.
pub fn deliver(from: &mut Endpoint, to: &mut Endpoint, sender: Option<ClientId>) {
    let messages = from.peer.drain();
    to.replicator.pre_update(&mut to.world);
    for message in messages {
        to.replicator
            .process_message(sender, &message.payload, &mut to.world, &mut to.peer)
            .unwrap();
    }
}

/// Delivers the server's captured traffic addressed to this client. Messages
/// that also address other clients stay queued for later delivery to them.
pub fn deliver_to_client(server: &mut Endpoint, client: &mut Endpoint) {
    let client_id = client.replicator.local_client_id();
    let messages = server.peer.drain();
    let mut remaining = Vec::new();
    client.replicator.pre_update(&mut client.world);
    for message in messages {
        if message.targets.contains(&client_id) {
            client
                .replicator
                .process_message(None, &message.payload, &mut client.world, &mut client.peer)
                .unwrap();
        }
        if message.targets.iter().any(|target| *target != client_id) {
            remaining.push(message);
        }
    }
    server.peer.sent = remaining;
}

/// Delivers the client's captured traffic to the server.
pub fn deliver_to_server(client: &mut Endpoint, server: &mut Endpoint) {
    let sender = Some(client.replicator.local_client_id());
    let messages = client.peer.drain();
    server.replicator.pre_update(&mut server.world);
    for message in messages {
        server
            .replicator
            .process_message(sender, &message.payload, &mut server.world, &mut server.peer)
            .unwrap();
    }
}
