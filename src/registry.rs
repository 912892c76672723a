use std::collections::HashMap;
use std::hash::Hash;

use log::info;

use crate::types::{ClientId, Frame, NetId, NetworkObjectRole, HostType, SERVER_CLIENT_ID};
use crate::world::ObjectWorldMut;

/// Per-object replication record.
///
/// `object` is a weak back-reference: the underlying instance may be
/// destroyed out-of-band, in which case the record is purged lazily during
/// the next replication pass.
pub struct ReplicatedObject<O> {
    pub object: O,
    pub object_id: NetId,
    pub parent_id: NetId,
    pub owner_client_id: ClientId,
    /// Highest frame counter observed from the owner; monotonic across
    /// accepted updates.
    pub last_owner_frame: Frame,
    pub role: NetworkObjectRole,
    pub spawned: bool,
    pub missing_serializer_warned: bool,
    /// Explicit replication set; empty means broadcast to all connected.
    pub target_client_ids: Vec<ClientId>,
    pub has_hooks: bool,
}

/// Mapping between remote canonical ids and local record ids.
///
/// Entries are written once and never rewritten; identity is stable for the
/// lifetime of the session. The reverse direction serves outbound id
/// canonicalization on clients.
pub struct RemapTable {
    remote_to_local: HashMap<NetId, NetId>,
    local_to_remote: HashMap<NetId, NetId>,
}

impl RemapTable {
    pub fn new() -> Self {
        Self {
            remote_to_local: HashMap::new(),
            local_to_remote: HashMap::new(),
        }
    }

    /// Records `remote -> local`. Ignored when the remote id already has an
    /// alias.
    pub fn insert(&mut self, remote: NetId, local: NetId) {
        if self.remote_to_local.contains_key(&remote) {
            return;
        }
        self.remote_to_local.insert(remote, local);
        self.local_to_remote.insert(local, remote);
    }

    /// Translates a remote id to its local alias.
    pub fn resolve(&self, id: &NetId) -> Option<NetId> {
        self.remote_to_local.get(id).copied()
    }

    /// Translates a local id back to the canonical remote form, falling back
    /// to the id itself when no alias exists.
    pub fn canonical(&self, id: &NetId) -> NetId {
        self.local_to_remote.get(id).copied().unwrap_or(*id)
    }

    pub fn forward(&self) -> &HashMap<NetId, NetId> {
        &self.remote_to_local
    }

    pub fn is_empty(&self) -> bool {
        self.remote_to_local.is_empty()
    }

    pub fn clear(&mut self) {
        self.remote_to_local.clear();
        self.local_to_remote.clear();
    }
}

impl Default for RemapTable {
    fn default() -> Self {
        Self::new()
    }
}

/// All replicated-object records known to the local peer, keyed by object id.
pub struct ObjectRegistry<O> {
    objects: HashMap<NetId, ReplicatedObject<O>>,
    remap: RemapTable,
}

impl<O: Copy + Eq + Hash> ObjectRegistry<O> {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            remap: RemapTable::new(),
        }
    }

    pub fn get(&self, id: &NetId) -> Option<&ReplicatedObject<O>> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &NetId) -> Option<&mut ReplicatedObject<O>> {
        self.objects.get_mut(id)
    }

    pub fn insert(&mut self, record: ReplicatedObject<O>) {
        self.objects.insert(record.object_id, record);
    }

    pub fn remove(&mut self, id: &NetId) -> Option<ReplicatedObject<O>> {
        self.objects.remove(id)
    }

    pub fn contains(&self, id: &NetId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Snapshot of all record ids, for iteration that may remove records.
    pub fn ids(&self) -> Vec<NetId> {
        self.objects.keys().copied().collect()
    }

    /// Ids of all records whose replication parent is `parent_id`.
    pub fn children_of(&self, parent_id: &NetId) -> Vec<NetId> {
        self.objects
            .values()
            .filter(|record| record.parent_id == *parent_id)
            .map(|record| record.object_id)
            .collect()
    }

    /// Resolves an id to the registry key of its record: a direct hit, or one
    /// translation through the remap table.
    pub fn resolve_id(&self, id: &NetId) -> Option<NetId> {
        if self.objects.contains_key(id) {
            return Some(*id);
        }
        self.remap
            .resolve(id)
            .filter(|local| self.objects.contains_key(local))
    }

    /// Resolves an id, reconciling identity on a miss.
    ///
    /// When both peers created the same logical object independently, the
    /// remote id is unknown here, but a local record with the same parent and
    /// type that has never accepted a remote update is the same object. The
    /// first match cements `id` as the canonical alias of the local record.
    pub fn resolve_id_reconciling<W: ObjectWorldMut<O>>(
        &mut self,
        world: &W,
        id: &NetId,
        parent_id: &NetId,
        type_name: &str,
    ) -> Option<NetId> {
        if let Some(key) = self.resolve_id(id) {
            return Some(key);
        }

        let parent_id = self.remap.resolve(parent_id).unwrap_or(*parent_id);
        let kind = world.find_type(type_name)?;
        let matched = self.objects.values().find(|record| {
            record.last_owner_frame == 0
                && record.parent_id == parent_id
                && world.object_alive(&record.object)
                && world.object_type(&record.object) == kind
        })?;
        let local = matched.object_id;
        info!("remap object {} into local object {}", id, local);
        self.remap.insert(*id, local);
        Some(local)
    }

    /// Registers an object for replication. No-op if a record already exists.
    ///
    /// The parent is discovered from scene linkage when not given. New
    /// records default to server ownership; the local role follows the host
    /// type.
    pub fn add_object<W: ObjectWorldMut<O>>(
        &mut self,
        world: &mut W,
        host_type: HostType,
        object: O,
        parent: Option<O>,
    ) {
        if !world.object_alive(&object) {
            return;
        }
        let object_id = world.object_id(&object);
        if self.objects.contains_key(&object_id) {
            return;
        }

        let parent = parent.or_else(|| world.scene_parent(&object));
        let parent_id = parent
            .map(|parent| world.object_id(&parent))
            .unwrap_or(NetId::ZERO);
        let has_hooks = world
            .object_mut(&object)
            .map(|instance| instance.hooks().is_some())
            .unwrap_or(false);
        let role = match host_type {
            HostType::Server => NetworkObjectRole::OwnedAuthoritative,
            HostType::Client => NetworkObjectRole::Replicated,
        };

        info!("add new object {} (parent {})", object_id, parent_id);
        self.insert(ReplicatedObject {
            object,
            object_id,
            parent_id,
            owner_client_id: SERVER_CLIENT_ID,
            last_owner_frame: 0,
            role,
            spawned: false,
            missing_serializer_warned: false,
            target_client_ids: Vec::new(),
            has_hooks,
        });
    }

    pub fn canonical_id(&self, id: &NetId) -> NetId {
        self.remap.canonical(id)
    }

    pub fn resolve_remote_id(&self, id: &NetId) -> NetId {
        self.remap.resolve(id).unwrap_or(*id)
    }

    pub fn insert_remap(&mut self, remote: NetId, local: NetId) {
        self.remap.insert(remote, local);
    }

    pub fn remap_forward(&self) -> &HashMap<NetId, NetId> {
        self.remap.forward()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.remap.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplicatedObject<O>> {
        self.objects.values()
    }
}

impl<O: Copy + Eq + Hash> Default for ObjectRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}
