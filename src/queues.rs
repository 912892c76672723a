use std::hash::Hash;

use crate::types::{ClientId, NetId, NetworkObjectRole, SERVER_CLIENT_ID};
use crate::world::ObjectWorldMut;

/// A spawn request batched for the next replication pass.
pub struct SpawnIntent<O> {
    pub object: O,
    /// Explicit replication targets; empty means broadcast.
    pub targets: Vec<ClientId>,
    pub has_ownership: bool,
    pub hierarchical: bool,
    pub owner_client_id: ClientId,
    pub role: NetworkObjectRole,
}

/// Spawn and despawn intents produced during a frame, drained by the
/// replication pass before any state traffic is sent.
pub struct ReplicationQueues<O> {
    pub spawns: Vec<SpawnIntent<O>>,
    pub despawns: Vec<NetId>,
}

impl<O: Copy + Eq + Hash> ReplicationQueues<O> {
    pub fn new() -> Self {
        Self {
            spawns: Vec::new(),
            despawns: Vec::new(),
        }
    }

    /// Queues a spawn. Dropped when an intent for the object is already
    /// pending.
    pub fn enqueue_spawn(&mut self, object: O, targets: Vec<ClientId>) {
        if self.spawns.iter().any(|intent| intent.object == object) {
            return;
        }
        self.spawns.push(SpawnIntent {
            object,
            targets,
            has_ownership: false,
            hierarchical: false,
            owner_client_id: SERVER_CLIENT_ID,
            role: NetworkObjectRole::None,
        });
    }

    /// Drops any pending spawn intent for the object.
    pub fn remove_spawn(&mut self, object: &O) {
        if let Some(index) = self
            .spawns
            .iter()
            .position(|intent| intent.object == *object)
        {
            self.spawns.remove(index);
        }
    }

    pub fn enqueue_despawn(&mut self, id: NetId) {
        debug_assert!(!self.despawns.contains(&id));
        self.despawns.push(id);
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.despawns.is_empty()
    }

    pub fn clear(&mut self) {
        self.spawns.clear();
        self.despawns.clear();
    }
}

impl<O: Copy + Eq + Hash> Default for ReplicationQueues<O> {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `object` sits below `ancestor` in the scene graph.
///
/// Walks scene back-references rather than replication parent ids, since
/// queued children may not exist in the registry yet.
pub fn is_scene_descendant<O, W>(world: &W, object: &O, ancestor: &O) -> bool
where
    O: Copy + Eq + Hash,
    W: ObjectWorldMut<O>,
{
    let mut current = world.scene_parent(object);
    while let Some(parent) = current {
        if parent == *ancestor {
            return true;
        }
        current = world.scene_parent(&parent);
    }
    false
}

/// Hierarchical ownership pre-pass over the spawn queue.
///
/// Every intent whose object is a transitive scene-child of a hierarchical
/// ownership-carrying intent, and which has no override of its own, inherits
/// that intent's owner and role.
pub fn propagate_spawn_ownership<O, W>(world: &W, spawns: &mut [SpawnIntent<O>])
where
    O: Copy + Eq + Hash,
    W: ObjectWorldMut<O>,
{
    for index in 0..spawns.len() {
        let source = &spawns[index];
        if !source.has_ownership || !source.hierarchical {
            continue;
        }
        let ancestor = source.object;
        let owner_client_id = source.owner_client_id;
        let role = source.role;
        for intent in spawns.iter_mut() {
            if !intent.has_ownership && is_scene_descendant(world, &intent.object, &ancestor) {
                intent.has_ownership = true;
                intent.owner_client_id = owner_client_id;
                intent.role = role;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_spawn_intents_are_dropped() {
        let mut queues: ReplicationQueues<u32> = ReplicationQueues::new();
        queues.enqueue_spawn(1, Vec::new());
        queues.enqueue_spawn(1, vec![7]);
        assert_eq!(queues.spawns.len(), 1);
        assert!(queues.spawns[0].targets.is_empty());
    }

    #[test]
    fn remove_spawn_drops_only_the_matching_intent() {
        let mut queues: ReplicationQueues<u32> = ReplicationQueues::new();
        queues.enqueue_spawn(1, Vec::new());
        queues.enqueue_spawn(2, Vec::new());
        queues.remove_spawn(&1);
        assert_eq!(queues.spawns.len(), 1);
        assert_eq!(queues.spawns[0].object, 2);
    }
}
