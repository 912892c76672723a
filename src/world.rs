use std::any::TypeId;
use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

use crate::object::NetObject;
use crate::types::{NetId, PrefabId};

/// Handle to an object type in the engine's type system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeKind(TypeId);

impl TypeKind {
    pub fn of<T: 'static>() -> Self {
        TypeKind(TypeId::of::<T>())
    }
}

impl From<TypeId> for TypeKind {
    fn from(type_id: TypeId) -> Self {
        TypeKind(type_id)
    }
}

/// Errors that can occur when materializing a prefab instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefabSpawnError {
    /// The prefab asset could not be located or loaded
    #[error("failed to find prefab {prefab_id}")]
    MissingPrefab { prefab_id: PrefabId },

    /// The prefab loaded but instantiation produced no root object
    #[error("failed to spawn prefab {prefab_id}")]
    SpawnFailed { prefab_id: PrefabId },
}

/// Read access to the engine's type metadata.
///
/// Kept separate from [`ObjectWorldMut`] so the serializer registry can
/// resolve fallbacks without touching object state.
pub trait TypeLookup {
    /// Looks a type up by its full name, as carried on the wire.
    fn find_type(&self, name: &str) -> Option<TypeKind>;

    /// The full name of a type.
    fn type_name(&self, kind: &TypeKind) -> Option<&str>;

    /// The direct base of a type, if any.
    fn base_type(&self, kind: &TypeKind) -> Option<TypeKind>;

    /// Whether the type advertises the [`NetSerializable`] capability.
    ///
    /// Must agree with what `NetObject::as_serializable` returns on instances
    /// of the type.
    ///
    /// [`NetSerializable`]: crate::object::NetSerializable
    fn implements_serializable(&self, kind: &TypeKind) -> bool;
}

/// The object-system, scene-graph and prefab collaborator.
///
/// The replication core never stores a world; every entry point that needs
/// engine access takes one by parameter. Objects are addressed by opaque
/// handles `O` which act as weak back-references: a handle may outlive its
/// object, and `object_alive` is the liveness check. The id, type and scene
/// accessors may only be called for handles that are currently alive.
pub trait ObjectWorldMut<O: Copy + Eq + Hash>: TypeLookup {
    // Lookup and liveness.
    fn object_alive(&self, object: &O) -> bool;
    fn object_id(&self, object: &O) -> NetId;
    fn object_type(&self, object: &O) -> TypeKind;
    fn find_object(&self, id: &NetId) -> Option<O>;
    fn object_mut(&mut self, object: &O) -> Option<&mut dyn NetObject>;

    // Construction and destruction. `new_object` registers the new instance
    // with the object system before returning it.
    fn new_object(&mut self, kind: &TypeKind) -> Option<O>;
    fn destroy_object(&mut self, object: &O);

    // Scene graph.
    fn scene_parent(&self, object: &O) -> Option<O>;
    /// Reparents a scene object. No-op for objects outside the scene graph
    /// or parents that cannot hold children.
    fn set_scene_parent(&mut self, object: &O, parent: &O);
    fn scene_children(&self, object: &O) -> Vec<O>;
    /// The actor a script component is attached to, when `object` is one.
    fn script_parent(&self, object: &O) -> Option<O>;

    // Prefabs.
    /// The `(prefab, prefab object)` pair an instance was created from.
    fn prefab_link(&self, object: &O) -> Option<(PrefabId, NetId)>;
    /// Loads the prefab and spawns a fresh instance, returning its root.
    fn spawn_prefab(&mut self, prefab_id: &PrefabId) -> Result<O, PrefabSpawnError>;
    /// Finds the sub-object with the given prefab object id within an
    /// instance, searching the root, its scripts and its children.
    fn find_prefab_object(&self, root: &O, prefab_object_id: &NetId) -> Option<O>;

    /// Publishes (or clears) the remote-to-local id mapping consulted by
    /// object lookups during message dispatch, so user deserializers resolve
    /// remote object references to local records. Implementations should
    /// install a snapshot; the reference is only valid for the call.
    fn set_id_remapping(&mut self, mapping: Option<&HashMap<NetId, NetId>>);
}
