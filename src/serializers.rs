use std::collections::HashMap;

use thiserror::Error;

use crate::object::NetObject;
use crate::stream::NetworkStream;
use crate::world::{TypeKind, TypeLookup};

/// Opaque per-slot dispatch tag, forwarded verbatim to the callback.
///
/// Registered serializers are free to use it however they like; typically a
/// foreign function pointer or a binding-side dispatch index. The same
/// two-function-two-tag entry layout therefore dispatches native callbacks,
/// capability methods and foreign trampolines without branching at the call
/// site.
pub type SerializerTag = usize;

/// A serialization callback: `(instance, stream, tag)`.
pub type SerializeFn = fn(&mut dyn NetObject, &mut NetworkStream, SerializerTag);

/// Direction of a serializer invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerdeOp {
    Serialize,
    Deserialize,
}

impl SerdeOp {
    fn index(self) -> usize {
        match self {
            SerdeOp::Serialize => 0,
            SerdeOp::Deserialize => 1,
        }
    }
}

/// Errors that can occur while resolving a serializer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializerError {
    /// No serializer is registered for the type or any of its bases
    #[error("no serializer registered for type {type_name}")]
    Missing { type_name: String },
}

/// A resolved (serialize, deserialize) callback pair.
#[derive(Clone, Copy)]
pub struct SerializerEntry {
    methods: [SerializeFn; 2],
    tags: [SerializerTag; 2],
}

impl SerializerEntry {
    pub fn call(&self, op: SerdeOp, instance: &mut dyn NetObject, stream: &mut NetworkStream) {
        let idx = op.index();
        (self.methods[idx])(instance, stream, self.tags[idx]);
    }
}

fn capability_serialize(instance: &mut dyn NetObject, stream: &mut NetworkStream, _tag: SerializerTag) {
    if let Some(serializable) = instance.as_serializable() {
        serializable.serialize(stream);
    }
}

fn capability_deserialize(instance: &mut dyn NetObject, stream: &mut NetworkStream, _tag: SerializerTag) {
    if let Some(serializable) = instance.as_serializable() {
        serializable.deserialize(stream);
    }
}

/// Maps object types to their serialization callbacks.
///
/// Resolution order: a directly registered entry, then the type's
/// [`NetSerializable`] capability (a synthesized entry, cached for future
/// lookups), then the base type, recursively.
///
/// [`NetSerializable`]: crate::object::NetSerializable
pub struct SerializerRegistry {
    table: HashMap<TypeKind, SerializerEntry>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Registers a (serialize, deserialize) pair for a type, replacing any
    /// previous registration.
    pub fn add_serializer(
        &mut self,
        kind: TypeKind,
        serialize: SerializeFn,
        deserialize: SerializeFn,
        serialize_tag: SerializerTag,
        deserialize_tag: SerializerTag,
    ) {
        self.table.insert(
            kind,
            SerializerEntry {
                methods: [serialize, deserialize],
                tags: [serialize_tag, deserialize_tag],
            },
        );
    }

    /// Resolves the entry that serves `kind`, walking the fallback chain.
    pub fn resolve(
        &mut self,
        types: &dyn TypeLookup,
        kind: TypeKind,
    ) -> Result<SerializerEntry, SerializerError> {
        let mut current = kind;
        loop {
            if let Some(entry) = self.table.get(&current) {
                return Ok(*entry);
            }
            if types.implements_serializable(&current) {
                let entry = SerializerEntry {
                    methods: [capability_serialize, capability_deserialize],
                    tags: [0, 0],
                };
                self.table.insert(current, entry);
                return Ok(entry);
            }
            match types.base_type(&current) {
                Some(base) => current = base,
                None => {
                    return Err(SerializerError::Missing {
                        type_name: types.type_name(&kind).unwrap_or_default().to_string(),
                    })
                }
            }
        }
    }

    /// Resolves and invokes in one step.
    pub fn invoke(
        &mut self,
        types: &dyn TypeLookup,
        kind: TypeKind,
        instance: &mut dyn NetObject,
        stream: &mut NetworkStream,
        op: SerdeOp,
    ) -> Result<(), SerializerError> {
        let entry = self.resolve(types, kind)?;
        entry.call(op, instance, stream);
        Ok(())
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
