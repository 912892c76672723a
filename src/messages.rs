use crate::stream::{NetworkStream, SerdeErr, WireSerde};
use crate::types::{ClientId, Frame, NetId, PrefabId};

/// Maximum serialized state payload carried by a single replicate message.
pub const MAX_REPLICATED_DATA_SIZE: usize = u16::MAX as usize;

/// Length of the fixed type-name field on the wire.
pub const TYPE_NAME_LEN: usize = 128;

/// Leading byte identifying each replication message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageId {
    ObjectReplicate = 1,
    ObjectSpawn = 2,
    ObjectDespawn = 3,
    ObjectRole = 4,
}

impl MessageId {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(MessageId::ObjectReplicate),
            2 => Some(MessageId::ObjectSpawn),
            3 => Some(MessageId::ObjectDespawn),
            4 => Some(MessageId::ObjectRole),
            _ => None,
        }
    }
}

impl WireSerde for MessageId {
    fn ser(&self, stream: &mut NetworkStream) {
        (*self as u8).ser(stream);
    }

    fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr> {
        MessageId::from_u8(u8::de(stream)?).ok_or(SerdeErr::InvalidValue {
            field: "message id",
        })
    }
}

/// Full object type name as a fixed, NUL-padded ASCII wire field.
#[derive(Clone, Copy)]
pub struct TypeName([u8; TYPE_NAME_LEN]);

impl TypeName {
    /// Builds a wire field from a type name, truncating to what fits.
    pub fn from_str(name: &str) -> Self {
        let mut raw = [0u8; TYPE_NAME_LEN];
        let len = name.len().min(TYPE_NAME_LEN - 1);
        raw[..len].copy_from_slice(&name.as_bytes()[..len]);
        TypeName(raw)
    }

    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(TYPE_NAME_LEN);
        std::str::from_utf8(&self.0[..end]).unwrap_or_default()
    }
}

impl std::fmt::Debug for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypeName").field(&self.as_str()).finish()
    }
}

impl PartialEq for TypeName {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl Eq for TypeName {}

impl WireSerde for TypeName {
    fn ser(&self, stream: &mut NetworkStream) {
        stream.write_bytes(&self.0);
    }

    fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr> {
        let bytes = stream.read_bytes(TYPE_NAME_LEN)?;
        let mut raw = [0u8; TYPE_NAME_LEN];
        raw.copy_from_slice(bytes);
        Ok(TypeName(raw))
    }
}

/// Per-frame object state update. Unreliable channel; the serialized payload
/// of `data_size` bytes follows the header directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReplicateMessage {
    pub owner_frame: Frame,
    pub object_id: NetId,
    pub parent_id: NetId,
    pub type_name: TypeName,
    pub data_size: u16,
}

impl WireSerde for ObjectReplicateMessage {
    fn ser(&self, stream: &mut NetworkStream) {
        MessageId::ObjectReplicate.ser(stream);
        self.owner_frame.ser(stream);
        self.object_id.ser(stream);
        self.parent_id.ser(stream);
        self.type_name.ser(stream);
        self.data_size.ser(stream);
    }

    fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr> {
        if MessageId::de(stream)? != MessageId::ObjectReplicate {
            return Err(SerdeErr::InvalidValue {
                field: "message id",
            });
        }
        Ok(Self {
            owner_frame: Frame::de(stream)?,
            object_id: NetId::de(stream)?,
            parent_id: NetId::de(stream)?,
            type_name: TypeName::de(stream)?,
            data_size: u16::de(stream)?,
        })
    }
}

/// Object spawn announcement. Reliable-ordered channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSpawnMessage {
    pub object_id: NetId,
    pub parent_id: NetId,
    /// Zero unless the object comes from a prefab instance.
    pub prefab_id: PrefabId,
    /// Identifies the sub-object within the prefab; zero when not a prefab.
    pub prefab_object_id: NetId,
    pub owner_client_id: ClientId,
    pub type_name: TypeName,
}

impl WireSerde for ObjectSpawnMessage {
    fn ser(&self, stream: &mut NetworkStream) {
        MessageId::ObjectSpawn.ser(stream);
        self.object_id.ser(stream);
        self.parent_id.ser(stream);
        self.prefab_id.ser(stream);
        self.prefab_object_id.ser(stream);
        self.owner_client_id.ser(stream);
        self.type_name.ser(stream);
    }

    fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr> {
        if MessageId::de(stream)? != MessageId::ObjectSpawn {
            return Err(SerdeErr::InvalidValue {
                field: "message id",
            });
        }
        Ok(Self {
            object_id: NetId::de(stream)?,
            parent_id: NetId::de(stream)?,
            prefab_id: PrefabId::de(stream)?,
            prefab_object_id: NetId::de(stream)?,
            owner_client_id: ClientId::de(stream)?,
            type_name: TypeName::de(stream)?,
        })
    }
}

/// Object despawn announcement. Reliable-ordered channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDespawnMessage {
    pub object_id: NetId,
}

impl WireSerde for ObjectDespawnMessage {
    fn ser(&self, stream: &mut NetworkStream) {
        MessageId::ObjectDespawn.ser(stream);
        self.object_id.ser(stream);
    }

    fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr> {
        if MessageId::de(stream)? != MessageId::ObjectDespawn {
            return Err(SerdeErr::InvalidValue {
                field: "message id",
            });
        }
        Ok(Self {
            object_id: NetId::de(stream)?,
        })
    }
}

/// Ownership change announcement. Reliable-ordered channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRoleMessage {
    pub object_id: NetId,
    pub owner_client_id: ClientId,
}

impl WireSerde for ObjectRoleMessage {
    fn ser(&self, stream: &mut NetworkStream) {
        MessageId::ObjectRole.ser(stream);
        self.object_id.ser(stream);
        self.owner_client_id.ser(stream);
    }

    fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr> {
        if MessageId::de(stream)? != MessageId::ObjectRole {
            return Err(SerdeErr::InvalidValue {
                field: "message id",
            });
        }
        Ok(Self {
            object_id: NetId::de(stream)?,
            owner_client_id: ClientId::de(stream)?,
        })
    }
}
