use thiserror::Error;

use crate::types::{NetId, PrefabId};

/// Errors that can occur while reading wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The stream did not contain enough bytes for the requested read
    #[error("stream ran out of bytes at position {position}, needed {needed} more")]
    OutOfBytes { position: usize, needed: usize },

    /// A field held a value outside its valid range
    #[error("invalid value for {field}")]
    InvalidValue { field: &'static str },
}

/// A reusable byte stream for message payloads.
///
/// The same stream type serves both directions: `initialize` resets it for
/// writing, `initialize_read` loads it with received bytes for reading. The
/// replication core keeps cached instances and reuses them frame-to-frame.
pub struct NetworkStream {
    buffer: Vec<u8>,
    position: usize,
}

impl NetworkStream {
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            position: 0,
        }
    }

    /// Reset for writing. Keeps the allocation.
    pub fn initialize(&mut self) {
        self.buffer.clear();
        self.position = 0;
    }

    /// Reset for reading over a copy of `data`. Keeps the allocation.
    pub fn initialize_read(&mut self, data: &[u8]) {
        self.buffer.clear();
        self.buffer.extend_from_slice(data);
        self.position = 0;
    }

    /// Bytes written so far (write mode) or bytes consumed so far (read mode).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes still available to read.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// The full written contents (write mode).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        self.position = self.buffer.len();
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8], SerdeErr> {
        if self.remaining() < len {
            return Err(SerdeErr::OutOfBytes {
                position: self.position,
                needed: len - self.remaining(),
            });
        }
        let start = self.position;
        self.position += len;
        Ok(&self.buffer[start..self.position])
    }
}

impl Default for NetworkStream {
    fn default() -> Self {
        Self::new()
    }
}

/// Little-endian, unpadded wire encoding.
pub trait WireSerde: Sized {
    fn ser(&self, stream: &mut NetworkStream);
    fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr>;
}

macro_rules! impl_wire_serde_int {
    ($ty:ty, $len:expr) => {
        impl WireSerde for $ty {
            fn ser(&self, stream: &mut NetworkStream) {
                stream.write_bytes(&self.to_le_bytes());
            }

            fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr> {
                let bytes = stream.read_bytes($len)?;
                let mut raw = [0u8; $len];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_le_bytes(raw))
            }
        }
    };
}

impl_wire_serde_int!(u8, 1);
impl_wire_serde_int!(u16, 2);
impl_wire_serde_int!(u32, 4);
impl_wire_serde_int!(u64, 8);
impl_wire_serde_int!(u128, 16);

impl WireSerde for NetId {
    fn ser(&self, stream: &mut NetworkStream) {
        self.value().ser(stream);
    }

    fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr> {
        Ok(NetId::new(u128::de(stream)?))
    }
}

impl WireSerde for PrefabId {
    fn ser(&self, stream: &mut NetworkStream) {
        self.value().ser(stream);
    }

    fn de(stream: &mut NetworkStream) -> Result<Self, SerdeErr> {
        Ok(PrefabId::new(u128::de(stream)?))
    }
}
