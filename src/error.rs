//! Error types for devwire.

use thiserror::Error;

use crate::registry::{Category, Direction};

/// Main error type for all framing, registry, and dispatch operations.
///
/// Every variant is a local, recoverable condition: the link resets its own
/// state before returning and stays operational. The variants for dropped
/// inbound packets exist so callers can observe what the original silent
/// discard policy hid.
#[derive(Debug, Error)]
pub enum WireError {
    /// Raw packet length does not match the fixed packet size.
    #[error("packet length {0} is not the fixed packet size")]
    BadPacketLength(usize),

    /// Packet offered while idle does not carry the start marker and magic.
    #[error("packet does not begin a message")]
    BadStart,

    /// No registry entry for the (category, direction, id) key.
    #[error("no descriptor for {category:?}/{direction:?} message {msg_id}")]
    UnknownMessage {
        category: Category,
        direction: Direction,
        msg_id: u16,
    },

    /// Declared payload length exceeds the reassembly buffer capacity.
    #[error("declared length {declared} exceeds reassembly capacity {capacity}")]
    MessageTooBig { declared: u32, capacity: usize },

    /// Continuation packet arrived without its start marker byte.
    #[error("continuation packet is missing its marker byte")]
    MalformedContinuation,

    /// A message value was handed to a schema for a different kind.
    #[error("message does not match schema {expected}")]
    SchemaMismatch { expected: &'static str },

    /// Payload deserialization error.
    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Payload serialization error.
    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Output is only implemented for the normal category.
    #[error("output is not supported for category {0:?}")]
    UnsupportedCategory(Category),

    /// The outbound ring cannot hold the framed message.
    #[error("outbound ring full: {needed} slots needed, {free} free")]
    RingFull { needed: usize, free: usize },

    /// A buffer size in [`LinkConfig`] is below its workable minimum.
    ///
    /// [`LinkConfig`]: crate::LinkConfig
    #[error("invalid config: {name} = {value}, minimum is {min}")]
    InvalidConfig {
        name: &'static str,
        value: usize,
        min: usize,
    },

    /// Two descriptors share a (category, direction, id) key.
    #[error("duplicate descriptor for {category:?}/{direction:?} message {msg_id}")]
    DuplicateDescriptor {
        category: Category,
        direction: Direction,
        msg_id: u16,
    },
}

/// Result type alias using WireError.
pub type Result<T> = std::result::Result<T, WireError>;
