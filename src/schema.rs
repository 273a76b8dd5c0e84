//! Schema handles: the seam between the framing core and the serializer.
//!
//! The core never inspects encoded payload bytes. It resolves a
//! [`SchemaHandle`] from the registry and hands it either the raw payload
//! of a completed reassembly (inbound) or a message value to serialize
//! (outbound). Swapping the serializer means swapping the handle
//! implementations, nothing in the framing path changes.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::MsgPackCodec;
use crate::error::{Result, WireError};
use crate::message::Message;

/// Opaque descriptor of one message kind's wire layout.
pub trait WireSchema: Send + Sync {
    /// Kind name, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Decode a raw payload into a typed message.
    fn decode(&self, bytes: &[u8]) -> Result<Message>;

    /// Encode a message into its exact wire bytes.
    ///
    /// The returned length is the declared length framed into the start
    /// packet header, so the encode must be byte-exact.
    fn encode(&self, msg: &Message) -> Result<Vec<u8>>;
}

/// Shared schema handle stored in registry entries.
pub type SchemaHandle = Arc<dyn WireSchema>;

/// MessagePack-backed schema for one payload type.
///
/// `wrap` lifts a decoded payload into the [`Message`] enum; `unwrap`
/// projects it back out for encoding, failing with
/// [`WireError::SchemaMismatch`] when handed a different kind.
pub struct MsgPackSchema<T> {
    name: &'static str,
    wrap: fn(T) -> Message,
    unwrap: fn(&Message) -> Option<&T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MsgPackSchema<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Build a shared handle for one payload type.
    pub fn handle(
        name: &'static str,
        wrap: fn(T) -> Message,
        unwrap: fn(&Message) -> Option<&T>,
    ) -> SchemaHandle {
        Arc::new(Self {
            name,
            wrap,
            unwrap,
            _marker: PhantomData,
        })
    }
}

impl<T> WireSchema for MsgPackSchema<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn decode(&self, bytes: &[u8]) -> Result<Message> {
        let payload: T = MsgPackCodec::decode(bytes)?;
        Ok((self.wrap)(payload))
    }

    fn encode(&self, msg: &Message) -> Result<Vec<u8>> {
        let payload = (self.unwrap)(msg).ok_or(WireError::SchemaMismatch {
            expected: self.name,
        })?;
        MsgPackCodec::encode(payload)
    }
}
