//! MessagePack codec using `rmp-serde`.
//!
//! Payloads travel as compact positional arrays (`rmp_serde::to_vec`):
//! both ends of the link share the same message definitions, so field
//! names carry no information and only waste space on a 64-byte report
//! channel.
//!
//! # Example
//!
//! ```
//! use devwire::codec::MsgPackCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Report {
//!     id: u32,
//!     label: String,
//! }
//!
//! let report = Report { id: 7, label: "boot".to_string() };
//! let encoded = MsgPackCodec::encode(&report).unwrap();
//! let decoded: Report = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, report);
//! ```

use crate::error::Result;

/// MessagePack codec for structured payloads.
///
/// Structs serialize as positional arrays, the most compact layout
/// `rmp-serde` offers.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec(value)?)
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
