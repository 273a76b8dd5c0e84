//! Codec module - payload serialization for the schema seam.
//!
//! [`MsgPackCodec`] is the external serializer the framing core delegates
//! to. It is a marker struct with static methods rather than a trait
//! object, so codec selection happens at compile time.

mod msgpack;

pub use msgpack::MsgPackCodec;
