//! Protocol module - wire format, inbound reassembly, and the outbound ring.
//!
//! This module implements the framing layer of the report channel:
//! - 9-byte start header encoding/parsing over 64-byte packets
//! - reassembly state machine accumulating multi-packet messages
//! - slotted ring buffer chunking and padding outbound messages

mod outbound;
mod reassembly;
mod wire_format;

pub use outbound::{PacketRing, DEFAULT_OUT_SLOTS};
pub use reassembly::{CompleteMessage, Reassembler, DEFAULT_IN_CAPACITY};
pub use wire_format::{
    MsgHeader, CONT_PAYLOAD, HEADER_MAGIC, HEADER_SIZE, PACKET_MARKER, PACKET_SIZE, START_PAYLOAD,
};
