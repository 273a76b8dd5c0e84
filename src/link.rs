//! MessageLink: the glue between reassembly, the registry, and the ring.
//!
//! A link owns all mutable framing state (reassembler, outbound ring,
//! counters) plus the immutable registry, so tests and multi-interface
//! firmware can run independent instances. All calls are synchronous and
//! run on one thread of control: a packet is reassembled, decoded, and
//! dispatched before the next packet is offered.

use tracing::{trace, warn};

use crate::error::{Result, WireError};
use crate::message::Message;
use crate::protocol::{
    CompleteMessage, MsgHeader, PacketRing, Reassembler, DEFAULT_IN_CAPACITY, DEFAULT_OUT_SLOTS,
    PACKET_SIZE,
};
use crate::registry::{Category, Direction, MessageRegistry};
use crate::stats::LinkStats;

/// Buffer sizing for a link.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Inbound reassembly buffer capacity in bytes.
    pub in_capacity: usize,
    /// Outbound ring size in 64-byte slots.
    pub out_slots: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            in_capacity: DEFAULT_IN_CAPACITY,
            out_slots: DEFAULT_OUT_SLOTS,
        }
    }
}

/// Outcome of feeding one inbound packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundStatus {
    /// Packet accepted; the message is still incomplete.
    Pending,
    /// A message completed, decoded, and was dispatched.
    Dispatched { msg_id: u16 },
}

/// Framing and dispatch state for one device/host session.
pub struct MessageLink {
    registry: MessageRegistry,
    reassembler: Reassembler,
    ring: PacketRing,
    stats: LinkStats,
}

impl core::fmt::Debug for MessageLink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageLink")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl MessageLink {
    pub fn new(registry: MessageRegistry) -> Self {
        Self {
            registry,
            reassembler: Reassembler::new(),
            ring: PacketRing::new(),
            stats: LinkStats::default(),
        }
    }

    /// Errors with [`WireError::InvalidConfig`] when a configured buffer
    /// size is below its workable minimum.
    pub fn with_config(registry: MessageRegistry, config: LinkConfig) -> Result<Self> {
        Ok(Self {
            registry,
            reassembler: Reassembler::with_capacity(config.in_capacity)?,
            ring: PacketRing::with_slots(config.out_slots)?,
            stats: LinkStats::default(),
        })
    }

    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    /// Snapshot of the link counters.
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Feed one raw transport packet into the reassembly state machine.
    ///
    /// When the packet completes a message, the payload is decoded through
    /// the schema pinned at message start and the handler registered for
    /// (category, inbound, id) is invoked before this call returns.
    ///
    /// All failures are local: by the time an error comes back the
    /// reassembler has already recovered (reset to idle, or state unchanged
    /// for a rejected start packet) and the next packet can be offered.
    pub fn on_packet_received(&mut self, category: Category, packet: &[u8]) -> Result<InboundStatus> {
        self.stats.packets_rx += 1;
        match self.reassembler.push_packet(&self.registry, category, packet) {
            Ok(Some(complete)) => self.decode_and_dispatch(complete),
            Ok(None) => Ok(InboundStatus::Pending),
            Err(err) => {
                self.count_drop(&err);
                warn!(error = %err, "inbound packet dropped");
                Err(err)
            }
        }
    }

    fn decode_and_dispatch(&mut self, complete: CompleteMessage) -> Result<InboundStatus> {
        let CompleteMessage {
            category,
            msg_id,
            schema,
            payload,
        } = complete;

        let msg = match schema.decode(&payload) {
            Ok(msg) => msg,
            Err(err) => {
                self.stats.decode_failures += 1;
                warn!(msg_id, error = %err, "decode failed, skipping dispatch");
                return Err(err);
            }
        };

        self.registry
            .dispatch(category, Direction::Inbound, msg_id, &msg);
        self.stats.messages_dispatched += 1;
        Ok(InboundStatus::Dispatched { msg_id })
    }

    /// Encode a message and commit its packets to the outbound ring.
    ///
    /// Only the normal category has an output path. The write is atomic:
    /// slot demand is checked against free ring capacity before the first
    /// byte is appended, so a failed write never leaves a truncated frame
    /// in the output stream.
    pub fn write_message(&mut self, category: Category, msg_id: u16, msg: &Message) -> Result<()> {
        if category != Category::Normal {
            return Err(WireError::UnsupportedCategory(category));
        }
        let schema = self
            .registry
            .resolve_schema(category, Direction::Outbound, msg_id)
            .ok_or(WireError::UnknownMessage {
                category,
                direction: Direction::Outbound,
                msg_id,
            })?
            .clone();

        let encoded = schema.encode(msg)?;
        let header = MsgHeader::new(msg_id, encoded.len() as u32);
        let header_bytes = header.encode();

        let needed = PacketRing::slots_needed(header_bytes.len() + encoded.len());
        let free = self.ring.free_slots();
        if needed > free {
            return Err(WireError::RingFull { needed, free });
        }

        for byte in header_bytes {
            self.ring.append(byte);
        }
        for &byte in &encoded {
            self.ring.append(byte);
        }
        self.ring.pad();

        self.stats.messages_written += 1;
        trace!(msg_id, len = encoded.len(), slots = needed, "message framed");
        Ok(())
    }

    /// Pop the oldest finished outbound packet for the transport to send.
    ///
    /// Returns `None` when the ring is drained. The caller owns the bytes.
    pub fn take_next_packet(&mut self) -> Option<[u8; PACKET_SIZE]> {
        let packet = self.ring.pop();
        if packet.is_some() {
            self.stats.packets_tx += 1;
        }
        packet
    }

    fn count_drop(&mut self, err: &WireError) {
        match err {
            WireError::UnknownMessage { .. } => self.stats.unknown_dropped += 1,
            WireError::MessageTooBig { .. } => self.stats.oversize_dropped += 1,
            WireError::BadPacketLength(_)
            | WireError::BadStart
            | WireError::MalformedContinuation => self.stats.malformed_dropped += 1,
            _ => {}
        }
    }
}
