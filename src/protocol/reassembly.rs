//! Inbound reassembly state machine.
//!
//! Recombines fixed-size report packets into one complete message payload.
//! Two states:
//! - `Idle`: no message in progress; only a valid start packet is accepted
//! - `Reading`: payload accumulation; continuation packets append bytes
//!
//! The buffer capacity is fixed at construction and is never exceeded, no
//! matter what lengths the peer declares or how many continuation packets
//! it sends. There is no timeout: a stalled multi-packet transfer parks the
//! machine in `Reading` until the next malformed packet knocks it back to
//! `Idle`.

use bytes::{Bytes, BytesMut};
use tracing::trace;

use super::wire_format::{MsgHeader, HEADER_SIZE, PACKET_MARKER, PACKET_SIZE};
use crate::error::{Result, WireError};
use crate::registry::{Category, Direction, MessageRegistry};
use crate::schema::SchemaHandle;

/// Default reassembly buffer capacity (12 KiB).
pub const DEFAULT_IN_CAPACITY: usize = 12 * 1024;

enum ReadState {
    Idle,
    Reading {
        msg_id: u16,
        msg_len: u32,
        /// Schema pinned at message start so completion needs no second
        /// registry scan.
        schema: SchemaHandle,
    },
}

/// A fully reassembled inbound message, ready for decode and dispatch.
pub struct CompleteMessage {
    pub category: Category,
    pub msg_id: u16,
    pub schema: SchemaHandle,
    /// Payload truncated to the declared length.
    pub payload: Bytes,
}

impl core::fmt::Debug for CompleteMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompleteMessage")
            .field("category", &self.category)
            .field("msg_id", &self.msg_id)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

/// The inbound state machine. One per link; single active reassembly.
pub struct Reassembler {
    state: ReadState,
    buf: BytesMut,
    capacity: usize,
}

impl core::fmt::Debug for Reassembler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reassembler")
            .field("buf", &self.buf)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Reassembler {
    pub fn new() -> Self {
        Self {
            state: ReadState::Idle,
            buf: BytesMut::with_capacity(DEFAULT_IN_CAPACITY),
            capacity: DEFAULT_IN_CAPACITY,
        }
    }

    /// Errors with [`WireError::InvalidConfig`] when `capacity` cannot hold
    /// even one packet.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity < PACKET_SIZE {
            return Err(WireError::InvalidConfig {
                name: "in_capacity",
                value: capacity,
                min: PACKET_SIZE,
            });
        }
        Ok(Self {
            state: ReadState::Idle,
            buf: BytesMut::with_capacity(capacity),
            capacity,
        })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ReadState::Idle)
    }

    /// Payload bytes collected for the message in progress.
    pub fn collected(&self) -> usize {
        self.buf.len()
    }

    /// Feed one raw transport packet.
    ///
    /// Returns `Ok(Some(_))` when this packet completed a message,
    /// `Ok(None)` when more packets are needed. Errors report dropped
    /// input; the machine has already recovered (state unchanged for a
    /// rejected start, reset to `Idle` for a malformed continuation).
    pub fn push_packet(
        &mut self,
        registry: &MessageRegistry,
        category: Category,
        packet: &[u8],
    ) -> Result<Option<CompleteMessage>> {
        if packet.len() != PACKET_SIZE {
            return Err(WireError::BadPacketLength(packet.len()));
        }

        match &self.state {
            ReadState::Idle => {
                let header = MsgHeader::parse_start(packet).ok_or(WireError::BadStart)?;
                let schema = registry
                    .resolve_schema(category, Direction::Inbound, header.msg_id)
                    .cloned()
                    .ok_or(WireError::UnknownMessage {
                        category,
                        direction: Direction::Inbound,
                        msg_id: header.msg_id,
                    })?;
                if header.msg_len as usize > self.capacity {
                    return Err(WireError::MessageTooBig {
                        declared: header.msg_len,
                        capacity: self.capacity,
                    });
                }

                let chunk = &packet[HEADER_SIZE..];
                let take = chunk.len().min(self.capacity);
                self.buf.extend_from_slice(&chunk[..take]);
                trace!(
                    msg_id = header.msg_id,
                    declared = header.msg_len,
                    collected = self.buf.len(),
                    "message start"
                );
                self.state = ReadState::Reading {
                    msg_id: header.msg_id,
                    msg_len: header.msg_len,
                    schema,
                };
            }
            ReadState::Reading { .. } => {
                if packet[0] != PACKET_MARKER {
                    self.reset();
                    return Err(WireError::MalformedContinuation);
                }
                let chunk = &packet[1..];
                let take = chunk.len().min(self.capacity - self.buf.len());
                self.buf.extend_from_slice(&chunk[..take]);
            }
        }

        // Completion is checked after both branches: a short message
        // completes on its very first packet.
        Ok(self.try_complete(category))
    }

    fn try_complete(&mut self, category: Category) -> Option<CompleteMessage> {
        if let ReadState::Reading {
            msg_id,
            msg_len,
            schema,
        } = &self.state
        {
            if self.buf.len() >= *msg_len as usize {
                let msg_id = *msg_id;
                let msg_len = *msg_len as usize;
                let schema = schema.clone();
                self.state = ReadState::Idle;
                let payload = self.buf.split_to(msg_len).freeze();
                self.buf.clear();
                trace!(msg_id, len = msg_len, "message complete");
                return Some(CompleteMessage {
                    category,
                    msg_id,
                    schema,
                    payload,
                });
            }
        }
        None
    }

    fn reset(&mut self) {
        self.state = ReadState::Idle;
        self.buf.clear();
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::message::{msg_id, schemas};
    use crate::registry::RegistryBuilder;

    fn registry() -> MessageRegistry {
        RegistryBuilder::new()
            .inbound_schema(Category::Normal, msg_id::PING, schemas::ping())
            .build()
            .unwrap()
    }

    fn start_packet(id: u16, len: u32, payload: &[u8]) -> [u8; PACKET_SIZE] {
        assert!(payload.len() <= PACKET_SIZE - HEADER_SIZE);
        let mut packet = [0u8; PACKET_SIZE];
        packet[0] = PACKET_MARKER;
        packet[1..9].copy_from_slice(&MsgHeader::new(id, len).encode());
        packet[9..9 + payload.len()].copy_from_slice(payload);
        packet
    }

    fn cont_packet(payload: &[u8]) -> [u8; PACKET_SIZE] {
        assert!(payload.len() <= PACKET_SIZE - 1);
        let mut packet = [0u8; PACKET_SIZE];
        packet[0] = PACKET_MARKER;
        packet[1..1 + payload.len()].copy_from_slice(payload);
        packet
    }

    #[test]
    fn test_complete_on_first_packet() {
        let registry = registry();
        let mut r = Reassembler::new();

        let packet = start_packet(msg_id::PING, 4, b"abcd");
        let complete = r
            .push_packet(&registry, Category::Normal, &packet)
            .unwrap()
            .expect("message should complete");

        assert_eq!(complete.msg_id, msg_id::PING);
        assert_eq!(&complete.payload[..], b"abcd");
        assert_eq!(complete.schema.name(), "Ping");
        assert!(r.is_idle());
        assert_eq!(r.collected(), 0);
    }

    #[test]
    fn test_multi_packet_message() {
        let registry = registry();
        let mut r = Reassembler::new();

        // 100 bytes: 55 in the start packet, 45 in one continuation.
        let payload: Vec<u8> = (0..100u8).collect();
        let first = start_packet(msg_id::PING, 100, &payload[..55]);
        assert!(r
            .push_packet(&registry, Category::Normal, &first)
            .unwrap()
            .is_none());
        assert!(!r.is_idle());
        assert_eq!(r.collected(), 55);

        let second = cont_packet(&payload[55..]);
        let complete = r
            .push_packet(&registry, Category::Normal, &second)
            .unwrap()
            .expect("second packet completes");
        assert_eq!(&complete.payload[..], &payload[..]);
        assert!(r.is_idle());
    }

    #[test]
    fn test_payload_truncated_to_declared_length() {
        let registry = registry();
        let mut r = Reassembler::new();

        // Declared 3 bytes, packet carries 55 of padding.
        let packet = start_packet(msg_id::PING, 3, b"xyz rest is padding");
        let complete = r
            .push_packet(&registry, Category::Normal, &packet)
            .unwrap()
            .unwrap();
        assert_eq!(&complete.payload[..], b"xyz");
    }

    #[test]
    fn test_wrong_packet_length_rejected_without_state_change() {
        let registry = registry();
        let mut r = Reassembler::new();

        let first = start_packet(msg_id::PING, 100, &[0u8; 55]);
        r.push_packet(&registry, Category::Normal, &first).unwrap();
        let collected = r.collected();

        let short = [PACKET_MARKER; 63];
        let err = r
            .push_packet(&registry, Category::Normal, &short)
            .unwrap_err();
        assert!(matches!(err, WireError::BadPacketLength(63)));
        assert_eq!(r.collected(), collected);
        assert!(!r.is_idle());
    }

    #[test]
    fn test_continuation_without_start() {
        let registry = registry();
        let mut r = Reassembler::new();

        let packet = cont_packet(b"orphan");
        let err = r
            .push_packet(&registry, Category::Normal, &packet)
            .unwrap_err();
        assert!(matches!(err, WireError::BadStart));
        assert!(r.is_idle());
    }

    #[test]
    fn test_malformed_continuation_aborts() {
        let registry = registry();
        let mut r = Reassembler::new();

        let first = start_packet(msg_id::PING, 100, &[0u8; 55]);
        r.push_packet(&registry, Category::Normal, &first).unwrap();

        let mut bad = cont_packet(&[0u8; 10]);
        bad[0] = b'!';
        let err = r.push_packet(&registry, Category::Normal, &bad).unwrap_err();
        assert!(matches!(err, WireError::MalformedContinuation));
        assert!(r.is_idle());
        assert_eq!(r.collected(), 0);

        // A fresh valid message is accepted immediately after the abort.
        let packet = start_packet(msg_id::PING, 2, b"ok");
        assert!(r
            .push_packet(&registry, Category::Normal, &packet)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_start_shaped_packet_mid_read_is_consumed_as_payload() {
        let registry = registry();
        let mut r = Reassembler::new();

        let first = start_packet(msg_id::PING, 150, &[0xAA; 55]);
        assert!(r
            .push_packet(&registry, Category::Normal, &first)
            .unwrap()
            .is_none());

        // A continuation that happens to look like a fresh start must not
        // restart reassembly: only its leading '?' is framing, the magic
        // and header bytes are ordinary payload while Reading.
        let lookalike = start_packet(0x4242, 0xFFFF_FFFF, &[0xBB; 55]);
        assert!(r
            .push_packet(&registry, Category::Normal, &lookalike)
            .unwrap()
            .is_none());
        assert!(!r.is_idle());
        assert_eq!(r.collected(), 55 + 63);

        let complete = r
            .push_packet(&registry, Category::Normal, &cont_packet(&[0xCC; 63]))
            .unwrap()
            .expect("completes at declared length");
        assert_eq!(complete.msg_id, msg_id::PING);
        assert_eq!(complete.payload.len(), 150);
        assert_eq!(&complete.payload[..55], &[0xAA; 55][..]);
        // The lookalike's bytes 1..64 land at the collected offset intact:
        // magic, id, declared length, then its 55 payload bytes.
        assert_eq!(&complete.payload[55..57], b"##");
        assert_eq!(&complete.payload[57..59], &0x4242u16.to_be_bytes());
        assert_eq!(&complete.payload[59..63], &0xFFFF_FFFFu32.to_be_bytes());
        assert_eq!(&complete.payload[63..118], &[0xBB; 55][..]);
        assert_eq!(&complete.payload[118..150], &[0xCC; 32][..]);
    }

    #[test]
    fn test_unknown_message_dropped() {
        let registry = registry();
        let mut r = Reassembler::new();

        let packet = start_packet(0x4242, 4, b"abcd");
        let err = r
            .push_packet(&registry, Category::Normal, &packet)
            .unwrap_err();
        assert!(matches!(err, WireError::UnknownMessage { msg_id: 0x4242, .. }));
        assert!(r.is_idle());
    }

    #[test]
    fn test_known_id_on_other_category_dropped() {
        let registry = registry();
        let mut r = Reassembler::new();

        let packet = start_packet(msg_id::PING, 4, b"abcd");
        let err = r
            .push_packet(&registry, Category::Debug, &packet)
            .unwrap_err();
        assert!(matches!(err, WireError::UnknownMessage { .. }));
    }

    #[test]
    fn test_oversize_declared_length_dropped() {
        let registry = registry();
        let mut r = Reassembler::with_capacity(256).unwrap();

        let packet = start_packet(msg_id::PING, 257, &[0u8; 55]);
        let err = r
            .push_packet(&registry, Category::Normal, &packet)
            .unwrap_err();
        assert!(matches!(
            err,
            WireError::MessageTooBig {
                declared: 257,
                capacity: 256
            }
        ));
        assert!(r.is_idle());

        // Recovery: a valid start right after is accepted.
        let packet = start_packet(msg_id::PING, 2, b"ok");
        assert!(r
            .push_packet(&registry, Category::Normal, &packet)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_capacity_below_packet_size_rejected() {
        let err = Reassembler::with_capacity(PACKET_SIZE - 1).unwrap_err();
        assert!(matches!(
            err,
            WireError::InvalidConfig {
                name: "in_capacity",
                value: 63,
                min: PACKET_SIZE,
            }
        ));
        assert!(Reassembler::with_capacity(PACKET_SIZE).is_ok());
    }

    #[test]
    fn test_continuation_clamped_to_capacity() {
        let registry = registry();
        // Capacity 64: declared length 60 fits, but 55 + 63 would not.
        let mut r = Reassembler::with_capacity(64).unwrap();

        let first = start_packet(msg_id::PING, 60, &[0xAA; 55]);
        assert!(r
            .push_packet(&registry, Category::Normal, &first)
            .unwrap()
            .is_none());

        let second = cont_packet(&[0xBB; 63]);
        let complete = r
            .push_packet(&registry, Category::Normal, &second)
            .unwrap()
            .expect("completes at declared length");
        assert_eq!(complete.payload.len(), 60);
        assert_eq!(r.collected(), 0);
    }

    proptest! {
        // Whatever bytes arrive, the collected count never exceeds the
        // configured capacity and the machine never panics.
        #[test]
        fn prop_capacity_never_exceeded(
            packets in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..(PACKET_SIZE * 2)),
                0..32,
            )
        ) {
            let registry = registry();
            let mut r = Reassembler::with_capacity(256).unwrap();
            for packet in &packets {
                let _ = r.push_packet(&registry, Category::Normal, packet);
                prop_assert!(r.collected() <= 256);
            }
        }
    }
}
