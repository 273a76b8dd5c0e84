//! Wire format for the fixed-size report channel.
//!
//! Every packet is exactly 64 bytes and opens with the `'?'` marker:
//! ```text
//! start packet:        ['?','#','#', idHi, idLo, len3, len2, len1, len0, payload...]
//! continuation packet: ['?', payload...]
//! ```
//! Message id and declared payload length are Big Endian. Packets shorter
//! than 64 bytes are zero-padded by the sender.
//!
//! Reusing `'?'` as byte 0 of both shapes lets the receiver tell a fresh
//! message from a continuation with the first three bytes alone, without
//! sequence numbers or an out-of-band channel.

/// Fixed report size of the transport channel.
pub const PACKET_SIZE: usize = 64;

/// Marker byte opening every packet.
pub const PACKET_MARKER: u8 = b'?';

/// Magic bytes following the marker on a start packet.
pub const HEADER_MAGIC: [u8; 2] = [b'#', b'#'];

/// Start packet header size: marker + magic + u16 id + u32 length.
pub const HEADER_SIZE: usize = 9;

/// Payload bytes carried by a start packet.
pub const START_PAYLOAD: usize = PACKET_SIZE - HEADER_SIZE;

/// Payload bytes carried by a continuation packet.
pub const CONT_PAYLOAD: usize = PACKET_SIZE - 1;

/// Decoded start-packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgHeader {
    /// Message identifier (Big Endian on the wire).
    pub msg_id: u16,
    /// Declared payload length across all packets of the message.
    pub msg_len: u32,
}

impl MsgHeader {
    pub fn new(msg_id: u16, msg_len: u32) -> Self {
        Self { msg_id, msg_len }
    }

    /// Parse the header of a start packet.
    ///
    /// Returns `None` when the packet does not begin with the marker and
    /// magic bytes, or is too short to hold a header.
    pub fn parse_start(packet: &[u8]) -> Option<Self> {
        if packet.len() < HEADER_SIZE {
            return None;
        }
        if packet[0] != PACKET_MARKER || packet[1..3] != HEADER_MAGIC {
            return None;
        }
        Some(Self {
            msg_id: u16::from_be_bytes([packet[3], packet[4]]),
            msg_len: u32::from_be_bytes([packet[5], packet[6], packet[7], packet[8]]),
        })
    }

    /// Encode the header bytes that follow the slot marker on a start
    /// packet: magic + id + length. The outbound ring's append primitive
    /// supplies the leading `'?'` itself.
    pub fn encode(&self) -> [u8; HEADER_SIZE - 1] {
        let mut buf = [0u8; HEADER_SIZE - 1];
        buf[0..2].copy_from_slice(&HEADER_MAGIC);
        buf[2..4].copy_from_slice(&self.msg_id.to_be_bytes());
        buf[4..8].copy_from_slice(&self.msg_len.to_be_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_packet(msg_id: u16, msg_len: u32) -> [u8; PACKET_SIZE] {
        let mut packet = [0u8; PACKET_SIZE];
        packet[0] = PACKET_MARKER;
        packet[1..9].copy_from_slice(&MsgHeader::new(msg_id, msg_len).encode());
        packet
    }

    #[test]
    fn test_parse_start_roundtrip() {
        let packet = start_packet(0x1234, 0xDEADBEEF);
        let header = MsgHeader::parse_start(&packet).unwrap();
        assert_eq!(header.msg_id, 0x1234);
        assert_eq!(header.msg_len, 0xDEADBEEF);
    }

    #[test]
    fn test_big_endian_byte_order() {
        let packet = start_packet(0x0102, 0x03040506);

        assert_eq!(&packet[0..3], b"?##");
        assert_eq!(packet[3], 0x01);
        assert_eq!(packet[4], 0x02);
        assert_eq!(packet[5], 0x03);
        assert_eq!(packet[6], 0x04);
        assert_eq!(packet[7], 0x05);
        assert_eq!(packet[8], 0x06);
    }

    #[test]
    fn test_parse_rejects_missing_marker() {
        let mut packet = start_packet(1, 1);
        packet[0] = b'!';
        assert!(MsgHeader::parse_start(&packet).is_none());
    }

    #[test]
    fn test_parse_rejects_missing_magic() {
        let mut packet = start_packet(1, 1);
        packet[2] = 0;
        assert!(MsgHeader::parse_start(&packet).is_none());

        // A continuation shape is not a start packet.
        let mut cont = [0u8; PACKET_SIZE];
        cont[0] = PACKET_MARKER;
        assert!(MsgHeader::parse_start(&cont).is_none());
    }

    #[test]
    fn test_parse_rejects_short_buffer() {
        assert!(MsgHeader::parse_start(&[PACKET_MARKER, b'#', b'#', 0, 1]).is_none());
    }

    #[test]
    fn test_payload_capacities() {
        assert_eq!(START_PAYLOAD, 55);
        assert_eq!(CONT_PAYLOAD, 63);
    }
}
