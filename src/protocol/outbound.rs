//! Outbound packet ring.
//!
//! A fixed ring of 64-byte slots with one writer cursor (slot index plus
//! in-slot offset) and one reader cursor (slot index). The per-byte append
//! primitive stamps the `'?'` marker into the first byte of every fresh
//! slot; `pad` zero-fills the current slot to its boundary and advances the
//! writer, so a framed message always ends exactly on a slot edge and the
//! reader only ever sees finished slots.
//!
//! One slot is kept unused to distinguish full from empty, so a ring of N
//! slots buffers N - 1 finished packets. Callers check [`free_slots`]
//! before appending; the ring itself never overwrites unread slots.
//!
//! [`free_slots`]: PacketRing::free_slots

use super::wire_format::{PACKET_MARKER, PACKET_SIZE};
use crate::error::{Result, WireError};

/// Default number of outbound slots (a 2 KiB ring).
pub const DEFAULT_OUT_SLOTS: usize = 32;

/// Slotted ring buffer for finished outbound packets.
#[derive(Debug)]
pub struct PacketRing {
    slots: Vec<[u8; PACKET_SIZE]>,
    /// Next slot the reader will take.
    read: usize,
    /// Slot the writer is filling (or will fill next when `cursor` is 0).
    write: usize,
    /// Offset within the write slot; 0 means the slot is untouched.
    cursor: usize,
}

impl PacketRing {
    pub fn new() -> Self {
        Self {
            slots: vec![[0u8; PACKET_SIZE]; DEFAULT_OUT_SLOTS],
            read: 0,
            write: 0,
            cursor: 0,
        }
    }

    /// Errors with [`WireError::InvalidConfig`] when `slots < 2`: one slot
    /// is reserved to tell full from empty.
    pub fn with_slots(slots: usize) -> Result<Self> {
        if slots < 2 {
            return Err(WireError::InvalidConfig {
                name: "out_slots",
                value: slots,
                min: 2,
            });
        }
        Ok(Self {
            slots: vec![[0u8; PACKET_SIZE]; slots],
            read: 0,
            write: 0,
            cursor: 0,
        })
    }

    /// Finished packets waiting for the reader.
    pub fn pending(&self) -> usize {
        (self.write + self.slots.len() - self.read) % self.slots.len()
    }

    /// Slots available to a new message.
    pub fn free_slots(&self) -> usize {
        self.slots.len() - 1 - self.pending()
    }

    /// Slots a framed payload of `len` bytes occupies, marker byte and
    /// final padding included.
    pub fn slots_needed(len: usize) -> usize {
        len.div_ceil(PACKET_SIZE - 1).max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Append one byte, stamping the marker first when the slot is fresh.
    pub(crate) fn append(&mut self, byte: u8) {
        if self.cursor == 0 {
            self.slots[self.write][0] = PACKET_MARKER;
            self.cursor = 1;
        }
        self.slots[self.write][self.cursor] = byte;
        self.cursor += 1;
        if self.cursor == PACKET_SIZE {
            self.cursor = 0;
            self.write = (self.write + 1) % self.slots.len();
        }
    }

    /// Zero-pad the current slot to its boundary and advance the writer.
    /// No-op when the slot is untouched.
    pub(crate) fn pad(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.slots[self.write][self.cursor..].fill(0);
        self.cursor = 0;
        self.write = (self.write + 1) % self.slots.len();
    }

    /// Pop the oldest unread packet, or `None` when the cursors coincide.
    ///
    /// The caller owns the returned bytes.
    pub fn pop(&mut self) -> Option<[u8; PACKET_SIZE]> {
        if self.read == self.write {
            return None;
        }
        let packet = self.slots[self.read];
        self.read = (self.read + 1) % self.slots.len();
        Some(packet)
    }
}

impl Default for PacketRing {
    fn default() -> Self {
        Self::new()
    }
}
