//! Link counters.
//!
//! Every drop the wire protocol used to discard silently is counted here in
//! addition to being returned as an error, so a long-running device can
//! report what its link threw away.

/// Counters kept by a [`MessageLink`](crate::MessageLink).
///
/// The link is owned by one thread of control, so these are plain fields;
/// `stats()` hands out a copy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    /// Raw packets offered to the reassembler.
    pub packets_rx: u64,
    /// Finished packets taken by the transport.
    pub packets_tx: u64,
    /// Messages decoded and handed to dispatch.
    pub messages_dispatched: u64,
    /// Messages framed into the outbound ring.
    pub messages_written: u64,
    /// Start packets with no registry entry.
    pub unknown_dropped: u64,
    /// Start packets declaring more than the buffer holds.
    pub oversize_dropped: u64,
    /// Wrong-length, bad-start, and marker-less continuation packets.
    pub malformed_dropped: u64,
    /// Completed messages the schema decoder rejected.
    pub decode_failures: u64,
}
