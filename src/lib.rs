//! # devwire
//!
//! Framing and message dispatch for a device that exchanges structured
//! messages with a host over a fixed-size-packet channel (64-byte reports).
//!
//! ## Architecture
//!
//! - **Registry** ([`registry`]): an immutable table of
//!   (category, direction, message id) descriptors, each carrying a schema
//!   handle and, for inbound entries, a handler. Lookup is a linear scan.
//! - **Inbound** ([`protocol::Reassembler`]): a two-state machine that
//!   accumulates multi-packet messages into a fixed-capacity buffer and
//!   never reads or writes outside it, whatever the host sends.
//! - **Outbound** ([`protocol::PacketRing`]): a slotted ring buffer that
//!   chunks and zero-pads framed messages so every message ends on a
//!   packet boundary.
//! - **Link** ([`MessageLink`]): owns all of the above; the transport
//!   driver pushes raw packets in and pulls finished packets out.
//!
//! Serialization is delegated to schema handles ([`schema::WireSchema`]);
//! the framing core never inspects encoded payload bytes.
//!
//! ## Example
//!
//! ```
//! use devwire::message::{self, msg_id, Message};
//! use devwire::{Category, MessageLink, RegistryBuilder};
//!
//! let registry = RegistryBuilder::new()
//!     .inbound(Category::Normal, msg_id::PING, message::schemas::ping(), |msg| {
//!         if let Message::Ping(ping) = msg {
//!             println!("ping: {}", ping.message);
//!         }
//!     })
//!     .outbound(Category::Normal, msg_id::SUCCESS, message::schemas::success())
//!     .build()
//!     .unwrap();
//!
//! let mut link = MessageLink::new(registry);
//! assert!(link.take_next_packet().is_none());
//! ```

pub mod codec;
pub mod error;
pub mod message;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod stats;

mod link;

pub use error::{Result, WireError};
pub use link::{InboundStatus, LinkConfig, MessageLink};
pub use protocol::PACKET_SIZE;
pub use registry::{Category, Direction, Handler, MessageRegistry, RegistryBuilder};
pub use schema::{SchemaHandle, WireSchema};
pub use stats::LinkStats;
