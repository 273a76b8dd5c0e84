//! Message registry: schema lookup and handler dispatch.
//!
//! The registry is an ordered, immutable table of descriptors built once at
//! startup by [`RegistryBuilder`]. Lookup is a first-match linear scan over
//! the table keyed by (category, direction, message id); the table is small
//! enough that the scan beats any map for this workload.

use tracing::trace;

use crate::error::{Result, WireError};
use crate::message::Message;
use crate::schema::SchemaHandle;

/// Message namespace. Only `Normal` has an output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Normal,
    Debug,
}

/// Direction relative to the device: inbound packets come from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Handler invoked with a decoded inbound message.
pub type Handler = Box<dyn Fn(&Message) + Send + Sync>;

/// One registry entry: key, schema handle, and an optional handler.
///
/// Outbound entries and schema-only inbound entries carry no handler.
pub struct MessageDescriptor {
    category: Category,
    direction: Direction,
    msg_id: u16,
    schema: SchemaHandle,
    handler: Option<Handler>,
}

/// Builder for the immutable descriptor table.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<MessageDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an inbound message with its handler.
    pub fn inbound<F>(self, category: Category, msg_id: u16, schema: SchemaHandle, handler: F) -> Self
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.entry(
            category,
            Direction::Inbound,
            msg_id,
            schema,
            Some(Box::new(handler)),
        )
    }

    /// Register an inbound message for schema lookup only.
    pub fn inbound_schema(self, category: Category, msg_id: u16, schema: SchemaHandle) -> Self {
        self.entry(category, Direction::Inbound, msg_id, schema, None)
    }

    /// Register an outbound message. Outbound entries never carry handlers;
    /// they exist so the frame encoder can resolve a schema.
    pub fn outbound(self, category: Category, msg_id: u16, schema: SchemaHandle) -> Self {
        self.entry(category, Direction::Outbound, msg_id, schema, None)
    }

    fn entry(
        mut self,
        category: Category,
        direction: Direction,
        msg_id: u16,
        schema: SchemaHandle,
        handler: Option<Handler>,
    ) -> Self {
        self.entries.push(MessageDescriptor {
            category,
            direction,
            msg_id,
            schema,
            handler,
        });
        self
    }

    /// Build the registry, rejecting duplicate (category, direction, id)
    /// keys.
    pub fn build(self) -> Result<MessageRegistry> {
        for (i, entry) in self.entries.iter().enumerate() {
            for earlier in &self.entries[..i] {
                if entry.category == earlier.category
                    && entry.direction == earlier.direction
                    && entry.msg_id == earlier.msg_id
                {
                    return Err(WireError::DuplicateDescriptor {
                        category: entry.category,
                        direction: entry.direction,
                        msg_id: entry.msg_id,
                    });
                }
            }
        }
        Ok(MessageRegistry {
            entries: self.entries,
        })
    }
}

/// Immutable descriptor table. Never mutated after [`RegistryBuilder::build`].
pub struct MessageRegistry {
    entries: Vec<MessageDescriptor>,
}

impl MessageRegistry {
    fn find(&self, category: Category, direction: Direction, msg_id: u16) -> Option<&MessageDescriptor> {
        self.entries
            .iter()
            .find(|e| e.category == category && e.direction == direction && e.msg_id == msg_id)
    }

    /// Resolve the schema handle for a message key.
    ///
    /// Returns the same handle for every call with the same key.
    pub fn resolve_schema(
        &self,
        category: Category,
        direction: Direction,
        msg_id: u16,
    ) -> Option<&SchemaHandle> {
        self.find(category, direction, msg_id).map(|e| &e.schema)
    }

    /// Invoke the registered handler with a decoded message.
    ///
    /// A key with no handler is a silent no-op: the table intentionally
    /// registers some ids for schema lookup alone (outbound replies, debug
    /// mirrors), and dispatching to those must not be an error.
    pub fn dispatch(&self, category: Category, direction: Direction, msg_id: u16, msg: &Message) {
        if let Some(handler) = self.find(category, direction, msg_id).and_then(|e| e.handler.as_ref()) {
            trace!(msg_id, kind = msg.kind_name(), "dispatching message");
            handler(msg);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
