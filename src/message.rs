//! Known message kinds of the device management protocol.
//!
//! The kinds here cover the management subset a host uses to drive the
//! device: session setup, feature discovery, liveness, confirmation
//! prompts, and generic success/failure reports. Wire ids live in
//! [`msg_id`]; schema handles for the registry live in [`schemas`].

use serde::{Deserialize, Serialize};

/// Numeric wire ids for the known message kinds.
pub mod msg_id {
    pub const INITIALIZE: u16 = 0;
    pub const PING: u16 = 1;
    pub const SUCCESS: u16 = 2;
    pub const FAILURE: u16 = 3;
    pub const WIPE_DEVICE: u16 = 5;
    pub const FEATURES: u16 = 17;
    pub const BUTTON_REQUEST: u16 = 26;
    pub const BUTTON_ACK: u16 = 27;
    pub const GET_FEATURES: u16 = 55;
}

/// Session start. Resets device state and requests [`Features`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Initialize {
    /// Session to resume, if the host holds one.
    pub session_id: Option<serde_bytes::ByteBuf>,
}

/// Requests [`Features`] without resetting state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetFeatures {}

/// Device capability report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub vendor: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub patch_version: u32,
    pub device_id: Option<String>,
    pub label: Option<String>,
}

/// Liveness probe; the device answers with [`Success`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    pub message: String,
    /// Require a physical confirmation before answering.
    pub button_protection: bool,
}

/// Generic positive completion report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Success {
    pub message: String,
}

/// Failure classification carried by [`Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    UnexpectedMessage,
    ButtonExpected,
    DataError,
    ProcessError,
}

/// Generic negative completion report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

/// Erase all device state. Destructive; always button-protected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WipeDevice {}

/// Device asks the host to prompt for a physical confirmation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonRequest {
    pub code: u32,
}

/// Host acknowledges a [`ButtonRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonAck {}

/// Tagged union over every known message kind.
///
/// Handlers receive this enum, so matching on a kind is checked for
/// exhaustiveness at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Initialize(Initialize),
    GetFeatures(GetFeatures),
    Features(Features),
    Ping(Ping),
    Success(Success),
    Failure(Failure),
    WipeDevice(WipeDevice),
    ButtonRequest(ButtonRequest),
    ButtonAck(ButtonAck),
}

impl Message {
    /// Kind name for errors and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Message::Initialize(_) => "Initialize",
            Message::GetFeatures(_) => "GetFeatures",
            Message::Features(_) => "Features",
            Message::Ping(_) => "Ping",
            Message::Success(_) => "Success",
            Message::Failure(_) => "Failure",
            Message::WipeDevice(_) => "WipeDevice",
            Message::ButtonRequest(_) => "ButtonRequest",
            Message::ButtonAck(_) => "ButtonAck",
        }
    }
}

/// Schema handle constructors, one per message kind.
///
/// Each handle wraps the kind's payload type in [`Message`] on decode and
/// unwraps it on encode.
pub mod schemas {
    use super::*;
    use crate::schema::{MsgPackSchema, SchemaHandle};

    pub fn initialize() -> SchemaHandle {
        MsgPackSchema::handle("Initialize", Message::Initialize, |m| match m {
            Message::Initialize(p) => Some(p),
            _ => None,
        })
    }

    pub fn get_features() -> SchemaHandle {
        MsgPackSchema::handle("GetFeatures", Message::GetFeatures, |m| match m {
            Message::GetFeatures(p) => Some(p),
            _ => None,
        })
    }

    pub fn features() -> SchemaHandle {
        MsgPackSchema::handle("Features", Message::Features, |m| match m {
            Message::Features(p) => Some(p),
            _ => None,
        })
    }

    pub fn ping() -> SchemaHandle {
        MsgPackSchema::handle("Ping", Message::Ping, |m| match m {
            Message::Ping(p) => Some(p),
            _ => None,
        })
    }

    pub fn success() -> SchemaHandle {
        MsgPackSchema::handle("Success", Message::Success, |m| match m {
            Message::Success(p) => Some(p),
            _ => None,
        })
    }

    pub fn failure() -> SchemaHandle {
        MsgPackSchema::handle("Failure", Message::Failure, |m| match m {
            Message::Failure(p) => Some(p),
            _ => None,
        })
    }

    pub fn wipe_device() -> SchemaHandle {
        MsgPackSchema::handle("WipeDevice", Message::WipeDevice, |m| match m {
            Message::WipeDevice(p) => Some(p),
            _ => None,
        })
    }

    pub fn button_request() -> SchemaHandle {
        MsgPackSchema::handle("ButtonRequest", Message::ButtonRequest, |m| match m {
            Message::ButtonRequest(p) => Some(p),
            _ => None,
        })
    }

    pub fn button_ack() -> SchemaHandle {
        MsgPackSchema::handle("ButtonAck", Message::ButtonAck, |m| match m {
            Message::ButtonAck(p) => Some(p),
            _ => None,
        })
    }
}
