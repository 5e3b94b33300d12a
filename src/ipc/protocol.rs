//! Wire protocol message types for the host IPC surface.
//!
//! All messages are MessagePack-encoded maps with at minimum `type` and
//! `id` fields. The application shell connects, says `hello`, and then
//! sends one request at a time; the daemon answers each request id with
//! exactly one `response`.

use serde::{Deserialize, Serialize};

/// Protocol version spoken by this build.
pub const PROTOCOL_VERSION: u32 = 1;

/// Maximum frame payload. Requests carry option lists and URIs, never
/// file content, so 1 MiB is generous.
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// All wire protocol messages.
///
/// Serialized as a tagged union on the `type` field via MessagePack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Message {
    // -- Handshake --
    #[serde(rename = "hello")]
    Hello { id: u32, version: u32 },

    #[serde(rename = "hello_ack")]
    HelloAck {
        id: u32,
        status: Status,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    // -- Requests --
    #[serde(rename = "pick_document")]
    PickDocument {
        id: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        allowed_extensions: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        allowed_mime_types: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        invalid_name_symbols: Option<Vec<String>>,
    },

    #[serde(rename = "resolve_path")]
    ResolvePath { id: u32, uri: String },

    // -- Terminal response --
    #[serde(rename = "response")]
    Response {
        id: u32,
        status: Status,
        /// The resolved path. `None` with `Status::Ok` is the absence
        /// value: cancellation or a resolution failure.
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Message {
    pub fn id(&self) -> u32 {
        match self {
            Message::Hello { id, .. }
            | Message::HelloAck { id, .. }
            | Message::PickDocument { id, .. }
            | Message::ResolvePath { id, .. }
            | Message::Response { id, .. } => *id,
        }
    }
}

/// Response status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    /// A pick is already in flight; this request was rejected, the
    /// original one is unaffected.
    Busy,
    Error,
}

/// Fallback envelope for frames whose `type` this build doesn't know.
/// Lets the daemon echo the request id in an error response instead of
/// dropping the connection.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEnvelope {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub id: u32,
}

/// Build the error `response` for an unknown message type.
pub fn unknown_type_response(envelope: &RawEnvelope) -> Message {
    Message::Response {
        id: envelope.id,
        status: Status::Error,
        path: None,
        error: Some(format!("unknown message type {:?}", envelope.message_type)),
    }
}
