//! IPC client — one request against a running host daemon.
//!
//! Connects to the host socket, performs the `hello` handshake, sends a
//! single `pick_document` or `resolve_path` request, and prints the
//! resolved path to stdout. The absence value prints nothing and maps
//! to a non-zero exit in `main`.

use futures::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio_util::codec::Framed;

use crate::cli::{ClientAction, none_if_empty};
use crate::host::resolve_socket_path;
use crate::ipc::codec::{CodecError, DecodeResult, FrameCodec, decode_frame};
use crate::ipc::protocol::{Message, PROTOCOL_VERSION, Status};

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("host: {0}")]
    Host(#[from] crate::host::HostError),
    #[error("cannot connect to host (is `docpickd serve` running?): {0}")]
    Connect(std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("host closed the connection")]
    Disconnected,
    #[error("handshake rejected: {0}")]
    HandshakeRejected(String),
    #[error("unexpected reply: {0:?}")]
    UnexpectedReply(Message),
    #[error("host is busy with another pick")]
    Busy,
    #[error("host error: {0}")]
    Rejected(String),
}

/// Run one client action. `Ok(Some(path))` is printed by the caller;
/// `Ok(None)` is the absence value.
pub async fn run(action: ClientAction) -> Result<Option<String>, ClientError> {
    let socket_path = resolve_socket_path()?;
    let stream = UnixStream::connect(&socket_path)
        .await
        .map_err(ClientError::Connect)?;
    let mut framed = Framed::new(stream, FrameCodec::new());

    // -- Handshake --
    let ack = round_trip(
        &mut framed,
        Message::Hello {
            id: 0,
            version: PROTOCOL_VERSION,
        },
    )
    .await?;
    match ack {
        Message::HelloAck {
            status: Status::Ok, ..
        } => {}
        Message::HelloAck { error, .. } => {
            return Err(ClientError::HandshakeRejected(
                error.unwrap_or_else(|| "unspecified".into()),
            ));
        }
        other => return Err(ClientError::UnexpectedReply(other)),
    }

    // -- Request --
    let request = match action {
        ClientAction::Pick {
            extensions,
            mime_types,
            invalid_symbols,
        } => Message::PickDocument {
            id: 1,
            allowed_extensions: none_if_empty(extensions),
            allowed_mime_types: none_if_empty(mime_types),
            invalid_name_symbols: none_if_empty(invalid_symbols),
        },
        ClientAction::Resolve { uri } => Message::ResolvePath { id: 1, uri },
    };

    match round_trip(&mut framed, request).await? {
        Message::Response {
            status: Status::Ok,
            path,
            ..
        } => Ok(path),
        Message::Response {
            status: Status::Busy,
            ..
        } => Err(ClientError::Busy),
        Message::Response { error, .. } => Err(ClientError::Rejected(
            error.unwrap_or_else(|| "unspecified".into()),
        )),
        other => Err(ClientError::UnexpectedReply(other)),
    }
}

async fn round_trip(
    framed: &mut Framed<UnixStream, FrameCodec>,
    msg: Message,
) -> Result<Message, ClientError> {
    framed.send(msg).await?;
    let frame = framed
        .next()
        .await
        .ok_or(ClientError::Disconnected)??;
    match decode_frame(&frame) {
        DecodeResult::Ok(msg) => Ok(msg),
        DecodeResult::UnknownType(envelope) => Err(ClientError::Rejected(format!(
            "unknown reply type {:?}",
            envelope.message_type
        ))),
        DecodeResult::Malformed(e) => Err(ClientError::Rejected(format!("malformed reply: {e}"))),
    }
}
