//! Per-connection task — framed I/O, handshake, request forwarding.
//!
//! Each shell connection spawns a tokio task that wraps the socket in
//! the frame codec, validates the `hello` handshake, and then forwards
//! one request at a time to the host loop, relaying the single response
//! for each request id back over the wire.

use futures::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, oneshot};
use tokio_util::codec::Framed;

use crate::ipc::codec::{CodecError, DecodeResult, FrameCodec, decode_frame};
use crate::ipc::protocol::{Message, PROTOCOL_VERSION, Status, unknown_type_response};

/// Request sent from a connection task to the host loop.
#[derive(Debug)]
pub struct HostCommand {
    pub request: Message,
    pub response_tx: oneshot::Sender<Message>,
}

/// Connection-level errors.
#[derive(Debug, thiserror::Error)]
enum ConnectionError {
    #[error("unexpected EOF during handshake")]
    HandshakeEof,
    #[error("first message must be hello")]
    NotHello,
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("host loop closed")]
    HostGone,
    #[error("response channel closed")]
    ResponseDropped,
}

/// Spawn a connection handler task.
pub fn spawn_connection(stream: UnixStream, cmd_tx: mpsc::UnboundedSender<HostCommand>) {
    tokio::spawn(async move {
        if let Err(e) = handle_connection(stream, cmd_tx).await {
            tracing::debug!(error = %e, "connection closed");
        }
    });
}

async fn handle_connection(
    stream: UnixStream,
    cmd_tx: mpsc::UnboundedSender<HostCommand>,
) -> Result<(), ConnectionError> {
    let mut framed = Framed::new(stream, FrameCodec::new());

    // -- Handshake: first message must be hello --
    let first_frame = framed.next().await.ok_or(ConnectionError::HandshakeEof)??;
    let hello_id = match decode_frame(&first_frame) {
        DecodeResult::Ok(Message::Hello { id, version }) => {
            if version != PROTOCOL_VERSION {
                framed
                    .send(Message::HelloAck {
                        id,
                        status: Status::Error,
                        error: Some(format!(
                            "unsupported protocol version {version} (want {PROTOCOL_VERSION})"
                        )),
                    })
                    .await?;
                return Ok(());
            }
            id
        }
        _ => return Err(ConnectionError::NotHello),
    };
    framed
        .send(Message::HelloAck {
            id: hello_id,
            status: Status::Ok,
            error: None,
        })
        .await?;

    // -- Request loop: one in flight per connection --
    while let Some(frame) = framed.next().await {
        let frame = frame?;
        let response = match decode_frame(&frame) {
            DecodeResult::Ok(request) => {
                let (response_tx, response_rx) = oneshot::channel();
                cmd_tx
                    .send(HostCommand {
                        request,
                        response_tx,
                    })
                    .map_err(|_| ConnectionError::HostGone)?;
                response_rx
                    .await
                    .map_err(|_| ConnectionError::ResponseDropped)?
            }
            DecodeResult::UnknownType(envelope) => unknown_type_response(&envelope),
            DecodeResult::Malformed(e) => {
                tracing::debug!(error = %e, "malformed frame, closing connection");
                return Ok(());
            }
        };
        framed.send(response).await?;
    }

    Ok(())
}
