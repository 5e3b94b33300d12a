//! Host daemon — the boundary the application shell talks to.
//!
//! Channel-based actor: the host loop accepts shell connections on a
//! Unix domain socket, receives requests from per-connection tasks over
//! mpsc, and spawns pick/resolve work. Completions come back to the
//! loop before the terminal response is released, so every request id
//! gets exactly one response. The single-flight pick guard lives in the
//! orchestrator; a concurrent `pick_document` is answered `busy`.

mod connection;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};

use crate::ipc::protocol::{Message, Status};
use crate::picker::{Orchestrator, PickError, PickOptions};

use connection::{HostCommand, spawn_connection};

/// Host startup/runtime errors.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("$XDG_RUNTIME_DIR is not set")]
    NoRuntimeDir,
    #[error("host already running at {0}")]
    AlreadyRunning(PathBuf),
    #[error("failed to create directory {path}: {source}")]
    MkdirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to bind socket {path}: {source}")]
    BindFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default socket path: `$XDG_RUNTIME_DIR/docpick/host.sock`.
pub fn resolve_socket_path() -> Result<PathBuf, HostError> {
    let runtime_dir = std::env::var_os("XDG_RUNTIME_DIR").ok_or(HostError::NoRuntimeDir)?;
    Ok(PathBuf::from(runtime_dir).join("docpick").join("host.sock"))
}

/// Run the host daemon until SIGTERM or SIGINT.
pub async fn run(orchestrator: Arc<Orchestrator>) -> Result<(), HostError> {
    let socket_path = resolve_socket_path()?;
    let listener = bind_socket(&socket_path).await?;
    tracing::info!(path = %socket_path.display(), "host listening");

    let result = serve(listener, orchestrator, shutdown_signal()).await;

    // Best effort; the socket dir may already be gone.
    let _ = std::fs::remove_file(&socket_path);
    result
}

/// Accept/dispatch loop, separated from socket setup for testing.
pub async fn serve(
    listener: UnixListener,
    orchestrator: Arc<Orchestrator>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), HostError> {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<HostCommand>();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // -- New shell connection --
            result = listener.accept() => {
                match result {
                    Ok((stream, _addr)) => spawn_connection(stream, cmd_tx.clone()),
                    Err(e) => tracing::warn!(error = %e, "accept failed"),
                }
            }

            // -- Request from a connection task --
            Some(cmd) = cmd_rx.recv() => {
                dispatch(&orchestrator, cmd, &done_tx);
            }

            // -- Completed pick/resolve --
            Some(done) = done_rx.recv() => {
                // The requesting connection may have gone away; the
                // response is then dropped with it.
                let _ = done.response_tx.send(done.response);
            }

            _ = &mut shutdown => {
                tracing::info!("shutting down");
                return Ok(());
            }
        }
    }
}

/// A finished request on its way back to the wire.
struct Completion {
    response_tx: oneshot::Sender<Message>,
    response: Message,
}

/// Start the work for one request. Long-running operations are spawned;
/// their completions are marshaled back through `done_tx`.
fn dispatch(
    orchestrator: &Arc<Orchestrator>,
    cmd: HostCommand,
    done_tx: &mpsc::UnboundedSender<Completion>,
) {
    let done_tx = done_tx.clone();
    match cmd.request {
        Message::PickDocument {
            id,
            allowed_extensions,
            allowed_mime_types,
            invalid_name_symbols,
        } => {
            let orchestrator = Arc::clone(orchestrator);
            let options = PickOptions {
                allowed_extensions,
                allowed_mime_types,
                invalid_name_symbols,
            };
            tokio::spawn(async move {
                let response = match orchestrator.pick(options).await {
                    Ok(doc) => ok_response(id, Some(doc.path)),
                    Err(PickError::PickInFlight) => Message::Response {
                        id,
                        status: Status::Busy,
                        path: None,
                        error: None,
                    },
                    Err(e) => {
                        tracing::info!(error = %e, "pick ended without a path");
                        ok_response(id, None)
                    }
                };
                let _ = done_tx.send(Completion {
                    response_tx: cmd.response_tx,
                    response,
                });
            });
        }

        Message::ResolvePath { id, uri } => {
            let orchestrator = Arc::clone(orchestrator);
            tokio::spawn(async move {
                let response = match orchestrator.resolve_uri(&uri).await {
                    Ok(path) => ok_response(id, Some(path)),
                    Err(e) => {
                        tracing::info!(uri = %uri, error = %e, "resolution failed");
                        ok_response(id, None)
                    }
                };
                let _ = done_tx.send(Completion {
                    response_tx: cmd.response_tx,
                    response,
                });
            });
        }

        // hello is consumed by the connection task; anything else here
        // is a client speaking the wrong direction of the protocol.
        other => {
            let _ = cmd.response_tx.send(Message::Response {
                id: other.id(),
                status: Status::Error,
                path: None,
                error: Some("unexpected message".into()),
            });
        }
    }
}

fn ok_response(id: u32, path: Option<String>) -> Message {
    Message::Response {
        id,
        status: Status::Ok,
        path,
        error: None,
    }
}

async fn shutdown_signal() {
    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
    {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to install SIGTERM handler");
            return std::future::pending().await;
        }
    };
    let mut sigint = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
    {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to install SIGINT handler");
            return std::future::pending().await;
        }
    };
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}

async fn bind_socket(path: &std::path::Path) -> Result<UnixListener, HostError> {
    let dir = path.parent().expect("socket path has a parent");
    std::fs::create_dir_all(dir).map_err(|e| HostError::MkdirFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;
    // Keep the socket dir private to the owner, even if it pre-existed
    // with looser permissions.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)).map_err(|e| {
            HostError::MkdirFailed {
                path: dir.to_path_buf(),
                source: e,
            }
        })?;
    }

    // Stale socket: probe it; a live host wins, a dead file is removed.
    if path.exists() {
        match UnixStream::connect(path).await {
            Ok(_) => return Err(HostError::AlreadyRunning(path.to_path_buf())),
            Err(_) => {
                std::fs::remove_file(path)?;
            }
        }
    }

    UnixListener::bind(path).map_err(|e| HostError::BindFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
