//! IPC layer — wire protocol messages and framing codec.

pub mod codec;
pub mod protocol;
