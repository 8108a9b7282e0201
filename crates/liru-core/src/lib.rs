//! liru core: transport-agnostic primitives for GPU texture sharing.
//!
//! This crate defines the error surface, the opaque texture types, the
//! injected transport capability, and the timing and validation helpers
//! shared by the sender and receiver sessions. It carries no transport or
//! graphics dependencies so sessions can be exercised against a fake
//! transport with no GPU context.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible
//! path surfaces as `LiruError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod texture;
pub mod timing;
pub mod transport;
pub mod validate;

pub use error::{ErrorCode, LiruError, Operation, Result, Role, TransportFault};
pub use texture::{FrameSize, NativeHandle, TextureFormat};
pub use transport::{ReceiverTransport, RemoteFrame, SenderTransport, TransportResult};
