//! Shared-texture transport capability, injected into each session.
//!
//! Each session owns one endpoint. Endpoints may share process-wide state
//! (for example a publisher name registry) but sessions never share state
//! with each other. Calls are synchronous: a hang here is a hang in the
//! session.

use crate::error::TransportFault;
use crate::texture::{FrameSize, NativeHandle, TextureFormat};

/// Result type returned by transport endpoints.
pub type TransportResult<T> = std::result::Result<T, TransportFault>;

/// What the transport reports after a successful copy-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFrame {
    /// Name of the publisher the frame came from.
    pub sender_name: String,
    /// The publisher's current size, which may differ from the previous frame.
    pub size: FrameSize,
}

/// Publishing endpoint.
pub trait SenderTransport {
    /// Register `name` in the machine-wide registry.
    fn publish(&mut self, name: &str, size: FrameSize, format: TextureFormat) -> TransportResult<()>;

    /// Share the contents of `handle` under the published name.
    fn copy_out(
        &mut self,
        handle: NativeHandle,
        format: TextureFormat,
        size: FrameSize,
    ) -> TransportResult<()>;

    /// Tear down the published slot. Must tolerate repeated calls.
    fn release(&mut self);
}

/// Subscribing endpoint.
pub trait ReceiverTransport {
    /// Switch the attachment target. Existence is not checked here.
    fn select_target(&mut self, name: &str);

    /// Copy the latest frame of the current target into `handle`.
    fn copy_in(&mut self, handle: NativeHandle, format: TextureFormat) -> TransportResult<RemoteFrame>;

    /// Whether a frame newer than the last copy-in is ready. Never consumes it.
    fn is_updated(&self) -> bool;

    /// Name and declared size of the current target without copying a
    /// frame. `None` when nothing resolves.
    fn query_sender(&self) -> Option<RemoteFrame>;

    /// Names currently registered. Order is transport-defined.
    fn list_publishers(&self) -> Vec<String>;

    fn release(&mut self);
}

impl<T: SenderTransport + ?Sized> SenderTransport for Box<T> {
    fn publish(&mut self, name: &str, size: FrameSize, format: TextureFormat) -> TransportResult<()> {
        (**self).publish(name, size, format)
    }

    fn copy_out(
        &mut self,
        handle: NativeHandle,
        format: TextureFormat,
        size: FrameSize,
    ) -> TransportResult<()> {
        (**self).copy_out(handle, format, size)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

impl<T: ReceiverTransport + ?Sized> ReceiverTransport for Box<T> {
    fn select_target(&mut self, name: &str) {
        (**self).select_target(name)
    }

    fn copy_in(&mut self, handle: NativeHandle, format: TextureFormat) -> TransportResult<RemoteFrame> {
        (**self).copy_in(handle, format)
    }

    fn is_updated(&self) -> bool {
        (**self).is_updated()
    }

    fn query_sender(&self) -> Option<RemoteFrame> {
        (**self).query_sender()
    }

    fn list_publishers(&self) -> Vec<String> {
        (**self).list_publishers()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
