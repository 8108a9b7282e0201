//! In-process loopback transport.
//!
//! `LoopbackHub` is a publisher name registry shared by any number of
//! endpoints in one process. No pixels move: a copy-out records the handle
//! and size under the published name, and a copy-in reports them back. It
//! backs the demo binary and the integration tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use liru_core::error::TransportFault;
use liru_core::{
    FrameSize, NativeHandle, ReceiverTransport, RemoteFrame, SenderTransport, TextureFormat,
    TransportResult,
};

#[derive(Clone)]
struct Slot {
    owner: u64,
    created_seq: u64,
    size: FrameSize,
    format: TextureFormat,
    frame_seq: u64,
    last_handle: Option<NativeHandle>,
}

/// Registry:
/// - `publisher name -> Slot`
pub struct LoopbackHub {
    slots: DashMap<String, Slot>,
    seq: AtomicU64,
}

impl Default for LoopbackHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn sender(self: &Arc<Self>) -> LoopbackSender {
        LoopbackSender {
            hub: Arc::clone(self),
            id: self.next_seq(),
            name: None,
        }
    }

    pub fn receiver(self: &Arc<Self>) -> LoopbackReceiver {
        LoopbackReceiver {
            hub: Arc::clone(self),
            target: None,
            last_seen: None,
        }
    }

    pub fn publisher_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of frames copied out under `name` so far.
    pub fn frame_seq(&self, name: &str) -> Option<u64> {
        self.slots.get(name).map(|s| s.frame_seq)
    }

    /// Handle passed to the most recent copy-out under `name`.
    pub fn last_handle(&self, name: &str) -> Option<NativeHandle> {
        self.slots.get(name).and_then(|s| s.last_handle)
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Named slot, or the oldest registered one when `name` is `None`.
    fn resolve(&self, name: Option<&str>) -> Option<(String, Slot)> {
        match name {
            Some(n) => self.slots.get(n).map(|s| (n.to_string(), s.value().clone())),
            None => self
                .slots
                .iter()
                .min_by_key(|r| r.value().created_seq)
                .map(|r| (r.key().clone(), r.value().clone())),
        }
    }
}

/// Publishing endpoint. Owns at most one slot.
pub struct LoopbackSender {
    hub: Arc<LoopbackHub>,
    id: u64,
    name: Option<String>,
}

impl SenderTransport for LoopbackSender {
    fn publish(&mut self, name: &str, size: FrameSize, format: TextureFormat) -> TransportResult<()> {
        if self.name.is_some() {
            self.release();
        }
        match self.hub.slots.entry(name.to_string()) {
            Entry::Occupied(_) => Err(TransportFault::NameInUse(name.to_string())),
            Entry::Vacant(v) => {
                v.insert(Slot {
                    owner: self.id,
                    created_seq: self.hub.next_seq(),
                    size,
                    format,
                    frame_seq: 0,
                    last_handle: None,
                });
                self.name = Some(name.to_string());
                Ok(())
            }
        }
    }

    fn copy_out(
        &mut self,
        handle: NativeHandle,
        format: TextureFormat,
        size: FrameSize,
    ) -> TransportResult<()> {
        let name = self.name.as_deref().ok_or(TransportFault::NotPublished)?;
        let mut slot = self
            .hub
            .slots
            .get_mut(name)
            .filter(|s| s.owner == self.id)
            .ok_or(TransportFault::NotPublished)?;

        slot.size = size;
        slot.format = format;
        slot.last_handle = Some(handle);
        slot.frame_seq += 1;
        Ok(())
    }

    fn release(&mut self) {
        if let Some(name) = self.name.take() {
            let owner = self.id;
            self.hub.slots.remove_if(&name, |_, s| s.owner == owner);
        }
    }
}

impl Drop for LoopbackSender {
    fn drop(&mut self) {
        self.release();
    }
}

/// Subscribing endpoint.
pub struct LoopbackReceiver {
    hub: Arc<LoopbackHub>,
    target: Option<String>,
    /// `(slot created_seq, frame_seq)` consumed by the last copy-in. A slot
    /// re-published under the same name is a different slot.
    last_seen: Option<(u64, u64)>,
}

impl ReceiverTransport for LoopbackReceiver {
    fn select_target(&mut self, name: &str) {
        self.target = Some(name.to_string());
    }

    fn copy_in(&mut self, _handle: NativeHandle, format: TextureFormat) -> TransportResult<RemoteFrame> {
        let (name, slot) = self
            .hub
            .resolve(self.target.as_deref())
            .ok_or_else(|| TransportFault::NoPublisher(self.target.clone()))?;

        if slot.frame_seq == 0 {
            return Err(TransportFault::Failed(format!(
                "publisher {name} has not sent a frame yet"
            )));
        }
        if slot.format != format {
            tracing::trace!(
                publisher = %name,
                published = slot.format.as_str(),
                requested = format.as_str(),
                "format mismatch passed through"
            );
        }

        self.last_seen = Some((slot.created_seq, slot.frame_seq));
        Ok(RemoteFrame {
            sender_name: name,
            size: slot.size,
        })
    }

    fn is_updated(&self) -> bool {
        let Some((_, slot)) = self.hub.resolve(self.target.as_deref()) else {
            return false;
        };
        match self.last_seen {
            Some((created, seq)) if created == slot.created_seq => slot.frame_seq > seq,
            _ => slot.frame_seq > 0,
        }
    }

    fn query_sender(&self) -> Option<RemoteFrame> {
        self.hub
            .resolve(self.target.as_deref())
            .map(|(name, slot)| RemoteFrame {
                sender_name: name,
                size: slot.size,
            })
    }

    fn list_publishers(&self) -> Vec<String> {
        self.hub.slots.iter().map(|r| r.key().clone()).collect()
    }

    fn release(&mut self) {
        self.target = None;
        self.last_seen = None;
    }
}
