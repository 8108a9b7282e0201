//! Subscribing session.
//!
//! Unlike the sender, a receiver connects lazily: construction never fails
//! and never checks that a publisher exists. The first successful `receive`
//! establishes the connection. Width, height and the active sender name are
//! derived from the last successful exchange only, so a failed call leaves
//! them exactly as they were.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use liru_core::error::{LiruError, Operation, Result, Role};
use liru_core::timing::{measure, Clock, MonotonicClock};
use liru_core::validate::{validate_nonempty, validate_nonzero_handle};
use liru_core::{FrameSize, ReceiverTransport, RemoteFrame, TextureFormat};

use crate::config::ReceiverSection;
use crate::obs::SessionMetrics;
use crate::stats::PerformanceSample;

const ROLE: &str = "receiver";

pub struct Receiver<T: ReceiverTransport, C: Clock = MonotonicClock> {
    transport: Option<T>,
    format: TextureFormat,
    clock: C,

    active_sender: String,
    size: Option<FrameSize>,
    initialized: bool,

    last_receive_time_ms: f64,
    frames_received: u64,

    metrics: Option<Arc<SessionMetrics>>,
}

impl<T: ReceiverTransport> Receiver<T> {
    /// An empty `target` attaches to any available publisher.
    pub fn new(transport: T, target: &str) -> Self {
        Self::open(transport, target, TextureFormat::default(), MonotonicClock)
    }

    pub fn from_config(transport: T, cfg: &ReceiverSection) -> Self {
        Self::open(transport, &cfg.target, cfg.format, MonotonicClock)
    }
}

impl<T: ReceiverTransport, C: Clock> Receiver<T, C> {
    pub fn open(mut transport: T, target: &str, format: TextureFormat, clock: C) -> Self {
        if !target.is_empty() {
            transport.select_target(target);
        }
        tracing::debug!(target_sender = %target, format = format.as_str(), "receiver created");

        Self {
            transport: Some(transport),
            format,
            clock,
            active_sender: target.to_string(),
            size: None,
            initialized: false,
            last_receive_time_ms: 0.0,
            frames_received: 0,
            metrics: None,
        }
    }

    /// Attach shared metrics, replacing any registry attached before.
    pub fn with_metrics(mut self, metrics: Arc<SessionMetrics>) -> Self {
        if self.transport.is_some() {
            if let Some(prev) = &self.metrics {
                prev.sessions_active.dec(&[("role", ROLE)]);
            }
            metrics.sessions_active.inc(&[("role", ROLE)]);
        }
        self.metrics = Some(metrics);
        self
    }

    /// Copy the current publisher's latest frame into `texture_id`.
    ///
    /// Returns the publisher's current `(width, height)`, which follows the
    /// publisher if it was resized. Latency is updated whether or not the
    /// transport succeeds.
    pub fn receive(&mut self, texture_id: u64) -> Result<(u32, u32)> {
        let handle = match validate_nonzero_handle(texture_id) {
            Ok(h) => h,
            Err(e) => {
                self.count("usage_error");
                return Err(e);
            }
        };
        let Some(transport) = self.transport.as_mut() else {
            self.count("usage_error");
            return Err(LiruError::Released(Role::Receiver));
        };

        let format = self.format;
        let timed = measure(&self.clock, || transport.copy_in(handle, format));

        self.last_receive_time_ms = timed.elapsed_ms;
        self.observe(timed.elapsed_ms);

        let frame = match timed.value {
            Ok(frame) => frame,
            Err(fault) => {
                self.count("transport_error");
                tracing::debug!(target_sender = %self.active_sender, error = %fault, "receive failed");
                return Err(LiruError::transport(Operation::Receive, fault));
            }
        };

        if frame.sender_name != self.active_sender {
            tracing::info!(from = %self.active_sender, to = %frame.sender_name, "active sender changed");
            self.active_sender = frame.sender_name;
        }
        if let Some(prev) = self.size.filter(|s| *s != frame.size) {
            tracing::info!(sender = %self.active_sender, from = %prev, to = %frame.size, "sender resized");
        }
        self.size = Some(frame.size);
        self.initialized = true;
        self.frames_received += 1;
        self.count("ok");
        tracing::trace!(sender = %self.active_sender, %handle, latency_ms = timed.elapsed_ms, "frame received");

        Ok((frame.size.width, frame.size.height))
    }

    /// Peek whether a newer frame is waiting. Does not consume it.
    pub fn is_updated(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_updated())
    }

    /// Name and dimensions the current target would deliver, without
    /// receiving. Leaves size, identity and the initialized flag untouched.
    pub fn query_sender_info(&self) -> Option<RemoteFrame> {
        self.transport.as_ref().and_then(|t| t.query_sender())
    }

    /// Switch to `name`. Whether it exists is only known at the next `receive`.
    pub fn select_sender(&mut self, name: &str) -> Result<()> {
        let name = validate_nonempty(name)?;
        let transport = self
            .transport
            .as_mut()
            .ok_or(LiruError::Released(Role::Receiver))?;

        transport.select_target(name);
        tracing::debug!(from = %self.active_sender, to = %name, "sender selected");
        self.active_sender = name.to_string();
        Ok(())
    }

    /// Names currently published. Empty after release.
    pub fn sender_list(&self) -> Vec<String> {
        self.transport
            .as_ref()
            .map(|t| t.list_publishers())
            .unwrap_or_default()
    }

    pub fn release(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.release();
            if let Some(m) = &self.metrics {
                m.sessions_active.dec(&[("role", ROLE)]);
            }
            tracing::debug!(sender = %self.active_sender, frames = self.frames_received, "receiver released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.transport.is_none()
    }

    /// Whether at least one `receive` has ever succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Empty until a target is selected or a frame is received.
    pub fn active_sender(&self) -> &str {
        &self.active_sender
    }

    /// Zero before the first successful receive.
    pub fn width(&self) -> u32 {
        self.size.map_or(0, |s| s.width)
    }

    pub fn height(&self) -> u32 {
        self.size.map_or(0, |s| s.height)
    }

    pub fn size(&self) -> Option<FrameSize> {
        self.size
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn last_receive_time_ms(&self) -> f64 {
        self.last_receive_time_ms
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    pub fn stats(&self) -> PerformanceSample {
        PerformanceSample {
            last_operation_latency_ms: self.last_receive_time_ms,
            rolling_rate: None,
            frames: self.frames_received,
        }
    }

    fn count(&self, outcome: &str) {
        if let Some(m) = &self.metrics {
            m.frames.inc(&[("role", ROLE), ("outcome", outcome)]);
        }
    }

    fn observe(&self, elapsed_ms: f64) {
        if let Some(m) = &self.metrics {
            let d = Duration::try_from_secs_f64(elapsed_ms / 1000.0).unwrap_or_default();
            m.exchange_duration.observe(&[("role", ROLE)], d);
        }
    }
}

impl<T: ReceiverTransport, C: Clock> Drop for Receiver<T, C> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: ReceiverTransport, C: Clock> fmt::Display for Receiver<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sender = if self.active_sender.is_empty() {
            "not connected"
        } else {
            self.active_sender.as_str()
        };
        write!(f, "Receiver(sender='{}', size={}x{})", sender, self.width(), self.height())
    }
}

impl<T: ReceiverTransport, C: Clock> fmt::Debug for Receiver<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("active_sender", &self.active_sender)
            .field("size", &self.size)
            .field("initialized", &self.initialized)
            .field("released", &self.is_released())
            .field("frames_received", &self.frames_received)
            .finish()
    }
}
