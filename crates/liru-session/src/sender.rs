//! Publishing session.
//!
//! A sender registers its name with the transport eagerly, at construction,
//! so a name collision surfaces from `Sender::new` rather than from the first
//! frame. Its frame size is declared up front and never changes.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use liru_core::error::{LiruError, Operation, Result, Role};
use liru_core::timing::{measure, Clock, MonotonicClock};
use liru_core::validate::{validate_nonempty, validate_nonzero_handle, validate_positive_dims};
use liru_core::{FrameSize, SenderTransport, TextureFormat};

use crate::config::SenderSection;
use crate::obs::SessionMetrics;
use crate::stats::PerformanceSample;

const ROLE: &str = "sender";

pub struct Sender<T: SenderTransport, C: Clock = MonotonicClock> {
    /// `None` once released.
    transport: Option<T>,
    name: String,
    size: FrameSize,
    format: TextureFormat,
    clock: C,

    fps: f64,
    last_send_time_ms: f64,
    frame_count: u64,
    last_attempt: Option<Instant>,

    metrics: Option<Arc<SessionMetrics>>,
}

impl<T: SenderTransport> Sender<T> {
    /// Validate, then register `name` with the transport.
    ///
    /// Fails with a usage error before the transport is touched if `name` is
    /// empty or either dimension is not positive.
    pub fn new(transport: T, name: &str, width: i64, height: i64) -> Result<Self> {
        Self::open(transport, name, width, height, TextureFormat::default(), MonotonicClock)
    }

    pub fn from_config(transport: T, cfg: &SenderSection) -> Result<Self> {
        Self::open(transport, &cfg.name, cfg.width, cfg.height, cfg.format, MonotonicClock)
    }
}

impl<T: SenderTransport, C: Clock> Sender<T, C> {
    pub fn open(
        mut transport: T,
        name: &str,
        width: i64,
        height: i64,
        format: TextureFormat,
        clock: C,
    ) -> Result<Self> {
        let name = validate_nonempty(name)?;
        let size = validate_positive_dims(width, height)?;

        transport
            .publish(name, size, format)
            .map_err(|fault| LiruError::transport(Operation::Publish, fault))?;

        tracing::debug!(sender = %name, %size, format = format.as_str(), "sender published");

        Ok(Self {
            transport: Some(transport),
            name: name.to_string(),
            size,
            format,
            clock,
            fps: 0.0,
            last_send_time_ms: 0.0,
            frame_count: 0,
            last_attempt: None,
            metrics: None,
        })
    }

    /// Attach shared metrics. Counts this session as active until release.
    /// A registry attached earlier stops counting it.
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

    /// Share one frame from `texture_id`.
    ///
    /// Latency is updated on every call that reaches the transport. The
    /// frame counter and `fps` only move on success; `fps` is the reciprocal
    /// of the interval since the previous attempt, successful or not, and
    /// stays at zero until there is a previous attempt to measure from.
    pub fn send(&mut self, texture_id: u64) -> Result<bool> {
        let handle = match validate_nonzero_handle(texture_id) {
            Ok(h) => h,
            Err(e) => {
                self.count("usage_error");
                return Err(e);
            }
        };
        let Some(transport) = self.transport.as_mut() else {
            self.count("usage_error");
            return Err(LiruError::Released(Role::Sender));
        };

        let (format, size) = (self.format, self.size);
        let timed = measure(&self.clock, || transport.copy_out(handle, format, size));

        self.last_send_time_ms = timed.elapsed_ms;
        self.observe(timed.elapsed_ms);
        let previous = self.last_attempt.replace(timed.finished_at);

        match timed.value {
            Ok(()) => {
                self.frame_count += 1;
                if let Some(prev) = previous {
                    let secs = timed.finished_at.saturating_duration_since(prev).as_secs_f64();
                    if secs > 0.0 {
                        self.fps = 1.0 / secs;
                    }
                }
                self.count("ok");
                tracing::trace!(sender = %self.name, %handle, latency_ms = timed.elapsed_ms, "frame sent");
                Ok(true)
            }
            Err(fault) => {
                self.count("transport_error");
                tracing::debug!(sender = %self.name, error = %fault, "send failed");
                Err(LiruError::transport(Operation::Send, fault))
            }
        }
    }

    /// Tear down the published slot. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.release();
            if let Some(m) = &self.metrics {
                m.sessions_active.dec(&[("role", ROLE)]);
            }
            tracing::debug!(sender = %self.name, frames = self.frame_count, "sender released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.transport.is_none()
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn last_send_time_ms(&self) -> f64 {
        self.last_send_time_ms
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn stats(&self) -> PerformanceSample {
        PerformanceSample {
            last_operation_latency_ms: self.last_send_time_ms,
            rolling_rate: Some(self.fps),
            frames: self.frame_count,
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

impl<T: SenderTransport, C: Clock> Drop for Sender<T, C> {
    fn drop(&mut self) {
        if self.transport.is_some() {
            tracing::warn!(sender = %self.name, "sender was not explicitly released; releasing on drop");
            self.release();
        }
    }
}

impl<T: SenderTransport, C: Clock> fmt::Display for Sender<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sender(name='{}', size={})", self.name, self.size)
    }
}

impl<T: SenderTransport, C: Clock> fmt::Debug for Sender<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("format", &self.format)
            .field("released", &self.is_released())
            .field("fps", &self.fps)
            .field("frame_count", &self.frame_count)
            .finish()
    }
}
