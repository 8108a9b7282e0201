//! liru session library entry.
//!
//! Publishing (`Sender`) and subscribing (`Receiver`) sessions over an
//! injected shared-texture transport, plus strict config loading, in-process
//! metrics, and a loopback transport for single-process use and tests.
//!
//! Sessions are synchronous and hold no locks. A session must be driven by
//! one thread at a time; the caller provides any synchronization.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod loopback;
pub mod obs;
pub mod receiver;
pub mod sender;
pub mod stats;

pub use loopback::{LoopbackHub, LoopbackReceiver, LoopbackSender};
pub use obs::SessionMetrics;
pub use receiver::Receiver;
pub use sender::Sender;
pub use stats::PerformanceSample;
