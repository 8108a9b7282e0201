//! Top-level facade crate for liru.
//!
//! Re-exports core types and the session library so users can depend on a single crate.

pub mod core {
    pub use liru_core::*;
}

pub mod session {
    pub use liru_session::*;
}

pub use liru_core::{LiruError, Result};
pub use liru_session::{Receiver, Sender};
