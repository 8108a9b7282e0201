//! Opaque texture identifiers and geometry.
//!
//! The core never creates or inspects GPU resources. A [`NativeHandle`] is a
//! numeric id owned by the caller's graphics context and only passed through
//! to the transport for the duration of one call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-null identifier of a caller-owned GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(u64);

impl NativeHandle {
    /// Returns `None` for the null sentinel (zero).
    pub fn new(raw: u64) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pixel layout tag forwarded verbatim to the transport. No conversion happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFormat {
    #[default]
    Rgba8,
    Bgra8,
    Rgba16f,
    Rgba32f,
}

impl TextureFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            TextureFormat::Rgba8 => "rgba8",
            TextureFormat::Bgra8 => "bgra8",
            TextureFormat::Rgba16f => "rgba16f",
            TextureFormat::Rgba32f => "rgba32f",
        }
    }
}

/// Negotiated image size. Both dimensions are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Returns `None` unless both dimensions are non-zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self { width, height })
        }
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
