//! Precondition checks shared by both session roles.
//!
//! Every check runs before the transport is touched, so a rejected call never
//! leaves session state partially modified.

use crate::error::{LiruError, Result};
use crate::texture::{FrameSize, NativeHandle};

/// Reject empty names. Whitespace-only names are accepted as-is.
pub fn validate_nonempty(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(LiruError::InvalidArgument("sender name cannot be empty".into()));
    }
    Ok(name)
}

/// Accept signed dimensions so negative input from a loosely typed caller is
/// reported instead of wrapping.
pub fn validate_positive_dims(width: i64, height: i64) -> Result<FrameSize> {
    let invalid = || LiruError::InvalidArgument(format!("invalid dimensions: {width}x{height}"));

    let w = u32::try_from(width).map_err(|_| invalid())?;
    let h = u32::try_from(height).map_err(|_| invalid())?;
    FrameSize::new(w, h).ok_or_else(invalid)
}

pub fn validate_nonzero_handle(raw: u64) -> Result<NativeHandle> {
    NativeHandle::new(raw)
        .ok_or_else(|| LiruError::InvalidArgument(format!("invalid texture id: {raw}")))
}
