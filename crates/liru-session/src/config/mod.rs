//! Session config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use liru_core::error::{LiruError, Result};

pub use schema::{LiruConfig, ProbeSection, ReceiverSection, SenderSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<LiruConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|e| LiruError::Config(format!("read {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<LiruConfig> {
    let cfg: LiruConfig =
        serde_yaml::from_str(s).map_err(|e| LiruError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
