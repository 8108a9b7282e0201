use serde::Deserialize;

use liru_core::error::{LiruError, Result};
use liru_core::validate::{validate_nonempty, validate_positive_dims};
use liru_core::{FrameSize, TextureFormat};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiruConfig {
    pub version: u32,

    #[serde(default)]
    pub sender: Option<SenderSection>,

    #[serde(default)]
    pub receiver: Option<ReceiverSection>,

    #[serde(default)]
    pub probe: ProbeSection,
}

impl LiruConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LiruError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        if let Some(sender) = &self.sender {
            sender.validate()?;
        }
        self.probe.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SenderSection {
    pub name: String,
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub format: TextureFormat,
}

impl SenderSection {
    pub fn validate(&self) -> Result<()> {
        validate_nonempty(&self.name).map_err(|e| LiruError::Config(format!("sender.name: {e}")))?;
        self.size()?;
        Ok(())
    }

    pub fn size(&self) -> Result<FrameSize> {
        validate_positive_dims(self.width, self.height)
            .map_err(|e| LiruError::Config(format!("sender: {e}")))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiverSection {
    /// Empty attaches to any available publisher.
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub format: TextureFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    #[serde(default = "default_frames")]
    pub frames: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl ProbeSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100_000).contains(&self.frames) {
            return Err(LiruError::Config(
                "probe.frames must be between 1 and 100000".into(),
            ));
        }
        if self.interval_ms > 1000 {
            return Err(LiruError::Config(
                "probe.interval_ms must be at most 1000".into(),
            ));
        }
        Ok(())
    }
}

fn default_frames() -> u32 {
    120
}
fn default_interval_ms() -> u64 {
    16
}
