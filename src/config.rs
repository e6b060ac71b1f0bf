use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{HeftyError, Result};

/// Largest message the queue accepts natively.
pub const MAX_INLINE_MESSAGE_BYTES: usize = 262_144;
/// Largest message the protocol will ever offload.
pub const MAX_HEFTY_MESSAGE_BYTES: usize = 26_214_400;

fn default_inline_limit() -> usize {
    MAX_INLINE_MESSAGE_BYTES
}

fn default_max_limit() -> usize {
    MAX_HEFTY_MESSAGE_BYTES
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeftyConfig {
    pub bucket: String,
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_inline_limit")]
    pub inline_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default)]
    pub always_offload: bool,
}

impl Default for HeftyConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: String::new(),
            inline_limit: MAX_INLINE_MESSAGE_BYTES,
            max_limit: MAX_HEFTY_MESSAGE_BYTES,
            always_offload: false,
        }
    }
}

impl HeftyConfig {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            ..Self::default()
        }
    }

    pub fn with_always_offload(mut self, always_offload: bool) -> Self {
        self.always_offload = always_offload;
        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| HeftyError::Config(e.to_string()))?;
        let config: HeftyConfig =
            serde_json::from_str(&content).map_err(|e| HeftyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(HeftyError::Config("bucket must not be empty".to_string()));
        }
        if self.inline_limit > self.max_limit {
            return Err(HeftyError::Config(format!(
                "inline_limit {} exceeds max_limit {}",
                self.inline_limit, self.max_limit
            )));
        }
        Ok(())
    }
}
