use crate::config::HeftyConfig;

/// Where a message of a given size has to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    SendInline,
    SendOffloaded,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub inline_limit: usize,
    pub max_limit: usize,
    pub always_offload: bool,
}

impl Thresholds {
    pub fn from_config(config: &HeftyConfig) -> Self {
        Self {
            inline_limit: config.inline_limit,
            max_limit: config.max_limit,
            always_offload: config.always_offload,
        }
    }

    pub fn classify(&self, size: usize) -> Classification {
        if size > self.max_limit {
            Classification::Reject
        } else if size <= self.inline_limit && !self.always_offload {
            Classification::SendInline
        } else {
            Classification::SendOffloaded
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&HeftyConfig::default())
    }
}
