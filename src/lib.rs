pub mod codec;
pub mod config;
pub mod domains;
pub mod error;
pub mod interfaces;
pub mod providers;
pub mod services;

pub use crate::config::{HeftyConfig, MAX_HEFTY_MESSAGE_BYTES, MAX_INLINE_MESSAGE_BYTES};
pub use crate::domains::message::{AttributeValue, Message, MessageAttributes};
pub use crate::error::{HeftyError, Result};
pub use crate::services::queue::HeftyQueueClient;
pub use crate::services::topic::HeftyTopicClient;
