use tracing::debug;

use crate::codec::payload;
use crate::codec::reference::{ReferenceMessage, ReferenceMessageCodec};
use crate::codec::size::message_size;
use crate::codec::threshold::{Classification, Thresholds};
use crate::domains::message::{AttributeValue, Message, MessageAttributes};
use crate::error::{HeftyError, Result};

pub mod queue;
pub mod topic;

/// Attribute attached to every offloaded queue message.
pub const HEFTY_CLIENT_VERSION_KEY: &str = "hefty-client-version";
pub const HEFTY_CLIENT_VERSION: &str = "v0.1";

pub(crate) fn marker_attributes() -> MessageAttributes {
    let mut attributes = MessageAttributes::new();
    attributes.insert(
        HEFTY_CLIENT_VERSION_KEY.to_string(),
        AttributeValue::string(HEFTY_CLIENT_VERSION),
    );
    attributes
}

/// Inline or offload; oversize messages fail before any I/O.
pub(crate) fn route(thresholds: &Thresholds, message: &Message) -> Result<Classification> {
    let size = message_size(&message.body, &message.attributes)?;
    let classification = thresholds.classify(size);
    debug!(size, ?classification, "classified message");
    match classification {
        Classification::Reject => Err(HeftyError::MessageTooLarge {
            size,
            limit: thresholds.max_limit,
        }),
        other => Ok(other),
    }
}

/// Serialized blob plus the reference that will point at it.
pub(crate) struct Staged {
    pub reference: ReferenceMessage,
    pub blob: Vec<u8>,
}

pub(crate) fn stage(
    codec: &ReferenceMessageCodec,
    destination: &str,
    message: &Message,
) -> Result<Staged> {
    let payload = payload::serialize(message)?;
    let reference = codec.build(
        destination,
        &payload.body_digest(),
        &payload.attribute_digest(),
    )?;
    Ok(Staged {
        reference,
        blob: payload.blob,
    })
}
