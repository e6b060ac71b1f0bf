//! MD5 digests as the queue service reports them for inline sends.

use md5::{Digest, Md5};

use crate::domains::message::{AttributeValue, MessageAttributes};
use crate::error::{HeftyError, Result};

pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

pub fn body_digest(body: &[u8]) -> String {
    md5_hex(body)
}

/// Empty string when there are no attributes; the service emits no digest
/// in that case.
pub fn attribute_digest(attributes: &MessageAttributes) -> Result<String> {
    if attributes.is_empty() {
        return Ok(String::new());
    }
    let mut buf = Vec::new();
    encode_attributes(attributes, &mut buf)?;
    Ok(md5_hex(&buf))
}

/// Appends the canonical encoding of every attribute, in ascending name
/// order: `len(name) name len(type) type transport len(value) value`, with
/// 4-byte big-endian lengths.
pub fn encode_attributes(attributes: &MessageAttributes, buf: &mut Vec<u8>) -> Result<()> {
    for (name, value) in attributes {
        encode_attribute(name, value, buf)?;
    }
    Ok(())
}

fn encode_attribute(name: &str, value: &AttributeValue, buf: &mut Vec<u8>) -> Result<()> {
    let kind = value.kind()?;
    let bytes = value.value_bytes()?;
    put_prefixed(buf, name.as_bytes())?;
    put_prefixed(buf, value.data_type.as_bytes())?;
    buf.push(kind.transport_type());
    put_prefixed(buf, bytes)?;
    Ok(())
}

pub(crate) fn put_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| {
        HeftyError::MalformedPayload(format!("field of {} bytes exceeds u32 length", bytes.len()))
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}
