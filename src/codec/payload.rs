//! `"HFTY" | version | u32be body_len | body | attribute section`; the
//! attribute section is the digest encoding.

use crate::codec::digest::{self, md5_hex};
use crate::domains::message::{AttributeKind, AttributeValue, Message, MessageAttributes};
use crate::error::{HeftyError, Result};

const MAGIC: &[u8; 4] = b"HFTY";
const VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 1 + 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedPayload {
    pub blob: Vec<u8>,
    pub body_offset: usize,
    pub attribute_offset: usize,
}

impl SerializedPayload {
    pub fn body_section(&self) -> &[u8] {
        &self.blob[self.body_offset..self.attribute_offset]
    }

    pub fn attribute_section(&self) -> &[u8] {
        &self.blob[self.attribute_offset..]
    }

    pub fn body_digest(&self) -> String {
        md5_hex(self.body_section())
    }

    pub fn attribute_digest(&self) -> String {
        let section = self.attribute_section();
        if section.is_empty() {
            String::new()
        } else {
            md5_hex(section)
        }
    }
}

pub fn serialize(message: &Message) -> Result<SerializedPayload> {
    let body_len = u32::try_from(message.body.len()).map_err(|_| {
        HeftyError::MalformedPayload(format!(
            "body of {} bytes exceeds u32 length",
            message.body.len()
        ))
    })?;

    let mut blob = Vec::with_capacity(HEADER_LEN + message.body.len());
    blob.extend_from_slice(MAGIC);
    blob.push(VERSION);
    blob.extend_from_slice(&body_len.to_be_bytes());
    let body_offset = blob.len();
    blob.extend_from_slice(&message.body);
    let attribute_offset = blob.len();
    digest::encode_attributes(&message.attributes, &mut blob)?;

    Ok(SerializedPayload {
        blob,
        body_offset,
        attribute_offset,
    })
}

pub fn deserialize(blob: &[u8]) -> Result<Message> {
    let mut reader = Reader::new(blob);
    if reader.take(MAGIC.len())? != MAGIC {
        return Err(malformed("missing payload magic"));
    }
    let version = reader.take(1)?[0];
    if version != VERSION {
        return Err(malformed(format!("unsupported payload version {version}")));
    }
    let body_len = reader.u32()? as usize;
    let body = reader.take(body_len)?.to_vec();

    let mut attributes = MessageAttributes::new();
    while !reader.is_empty() {
        let name = reader.string()?;
        let data_type = reader.string()?;
        let tag = reader.take(1)?[0];
        let value = reader.prefixed()?;

        let kind = AttributeKind::from_data_type(&data_type)
            .map_err(|_| malformed(format!("unknown data type {data_type} for {name}")))?;
        if kind.transport_type() != tag {
            return Err(malformed(format!(
                "value tag {tag} does not match data type {data_type}"
            )));
        }
        let attribute = match kind {
            AttributeKind::String | AttributeKind::Number => AttributeValue {
                data_type,
                string_value: Some(utf8(value)?),
                binary_value: None,
            },
            AttributeKind::Binary => AttributeValue {
                data_type,
                string_value: None,
                binary_value: Some(value.to_vec()),
            },
        };
        if attributes.insert(name.clone(), attribute).is_some() {
            return Err(malformed(format!("duplicate attribute {name}")));
        }
    }

    Ok(Message { body, attributes })
}

fn malformed(message: impl Into<String>) -> HeftyError {
    HeftyError::MalformedPayload(message.into())
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| malformed(e.to_string()))
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                malformed(format!(
                    "truncated payload: need {len} bytes at offset {}, have {}",
                    self.pos,
                    self.buf.len() - self.pos
                ))
            })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.u32()? as usize;
        self.take(len)
    }

    fn string(&mut self) -> Result<String> {
        let bytes = self.prefixed()?;
        utf8(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::digest::{attribute_digest, body_digest};

    fn sample() -> Message {
        Message::new(b"payload".to_vec())
            .with_attribute("zeta", AttributeValue::number("42"))
            .with_attribute("alpha", AttributeValue::binary(vec![0u8, 1, 2]).with_custom_type("raw"))
            .with_attribute("mid", AttributeValue::string("x"))
    }

    #[test]
    fn offsets_frame_the_digest_ranges() {
        let message = sample();
        let payload = serialize(&message).unwrap();
        assert_eq!(payload.body_offset, HEADER_LEN);
        assert_eq!(payload.body_section(), b"payload");
        assert_eq!(payload.body_digest(), body_digest(&message.body));
        assert_eq!(
            payload.attribute_digest(),
            attribute_digest(&message.attributes).unwrap()
        );
        assert_eq!(deserialize(&payload.blob).unwrap(), message);
    }

    #[test]
    fn body_only_payload_has_empty_attribute_section() {
        let payload = serialize(&Message::new(Vec::new())).unwrap();
        assert_eq!(payload.attribute_offset, payload.blob.len());
        assert_eq!(payload.attribute_digest(), "");
        assert_eq!(deserialize(&payload.blob).unwrap(), Message::new(Vec::new()));
    }

    #[test]
    fn truncation_is_reported() {
        let payload = serialize(&sample()).unwrap();
        for cut in [0, 3, HEADER_LEN + 2, payload.blob.len() - 1] {
            assert!(matches!(
                deserialize(&payload.blob[..cut]),
                Err(HeftyError::MalformedPayload(_))
            ));
        }
    }

    #[test]
    fn inconsistent_tag_is_reported() {
        let message = Message::new(b"b".to_vec()).with_attribute("k", AttributeValue::string("v"));
        let mut payload = serialize(&message).unwrap();
        // name(4+1) + type(4+6) puts the tag 15 bytes into the attribute section
        let tag_at = payload.attribute_offset + 15;
        payload.blob[tag_at] = 2;
        assert!(matches!(
            deserialize(&payload.blob),
            Err(HeftyError::MalformedPayload(_))
        ));
    }

    #[test]
    fn oversized_body_length_is_reported() {
        let mut payload = serialize(&sample()).unwrap();
        payload.blob[5..9].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            deserialize(&payload.blob),
            Err(HeftyError::MalformedPayload(_))
        ));
    }
}
