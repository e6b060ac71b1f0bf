use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{HeftyError, Result};

/// Attribute set of a message, keyed by name. Iteration order is ascending
/// byte order of the names, which is also the order the digest requires.
pub type MessageAttributes = BTreeMap<String, AttributeValue>;

/// Leading token of an attribute data type such as `String`, `Number.float`
/// or `Binary.png`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Number,
    Binary,
}

impl AttributeKind {
    pub fn from_data_type(data_type: &str) -> Result<Self> {
        if data_type.starts_with("String") {
            Ok(Self::String)
        } else if data_type.starts_with("Number") {
            Ok(Self::Number)
        } else if data_type.starts_with("Binary") {
            Ok(Self::Binary)
        } else {
            Err(HeftyError::UnsupportedAttributeType(data_type.to_string()))
        }
    }

    /// Transport marker byte used by the attribute digest.
    pub fn transport_type(self) -> u8 {
        match self {
            Self::String | Self::Number => 1,
            Self::Binary => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_value: Option<Vec<u8>>,
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: "String".to_string(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    pub fn number(value: impl Into<String>) -> Self {
        Self {
            data_type: "Number".to_string(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Self {
            data_type: "Binary".to_string(),
            string_value: None,
            binary_value: Some(value.into()),
        }
    }

    /// Appends a custom subtype, e.g. `String` becomes `String.uuid`.
    pub fn with_custom_type(mut self, custom: &str) -> Self {
        self.data_type = format!("{}.{custom}", self.data_type);
        self
    }

    pub fn kind(&self) -> Result<AttributeKind> {
        AttributeKind::from_data_type(&self.data_type)
    }

    /// Raw bytes of the value for the attribute's kind. A missing value
    /// counts as empty; a value on the other side is an error.
    pub fn value_bytes(&self) -> Result<&[u8]> {
        match self.kind()? {
            AttributeKind::String | AttributeKind::Number => {
                if self.binary_value.is_some() {
                    return Err(HeftyError::InvalidAttributeValue(format!(
                        "{} attribute carries a binary value",
                        self.data_type
                    )));
                }
                Ok(self
                    .string_value
                    .as_deref()
                    .map(str::as_bytes)
                    .unwrap_or_default())
            }
            AttributeKind::Binary => {
                if self.string_value.is_some() {
                    return Err(HeftyError::InvalidAttributeValue(format!(
                        "{} attribute carries a string value",
                        self.data_type
                    )));
                }
                Ok(self.binary_value.as_deref().unwrap_or_default())
            }
        }
    }
}

/// Body and attributes as the producer handed them over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub body: Vec<u8>,
    pub attributes: MessageAttributes,
}

impl Message {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            attributes: MessageAttributes::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub queue_url: String,
    pub message: Message,
    pub delay_seconds: Option<u32>,
}

impl SendMessageRequest {
    pub fn new(queue_url: impl Into<String>, message: Message) -> Self {
        Self {
            queue_url: queue_url.into(),
            message,
            delay_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessageOutput {
    pub message_id: String,
    pub md5_of_message_body: String,
    pub md5_of_message_attributes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageBatchEntry {
    pub id: String,
    pub message: Message,
    pub delay_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageBatchRequest {
    pub queue_url: String,
    pub entries: Vec<SendMessageBatchEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessageBatchOutput {
    pub successful: Vec<(String, SendMessageOutput)>,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveMessageRequest {
    pub queue_url: String,
    pub max_number_of_messages: u32,
    pub message_attribute_names: Vec<String>,
    pub wait_time_seconds: Option<u32>,
}

impl ReceiveMessageRequest {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            max_number_of_messages: 1,
            message_attribute_names: Vec::new(),
            wait_time_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: Vec<u8>,
    pub attributes: MessageAttributes,
    pub md5_of_body: String,
    pub md5_of_message_attributes: String,
    /// Set when the body is an out-of-band failure report instead of a payload.
    pub error_report: Option<crate::codec::error_message::ErrorMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveMessageOutput {
    pub messages: Vec<ReceivedMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteMessageRequest {
    pub queue_url: String,
    pub receipt_handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub topic_arn: String,
    pub message: Message,
    /// `Some("json")` when the body is a `{"default": ...}` structure whose
    /// `default` value is what subscribers receive.
    pub message_structure: Option<String>,
}

impl PublishRequest {
    pub fn new(topic_arn: impl Into<String>, message: Message) -> Self {
        Self {
            topic_arn: topic_arn.into(),
            message,
            message_structure: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutput {
    pub message_id: String,
}
