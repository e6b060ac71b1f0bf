use serde::{Deserialize, Serialize};

use crate::codec::reference::ReferenceMessage;
use crate::error::{HeftyError, Result};

macro_rules! error_identifier {
    () => {
        "b58c8bae78504da3a2e32cceeb77d342"
    };
}

pub const ERROR_MESSAGE_IDENTIFIER: &str = error_identifier!();

/// Tab-indented JSON always opens with the identifier field.
const ERROR_MESSAGE_PREFIX: &str = concat!("{\n\t\"identifier\": \"", error_identifier!(), "\",");

/// Failure report delivered through the message channel itself, for paths
/// where the producer has no other way to hand a structured error to the
/// consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub identifier: String,
    #[serde(rename = "error")]
    pub error_text: String,
    #[serde(rename = "reference_msg")]
    pub reference_message: Option<ReferenceMessage>,
}

impl ErrorMessage {
    pub fn new(error_text: impl Into<String>, reference_message: Option<ReferenceMessage>) -> Self {
        Self {
            identifier: ERROR_MESSAGE_IDENTIFIER.to_string(),
            error_text: error_text.into(),
            reference_message,
        }
    }

    pub fn from_error(error: &HeftyError, reference_message: Option<ReferenceMessage>) -> Self {
        Self::new(error.to_string(), reference_message)
    }

    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| HeftyError::Serialization(e.to_string()))?;
        String::from_utf8(out).map_err(|e| HeftyError::Serialization(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let message: Self = serde_json::from_str(text)
            .map_err(|e| HeftyError::MalformedErrorMessage(e.to_string()))?;
        if message.identifier != ERROR_MESSAGE_IDENTIFIER {
            return Err(HeftyError::MalformedErrorMessage(format!(
                "unexpected identifier {}",
                message.identifier
            )));
        }
        Ok(message)
    }
}

pub fn is_error_message(text: &str) -> bool {
    text.starts_with(ERROR_MESSAGE_PREFIX)
}
