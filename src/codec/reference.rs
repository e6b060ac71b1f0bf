use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HeftyError, Result};

macro_rules! reference_identifier {
    () => {
        "d3131a62e0224688b77a506fd333dac4"
    };
}

pub const REFERENCE_MESSAGE_IDENTIFIER: &str = reference_identifier!();

/// Compact JSON always starts with the identifier field.
const REFERENCE_MESSAGE_PREFIX: &str =
    concat!("{\"identifier\":\"", reference_identifier!(), "\",");

/// Small marker sent through the queue in place of an offloaded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMessage {
    pub identifier: String,
    #[serde(rename = "s3_region")]
    pub store_region: String,
    #[serde(rename = "s3_bucket")]
    pub store_container: String,
    #[serde(rename = "s3_key")]
    pub store_key: String,
    #[serde(rename = "md5_digest_msg_body")]
    pub body_digest: String,
    #[serde(rename = "md5_digest_msg_attr")]
    pub attribute_digest: String,
}

impl ReferenceMessage {
    pub fn new(
        store_region: impl Into<String>,
        store_container: impl Into<String>,
        store_key: impl Into<String>,
        body_digest: impl Into<String>,
        attribute_digest: impl Into<String>,
    ) -> Self {
        Self {
            identifier: REFERENCE_MESSAGE_IDENTIFIER.to_string(),
            store_region: store_region.into(),
            store_container: store_container.into(),
            store_key: store_key.into(),
            body_digest: body_digest.into(),
            attribute_digest: attribute_digest.into(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| HeftyError::Serialization(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let message: Self = serde_json::from_str(text)
            .map_err(|e| HeftyError::MalformedReferenceMessage(e.to_string()))?;
        if message.identifier != REFERENCE_MESSAGE_IDENTIFIER {
            return Err(HeftyError::MalformedReferenceMessage(format!(
                "unexpected identifier {}",
                message.identifier
            )));
        }
        Ok(message)
    }
}

/// Cheap prefix test run before any full parse.
pub fn is_reference_message(text: &str) -> bool {
    text.starts_with(REFERENCE_MESSAGE_PREFIX)
}

/// How the reference travels through the native channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportWrap {
    /// Queue URL destination, reference JSON is the message body.
    Direct,
    /// Topic ARN destination, reference JSON is wrapped in a
    /// `{"default": ...}` structure and the stored body in `{"Message": ...}`.
    PubSubEnvelope,
}

impl TransportWrap {
    fn separator(self) -> char {
        match self {
            Self::Direct => '/',
            Self::PubSubEnvelope => ':',
        }
    }

    fn expected_tokens(self) -> usize {
        match self {
            Self::Direct => 5,
            Self::PubSubEnvelope => 6,
        }
    }

    /// Queue or topic name extracted from the destination identifier.
    ///
    /// `https://sqs.us-west-2.amazonaws.com/765908583888/MyQueue` and
    /// `arn:aws:sns:us-west-2:765908583888:MyTopic` both resolve to their
    /// last token.
    pub fn destination_name(self, destination: &str) -> Result<String> {
        let tokens: Vec<&str> = destination.split(self.separator()).collect();
        if tokens.len() != self.expected_tokens() {
            return Err(HeftyError::InvalidDestinationIdentifier(format!(
                "expected {} tokens when splitting {destination} by '{}' but received {}",
                self.expected_tokens(),
                self.separator(),
                tokens.len()
            )));
        }
        let name = tokens[tokens.len() - 1];
        if name.is_empty() {
            return Err(HeftyError::InvalidDestinationIdentifier(format!(
                "{destination} has an empty name segment"
            )));
        }
        Ok(name.to_string())
    }
}

#[derive(Serialize, Deserialize)]
struct PubSubEnvelope {
    default: String,
}

#[derive(Serialize, Deserialize)]
struct NotificationBody {
    #[serde(rename = "Message")]
    message: String,
}

/// Builds and parses reference messages for one destination flavour.
#[derive(Debug, Clone)]
pub struct ReferenceMessageCodec {
    wrap: TransportWrap,
    region: String,
    container: String,
}

impl ReferenceMessageCodec {
    pub fn new(wrap: TransportWrap, region: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            wrap,
            region: region.into(),
            container: container.into(),
        }
    }

    pub fn wrap(&self) -> TransportWrap {
        self.wrap
    }

    /// Fresh reference with key `<destination name>/<uuid>`.
    pub fn build(
        &self,
        destination: &str,
        body_digest: &str,
        attribute_digest: &str,
    ) -> Result<ReferenceMessage> {
        let name = self.wrap.destination_name(destination)?;
        let key = format!("{name}/{}", Uuid::new_v4());
        Ok(ReferenceMessage::new(
            self.region.clone(),
            self.container.clone(),
            key,
            body_digest,
            attribute_digest,
        ))
    }

    /// Text sent through the native channel in place of the payload.
    pub fn encode(&self, reference: &ReferenceMessage) -> Result<String> {
        let json = reference.to_json()?;
        match self.wrap {
            TransportWrap::Direct => Ok(json),
            TransportWrap::PubSubEnvelope => serde_json::to_string(&PubSubEnvelope { default: json })
                .map_err(|e| HeftyError::Serialization(e.to_string())),
        }
    }

    /// Inverse of [`Self::encode`].
    pub fn decode(&self, text: &str) -> Result<ReferenceMessage> {
        match self.wrap {
            TransportWrap::Direct => ReferenceMessage::from_json(text),
            TransportWrap::PubSubEnvelope => {
                let envelope: PubSubEnvelope = serde_json::from_str(text)
                    .map_err(|e| HeftyError::MalformedReferenceMessage(e.to_string()))?;
                ReferenceMessage::from_json(&envelope.default)
            }
        }
    }

    /// Body as stored in the blob. Pub/sub subscribers see the notification
    /// shape, so the body text is wrapped before serialization.
    pub fn wrap_body(&self, body: &[u8]) -> Result<Vec<u8>> {
        match self.wrap {
            TransportWrap::Direct => Ok(body.to_vec()),
            TransportWrap::PubSubEnvelope => {
                let message = std::str::from_utf8(body)
                    .map_err(|e| HeftyError::Serialization(format!("topic body is not UTF-8: {e}")))?
                    .to_string();
                serde_json::to_vec(&NotificationBody { message })
                    .map_err(|e| HeftyError::Serialization(e.to_string()))
            }
        }
    }
}
