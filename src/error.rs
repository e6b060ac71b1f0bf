use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeftyError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("message size of {size} bytes greater than allowed message size of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },
    #[error("encountered unexpected data type for message attribute: {0}")]
    UnsupportedAttributeType(String),
    #[error("invalid value for message attribute: {0}")]
    InvalidAttributeValue(String),
    #[error("invalid destination identifier: {0}")]
    InvalidDestinationIdentifier(String),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("malformed reference message: {0}")]
    MalformedReferenceMessage(String),
    #[error("malformed error message: {0}")]
    MalformedErrorMessage(String),
    #[error("malformed receipt handle: {0}")]
    MalformedReceiptHandle(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("blob store error: {0}")]
    StoreIo(String),
    #[error("queue error: {0}")]
    QueueIo(String),
}

pub type Result<T> = std::result::Result<T, HeftyError>;
