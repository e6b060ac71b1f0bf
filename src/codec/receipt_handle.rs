use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{HeftyError, Result};

pub const RECEIPT_HANDLE_MARKER: &str = "hefty-message";
const DELIMITER: char = '|';
const EXPECTED_TOKEN_COUNT: usize = 4;

/// Receipt handle as seen by a delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptHandle {
    /// Handle issued by the queue for an inline message, used unchanged.
    Native(String),
    /// Handle of an offloaded message, carrying the blob location.
    Offloaded {
        native_handle: String,
        store_container: String,
        store_key: String,
    },
}

impl ReceiptHandle {
    pub fn is_offloaded(&self) -> bool {
        matches!(self, Self::Offloaded { .. })
    }

    pub fn native_handle(&self) -> &str {
        match self {
            Self::Native(handle) => handle,
            Self::Offloaded { native_handle, .. } => native_handle,
        }
    }
}

/// `base64("hefty-message|<native>|<container>|<key>")`
pub fn wrap(native_handle: &str, store_container: &str, store_key: &str) -> Result<String> {
    for (field, value) in [
        ("receipt handle", native_handle),
        ("bucket", store_container),
        ("key", store_key),
    ] {
        if value.contains(DELIMITER) {
            return Err(HeftyError::MalformedReceiptHandle(format!(
                "{field} must not contain '{DELIMITER}'"
            )));
        }
    }
    let raw = format!(
        "{RECEIPT_HANDLE_MARKER}{DELIMITER}{native_handle}{DELIMITER}{store_container}{DELIMITER}{store_key}"
    );
    Ok(BASE64.encode(raw))
}

/// Handles that do not decode to the marker are native and returned as is.
pub fn unwrap(handle: &str) -> Result<ReceiptHandle> {
    let decoded = match BASE64.decode(handle).ok().and_then(|b| String::from_utf8(b).ok()) {
        Some(decoded) => decoded,
        None => return Ok(ReceiptHandle::Native(handle.to_string())),
    };
    if !decoded.starts_with(RECEIPT_HANDLE_MARKER) {
        return Ok(ReceiptHandle::Native(handle.to_string()));
    }

    let tokens: Vec<&str> = decoded.split(DELIMITER).collect();
    if tokens.len() != EXPECTED_TOKEN_COUNT || tokens[0] != RECEIPT_HANDLE_MARKER {
        return Err(HeftyError::MalformedReceiptHandle(format!(
            "expected {EXPECTED_TOKEN_COUNT} tokens in receipt handle but found {}",
            tokens.len()
        )));
    }
    Ok(ReceiptHandle::Offloaded {
        native_handle: tokens[1].to_string(),
        store_container: tokens[2].to_string(),
        store_key: tokens[3].to_string(),
    })
}
