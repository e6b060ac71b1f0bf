use crate::domains::message::MessageAttributes;
use crate::error::Result;

/// Wire size of a message as the queue service accounts for it: the body
/// plus, per attribute, its name, data type and value.
pub fn message_size(body: &[u8], attributes: &MessageAttributes) -> Result<usize> {
    let mut size = body.len();
    for (name, value) in attributes {
        size += name.len();
        size += value.data_type.len();
        size += value.value_bytes()?.len();
    }
    Ok(size)
}
