//! Pure encoders and decoders behind the offload protocol. Nothing here does
//! I/O or holds shared state.

pub mod digest;
pub mod error_message;
pub mod payload;
pub mod receipt_handle;
pub mod reference;
pub mod size;
pub mod threshold;
