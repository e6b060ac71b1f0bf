use async_trait::async_trait;

use crate::domains::message::{
    DeleteMessageRequest, ReceiveMessageOutput, ReceiveMessageRequest, SendMessageBatchOutput,
    SendMessageBatchRequest, SendMessageOutput, SendMessageRequest,
};
use crate::error::Result;

/// Operations the offload layer needs from a point-to-point queue service.
/// Implementations report their own failures as `HeftyError::QueueIo`.
#[async_trait]
pub trait QueueClient: Send + Sync {
    async fn send_message(&self, request: SendMessageRequest) -> Result<SendMessageOutput>;

    async fn send_message_batch(
        &self,
        request: SendMessageBatchRequest,
    ) -> Result<SendMessageBatchOutput>;

    async fn receive_message(&self, request: ReceiveMessageRequest)
        -> Result<ReceiveMessageOutput>;

    async fn delete_message(&self, request: DeleteMessageRequest) -> Result<()>;
}
