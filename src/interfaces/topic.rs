use async_trait::async_trait;

use crate::domains::message::{PublishOutput, PublishRequest};
use crate::error::Result;

#[async_trait]
pub trait TopicClient: Send + Sync {
    async fn publish(&self, request: PublishRequest) -> Result<PublishOutput>;
}
