#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use hefty::config::HeftyConfig;
use hefty::domains::message::{
    AttributeValue, DeleteMessageRequest, Message, ReceiveMessageOutput, ReceiveMessageRequest,
    SendMessageBatchOutput, SendMessageBatchRequest, SendMessageOutput, SendMessageRequest,
};
use hefty::error::{HeftyError, Result};
use hefty::interfaces::blob_store::BlobStore;
use hefty::interfaces::queue::QueueClient;
use hefty::providers::memory::{InMemoryBlobStore, InMemoryQueue};
use hefty::services::queue::HeftyQueueClient;

pub const QUEUE_URL: &str = "https://sqs.us-west-2.amazonaws.com/765908583888/MyTestQueue";
pub const TOPIC_ARN: &str = "arn:aws:sns:us-west-2:765908583888:MyTopic";
pub const BUCKET: &str = "hefty-integration-tests";
pub const REGION: &str = "us-west-2";

pub fn config() -> HeftyConfig {
    HeftyConfig::new(BUCKET, REGION)
}

pub struct Harness {
    pub queue: Arc<InMemoryQueue>,
    pub store: Arc<InMemoryBlobStore>,
    pub client: HeftyQueueClient,
}

pub async fn harness(config: HeftyConfig) -> Harness {
    let queue = Arc::new(InMemoryQueue::new());
    queue.create_queue(QUEUE_URL).await;
    let store = Arc::new(InMemoryBlobStore::new());
    store.create_container(BUCKET).await;
    let client = HeftyQueueClient::new(queue.clone(), store.clone(), config)
        .await
        .unwrap();
    Harness {
        queue,
        store,
        client,
    }
}

/// Deterministic filler so payloads are not all zeros.
pub fn body_of(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'a' + (i % 26) as u8).collect()
}

pub fn sample_message(body_len: usize) -> Message {
    Message::new(body_of(body_len))
        .with_attribute("trace-id", AttributeValue::string("abc-123"))
        .with_attribute("attempt", AttributeValue::number("3"))
        .with_attribute(
            "thumbnail",
            AttributeValue::binary(vec![0u8, 159, 146, 150]).with_custom_type("png"),
        )
}

/// Queue whose sends fail after a configurable number of successes.
pub struct FlakyQueue {
    pub inner: Arc<InMemoryQueue>,
    pub sends_before_failure: AtomicUsize,
}

impl FlakyQueue {
    pub fn failing(inner: Arc<InMemoryQueue>) -> Self {
        Self {
            inner,
            sends_before_failure: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QueueClient for FlakyQueue {
    async fn send_message(&self, request: SendMessageRequest) -> Result<SendMessageOutput> {
        let left = self.sends_before_failure.load(Ordering::SeqCst);
        if left == 0 {
            return Err(HeftyError::QueueIo("throttled".to_string()));
        }
        self.sends_before_failure.store(left - 1, Ordering::SeqCst);
        self.inner.send_message(request).await
    }

    async fn send_message_batch(
        &self,
        request: SendMessageBatchRequest,
    ) -> Result<SendMessageBatchOutput> {
        self.inner.send_message_batch(request).await
    }

    async fn receive_message(
        &self,
        request: ReceiveMessageRequest,
    ) -> Result<ReceiveMessageOutput> {
        self.inner.receive_message(request).await
    }

    async fn delete_message(&self, request: DeleteMessageRequest) -> Result<()> {
        self.inner.delete_message(request).await
    }
}

/// Store that accepts everything but refuses reads and deletes.
pub struct WriteOnlyStore {
    pub inner: Arc<InMemoryBlobStore>,
}

#[async_trait]
impl BlobStore for WriteOnlyStore {
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.inner.put(container, key, bytes).await
    }

    async fn get(&self, _container: &str, _key: &str) -> Result<Vec<u8>> {
        Err(HeftyError::StoreIo("access denied".to_string()))
    }

    async fn delete(&self, _container: &str, _key: &str) -> Result<()> {
        Err(HeftyError::StoreIo("access denied".to_string()))
    }

    async fn exists(&self, container: &str) -> Result<bool> {
        self.inner.exists(container).await
    }
}
