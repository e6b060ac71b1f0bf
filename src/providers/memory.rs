use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::codec::digest::{attribute_digest, body_digest};
use crate::codec::size::message_size;
use crate::config::MAX_INLINE_MESSAGE_BYTES;
use crate::domains::message::{
    DeleteMessageRequest, Message, MessageAttributes, PublishOutput, PublishRequest,
    ReceiveMessageOutput, ReceiveMessageRequest, ReceivedMessage, SendMessageBatchOutput,
    SendMessageBatchRequest, SendMessageOutput, SendMessageRequest,
};
use crate::error::{HeftyError, Result};
use crate::interfaces::blob_store::BlobStore;
use crate::interfaces::queue::QueueClient;
use crate::interfaces::topic::TopicClient;

#[derive(Default)]
pub struct InMemoryBlobStore {
    containers: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_container(&self, container: &str) {
        let mut guard = self.containers.write().await;
        guard.entry(container.to_string()).or_default();
    }

    pub async fn object_count(&self, container: &str) -> usize {
        let guard = self.containers.read().await;
        guard.get(container).map(HashMap::len).unwrap_or(0)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        let mut guard = self.containers.write().await;
        let objects = guard
            .get_mut(container)
            .ok_or_else(|| HeftyError::StoreIo(format!("bucket {container} does not exist")))?;
        objects.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        let guard = self.containers.read().await;
        guard
            .get(container)
            .and_then(|objects| objects.get(key))
            .cloned()
            .ok_or_else(|| HeftyError::StoreIo(format!("no such key {container}/{key}")))
    }

    async fn delete(&self, container: &str, key: &str) -> Result<()> {
        let mut guard = self.containers.write().await;
        let objects = guard
            .get_mut(container)
            .ok_or_else(|| HeftyError::StoreIo(format!("bucket {container} does not exist")))?;
        objects.remove(key);
        Ok(())
    }

    async fn exists(&self, container: &str) -> Result<bool> {
        Ok(self.containers.read().await.contains_key(container))
    }
}

struct StoredMessage {
    message_id: String,
    message: Message,
    md5_of_body: String,
    md5_of_message_attributes: String,
}

#[derive(Default)]
struct QueueState {
    visible: VecDeque<StoredMessage>,
    in_flight: HashMap<String, StoredMessage>,
}

/// Queue with the native size ceiling enforced on every send. Received
/// messages stay in flight until deleted by receipt handle.
pub struct InMemoryQueue {
    queues: RwLock<HashMap<String, QueueState>>,
    max_message_bytes: usize,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::with_max_message_bytes(MAX_INLINE_MESSAGE_BYTES)
    }

    pub fn with_max_message_bytes(max_message_bytes: usize) -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
            max_message_bytes,
        }
    }

    pub async fn create_queue(&self, queue_url: &str) {
        let mut guard = self.queues.write().await;
        guard.entry(queue_url.to_string()).or_default();
    }

    /// Visible plus in-flight messages.
    pub async fn depth(&self, queue_url: &str) -> usize {
        let guard = self.queues.read().await;
        guard
            .get(queue_url)
            .map(|q| q.visible.len() + q.in_flight.len())
            .unwrap_or(0)
    }

    async fn enqueue(&self, queue_url: &str, message: Message) -> Result<SendMessageOutput> {
        let size = message_size(&message.body, &message.attributes)
            .map_err(|e| HeftyError::QueueIo(e.to_string()))?;
        if size > self.max_message_bytes {
            return Err(HeftyError::QueueIo(format!(
                "message of {size} bytes exceeds queue limit of {} bytes",
                self.max_message_bytes
            )));
        }
        let stored = StoredMessage {
            message_id: Uuid::new_v4().to_string(),
            md5_of_body: body_digest(&message.body),
            md5_of_message_attributes: attribute_digest(&message.attributes)
                .map_err(|e| HeftyError::QueueIo(e.to_string()))?,
            message,
        };
        let output = SendMessageOutput {
            message_id: stored.message_id.clone(),
            md5_of_message_body: stored.md5_of_body.clone(),
            md5_of_message_attributes: stored.md5_of_message_attributes.clone(),
        };

        let mut guard = self.queues.write().await;
        let queue = guard
            .get_mut(queue_url)
            .ok_or_else(|| HeftyError::QueueIo(format!("queue {queue_url} does not exist")))?;
        queue.visible.push_back(stored);
        Ok(output)
    }
}

fn select_attributes(attributes: &MessageAttributes, names: &[String]) -> MessageAttributes {
    if names.iter().any(|n| n == "All" || n == ".*") {
        return attributes.clone();
    }
    attributes
        .iter()
        .filter(|(name, _)| names.iter().any(|n| n == *name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl QueueClient for InMemoryQueue {
    async fn send_message(&self, request: SendMessageRequest) -> Result<SendMessageOutput> {
        self.enqueue(&request.queue_url, request.message).await
    }

    async fn send_message_batch(
        &self,
        request: SendMessageBatchRequest,
    ) -> Result<SendMessageBatchOutput> {
        let mut output = SendMessageBatchOutput::default();
        for entry in request.entries {
            match self.enqueue(&request.queue_url, entry.message).await {
                Ok(sent) => output.successful.push((entry.id, sent)),
                Err(err) => output.failed.push((entry.id, err.to_string())),
            }
        }
        Ok(output)
    }

    async fn receive_message(
        &self,
        request: ReceiveMessageRequest,
    ) -> Result<ReceiveMessageOutput> {
        let mut guard = self.queues.write().await;
        let queue = guard.get_mut(&request.queue_url).ok_or_else(|| {
            HeftyError::QueueIo(format!("queue {} does not exist", request.queue_url))
        })?;

        let mut messages = Vec::new();
        let limit = request.max_number_of_messages.max(1) as usize;
        while messages.len() < limit {
            let Some(stored) = queue.visible.pop_front() else {
                break;
            };
            let receipt_handle = Uuid::new_v4().simple().to_string();
            messages.push(ReceivedMessage {
                message_id: stored.message_id.clone(),
                receipt_handle: receipt_handle.clone(),
                body: stored.message.body.clone(),
                attributes: select_attributes(
                    &stored.message.attributes,
                    &request.message_attribute_names,
                ),
                md5_of_body: stored.md5_of_body.clone(),
                md5_of_message_attributes: stored.md5_of_message_attributes.clone(),
                error_report: None,
            });
            queue.in_flight.insert(receipt_handle, stored);
        }
        Ok(ReceiveMessageOutput { messages })
    }

    async fn delete_message(&self, request: DeleteMessageRequest) -> Result<()> {
        let mut guard = self.queues.write().await;
        let queue = guard.get_mut(&request.queue_url).ok_or_else(|| {
            HeftyError::QueueIo(format!("queue {} does not exist", request.queue_url))
        })?;
        queue
            .in_flight
            .remove(&request.receipt_handle)
            .map(|_| ())
            .ok_or_else(|| {
                HeftyError::QueueIo(format!(
                    "receipt handle {} is invalid",
                    request.receipt_handle
                ))
            })
    }
}

#[derive(serde::Deserialize)]
struct JsonStructure {
    default: String,
}

/// Topic fanning out to in-memory queues with raw message delivery.
pub struct InMemoryTopic {
    subscriptions: RwLock<HashMap<String, Vec<String>>>,
    queues: Arc<InMemoryQueue>,
    max_message_bytes: usize,
}

impl InMemoryTopic {
    pub fn new(queues: Arc<InMemoryQueue>) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            queues,
            max_message_bytes: MAX_INLINE_MESSAGE_BYTES,
        }
    }

    pub async fn subscribe(&self, topic_arn: &str, queue_url: &str) {
        let mut guard = self.subscriptions.write().await;
        guard
            .entry(topic_arn.to_string())
            .or_default()
            .push(queue_url.to_string());
    }
}

#[async_trait]
impl TopicClient for InMemoryTopic {
    async fn publish(&self, request: PublishRequest) -> Result<PublishOutput> {
        let size = message_size(&request.message.body, &request.message.attributes)
            .map_err(|e| HeftyError::QueueIo(e.to_string()))?;
        if size > self.max_message_bytes {
            return Err(HeftyError::QueueIo(format!(
                "message of {size} bytes exceeds topic limit of {} bytes",
                self.max_message_bytes
            )));
        }

        let mut delivered = request.message;
        if request.message_structure.as_deref() == Some("json") {
            let structure: JsonStructure = serde_json::from_slice(&delivered.body)
                .map_err(|e| HeftyError::QueueIo(format!("invalid message structure: {e}")))?;
            delivered.body = structure.default.into_bytes();
        }

        let subscribers = {
            let guard = self.subscriptions.read().await;
            guard.get(&request.topic_arn).cloned().ok_or_else(|| {
                HeftyError::QueueIo(format!("topic {} does not exist", request.topic_arn))
            })?
        };
        for queue_url in subscribers {
            self.queues.enqueue(&queue_url, delivered.clone()).await?;
        }
        Ok(PublishOutput {
            message_id: Uuid::new_v4().to_string(),
        })
    }
}
