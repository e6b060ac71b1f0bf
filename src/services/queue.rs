use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::codec::error_message::{is_error_message, ErrorMessage};
use crate::codec::payload;
use crate::codec::receipt_handle::{self, ReceiptHandle};
use crate::codec::reference::{
    is_reference_message, ReferenceMessage, ReferenceMessageCodec, TransportWrap,
};
use crate::codec::threshold::{Classification, Thresholds};
use crate::config::HeftyConfig;
use crate::domains::message::{
    DeleteMessageRequest, Message, ReceiveMessageOutput, ReceiveMessageRequest, ReceivedMessage,
    SendMessageBatchOutput, SendMessageBatchRequest, SendMessageOutput, SendMessageRequest,
};
use crate::error::{HeftyError, Result};
use crate::interfaces::blob_store::BlobStore;
use crate::interfaces::queue::QueueClient;
use crate::services::{marker_attributes, route, stage, HEFTY_CLIENT_VERSION_KEY};

/// Queue client that moves oversize messages through the blob store.
///
/// Send, receive and delete are offload-aware; batch send and anything else
/// reached through [`HeftyQueueClient::inner`] go to the native client as is.
pub struct HeftyQueueClient {
    queue: Arc<dyn QueueClient>,
    store: Arc<dyn BlobStore>,
    config: Arc<HeftyConfig>,
    thresholds: Thresholds,
    references: ReferenceMessageCodec,
}

impl HeftyQueueClient {
    /// Fails when the configured bucket does not exist or is not accessible.
    pub async fn new(
        queue: Arc<dyn QueueClient>,
        store: Arc<dyn BlobStore>,
        config: HeftyConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !store.exists(&config.bucket).await? {
            return Err(HeftyError::Config(format!(
                "bucket {} does not exist or is not accessible",
                config.bucket
            )));
        }
        let references =
            ReferenceMessageCodec::new(TransportWrap::Direct, &config.region, &config.bucket);
        Ok(Self {
            queue,
            store,
            thresholds: Thresholds::from_config(&config),
            config: Arc::new(config),
            references,
        })
    }

    pub fn inner(&self) -> &Arc<dyn QueueClient> {
        &self.queue
    }

    pub fn config(&self) -> &HeftyConfig {
        &self.config
    }

    pub async fn send_message(&self, request: SendMessageRequest) -> Result<SendMessageOutput> {
        if request.message.body.is_empty() {
            return self.queue.send_message(request).await;
        }
        if route(&self.thresholds, &request.message)? == Classification::SendInline {
            return self.queue.send_message(request).await;
        }

        let staged = stage(&self.references, &request.queue_url, &request.message)?;
        let reference = staged.reference;
        self.store
            .put(&reference.store_container, &reference.store_key, staged.blob)
            .await?;
        debug!(key = %reference.store_key, "uploaded offloaded payload");

        let outbound = SendMessageRequest {
            queue_url: request.queue_url,
            message: Message {
                body: self.references.encode(&reference)?.into_bytes(),
                attributes: marker_attributes(),
            },
            delay_seconds: request.delay_seconds,
        };
        let mut output = match self.queue.send_message(outbound).await {
            Ok(output) => output,
            Err(err) => {
                warn!(
                    bucket = %reference.store_container,
                    key = %reference.store_key,
                    "send failed after upload, payload left in store"
                );
                return Err(err);
            }
        };
        output.md5_of_message_body = reference.body_digest;
        output.md5_of_message_attributes = reference.attribute_digest;
        Ok(output)
    }

    /// Batches are never offloaded.
    pub async fn send_message_batch(
        &self,
        request: SendMessageBatchRequest,
    ) -> Result<SendMessageBatchOutput> {
        self.queue.send_message_batch(request).await
    }

    pub async fn receive_message(
        &self,
        mut request: ReceiveMessageRequest,
    ) -> Result<ReceiveMessageOutput> {
        if !request
            .message_attribute_names
            .iter()
            .any(|name| name == HEFTY_CLIENT_VERSION_KEY)
        {
            request
                .message_attribute_names
                .push(HEFTY_CLIENT_VERSION_KEY.to_string());
        }

        let output = self.queue.receive_message(request).await?;
        let messages = try_join_all(output.messages.into_iter().map(|m| self.restore(m))).await?;
        Ok(ReceiveMessageOutput { messages })
    }

    async fn restore(&self, mut message: ReceivedMessage) -> Result<ReceivedMessage> {
        let text = std::str::from_utf8(&message.body).ok();
        if let Some(text) = text.filter(|t| is_error_message(t)) {
            message.error_report = Some(ErrorMessage::from_json(text)?);
            return Ok(message);
        }

        let marked = message.attributes.contains_key(HEFTY_CLIENT_VERSION_KEY);
        if !marked && !text.is_some_and(is_reference_message) {
            return Ok(message);
        }
        let text = text.ok_or_else(|| {
            HeftyError::MalformedReferenceMessage("reference body is not UTF-8".to_string())
        })?;
        let reference = ReferenceMessage::from_json(text)?;

        let blob = self
            .store
            .get(&reference.store_container, &reference.store_key)
            .await?;
        let Message { body, attributes } = payload::deserialize(&blob)?;

        message.body = body;
        message.attributes = attributes;
        message.receipt_handle = receipt_handle::wrap(
            &message.receipt_handle,
            &reference.store_container,
            &reference.store_key,
        )?;
        message.md5_of_body = reference.body_digest;
        message.md5_of_message_attributes = reference.attribute_digest;
        Ok(message)
    }

    /// Removes the stored payload first, then the queue entry. A handle that
    /// was not produced by [`Self::receive_message`] for an offloaded message
    /// is forwarded unchanged.
    pub async fn delete_message(&self, request: DeleteMessageRequest) -> Result<()> {
        match receipt_handle::unwrap(&request.receipt_handle)? {
            ReceiptHandle::Native(_) => self.queue.delete_message(request).await,
            ReceiptHandle::Offloaded {
                native_handle,
                store_container,
                store_key,
            } => {
                warn!(bucket = %store_container, key = %store_key, "deleting offloaded payload");
                self.store.delete(&store_container, &store_key).await?;
                self.queue
                    .delete_message(DeleteMessageRequest {
                        queue_url: request.queue_url,
                        receipt_handle: native_handle,
                    })
                    .await
            }
        }
    }
}
