use std::sync::Arc;

use tracing::{debug, warn};

use crate::codec::error_message::ErrorMessage;
use crate::codec::reference::{ReferenceMessage, ReferenceMessageCodec, TransportWrap};
use crate::codec::threshold::{Classification, Thresholds};
use crate::config::HeftyConfig;
use crate::domains::message::{Message, PublishOutput, PublishRequest};
use crate::error::{HeftyError, Result};
use crate::interfaces::blob_store::BlobStore;
use crate::interfaces::topic::TopicClient;
use crate::services::{route, stage};

/// Topic client that publishes oversize messages as references.
///
/// Subscribers should use raw message delivery so queue consumers built on
/// [`crate::services::queue::HeftyQueueClient`] see the reference text. The
/// stored body is wrapped as `{"Message": ...}`, the shape a subscriber
/// would otherwise receive.
pub struct HeftyTopicClient {
    topic: Arc<dyn TopicClient>,
    store: Arc<dyn BlobStore>,
    config: Arc<HeftyConfig>,
    thresholds: Thresholds,
    references: ReferenceMessageCodec,
}

impl HeftyTopicClient {
    pub async fn new(
        topic: Arc<dyn TopicClient>,
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
        let references = ReferenceMessageCodec::new(
            TransportWrap::PubSubEnvelope,
            &config.region,
            &config.bucket,
        );
        Ok(Self {
            topic,
            store,
            thresholds: Thresholds::from_config(&config),
            config: Arc::new(config),
            references,
        })
    }

    pub fn inner(&self) -> &Arc<dyn TopicClient> {
        &self.topic
    }

    pub fn config(&self) -> &HeftyConfig {
        &self.config
    }

    pub async fn publish(&self, request: PublishRequest) -> Result<PublishOutput> {
        if request.message.body.is_empty() {
            return self.topic.publish(request).await;
        }
        if route(&self.thresholds, &request.message)? == Classification::SendInline {
            return self.topic.publish(request).await;
        }

        let stored = Message {
            body: self.references.wrap_body(&request.message.body)?,
            attributes: request.message.attributes,
        };
        let staged = stage(&self.references, &request.topic_arn, &stored)?;
        let reference = staged.reference;
        self.store
            .put(&reference.store_container, &reference.store_key, staged.blob)
            .await?;
        debug!(key = %reference.store_key, "uploaded offloaded payload");

        let outbound = PublishRequest {
            topic_arn: request.topic_arn,
            message: Message::new(self.references.encode(&reference)?),
            message_structure: Some("json".to_string()),
        };
        self.topic.publish(outbound).await.inspect_err(|_| {
            warn!(
                bucket = %reference.store_container,
                key = %reference.store_key,
                "publish failed after upload, payload left in store"
            );
        })
    }

    /// Publishes a failure report for subscribers that have no other channel
    /// to learn about it.
    pub async fn report_failure(
        &self,
        topic_arn: &str,
        error: &HeftyError,
        reference: Option<ReferenceMessage>,
    ) -> Result<PublishOutput> {
        let report = ErrorMessage::from_error(error, reference);
        self.topic
            .publish(PublishRequest::new(topic_arn, Message::new(report.to_json()?)))
            .await
    }
}
