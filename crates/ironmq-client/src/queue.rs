//! Queue handle and per-queue operations.
//!
//! A [`Queue`] is bound to a name, never to a snapshot of the queue's state:
//! every call resolves the queue by name on the service at call time.
//!
//! Operations whose result has a natural "did not happen" form (`false`, `0`,
//! empty, `None`) report an unsuccessful HTTP status through that form and log
//! it at `warn`. Only failures to reach the service, or a success response
//! that cannot be decoded, are returned as errors.

use crate::codec;
use crate::error::{QueueError, ValidationError};
use crate::message::{Message, MessageOptions, QueueName};
use crate::push::{PushConfig, PushInfo, PushType};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Largest number of messages the service hands out per request.
pub const MAX_MESSAGES_PER_REQUEST: u32 = 100;

/// Queue metadata as reported by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueInfo {
    pub id: String,
    pub name: String,
    pub project_id: String,
    /// Number of messages currently in the queue
    pub size: u64,
    /// Push settings; `None` for pull queues
    pub push_type: Option<PushType>,
    pub retries: Option<u32>,
    pub retries_delay: Option<u64>,
    pub subscribers: Vec<String>,
}

/// Handle to a named queue
#[derive(Clone)]
pub struct Queue {
    name: QueueName,
    transport: Arc<dyn Transport>,
}

impl Queue {
    /// Bind a handle to `name`. No request is made.
    pub fn new(name: QueueName, transport: Arc<dyn Transport>) -> Self {
        Self { name, transport }
    }

    pub fn name(&self) -> &QueueName {
        &self.name
    }

    pub(crate) fn queue_path(&self) -> String {
        format!("queues/{}", urlencoding::encode(self.name.as_str()))
    }

    fn messages_path(&self) -> String {
        format!("{}/messages", self.queue_path())
    }

    fn message_path(&self, message: &Message) -> Result<String, QueueError> {
        if !message.id.is_assigned() {
            return Err(ValidationError::Required {
                field: "message_id".to_string(),
            }
            .into());
        }

        Ok(format!("{}/{}", self.messages_path(), message.id))
    }

    /// Whether the response succeeded; logs the status when it did not.
    fn accepted(&self, operation: &'static str, response: &ApiResponse) -> bool {
        if response.is_success() {
            return true;
        }

        warn!(
            queue = %self.name,
            operation,
            status = response.status,
            "Service rejected queue operation"
        );
        false
    }

    // ========================================================================
    // Queue administration
    // ========================================================================

    /// Fetch queue metadata; `None` if the service does not return it.
    #[instrument(skip(self), fields(queue = %self.name))]
    pub async fn get_info(&self) -> Result<Option<QueueInfo>, QueueError> {
        let response = self.transport.send(ApiRequest::get(self.queue_path())).await?;
        if !self.accepted("get_info", &response) {
            return Ok(None);
        }

        Ok(Some(codec::queue_info_from_wire(&response.body)?))
    }

    /// Number of messages in the queue; 0 if the queue cannot be fetched.
    pub async fn get_count(&self) -> Result<u64, QueueError> {
        Ok(self.get_info().await?.map_or(0, |info| info.size))
    }

    /// Whether the queue can be fetched from the service.
    #[instrument(skip(self), fields(queue = %self.name))]
    pub async fn exists(&self) -> Result<bool, QueueError> {
        let response = self.transport.send(ApiRequest::get(self.queue_path())).await?;
        let exists = response.is_success();
        debug!(status = response.status, exists, "Checked queue existence");
        Ok(exists)
    }

    /// Delete the queue and all its messages.
    ///
    /// Deleting a queue that no longer exists returns `false`.
    #[instrument(skip(self), fields(queue = %self.name))]
    pub async fn delete(&self) -> Result<bool, QueueError> {
        let response = self
            .transport
            .send(ApiRequest::delete(self.queue_path()))
            .await?;
        Ok(self.accepted("delete", &response))
    }

    /// Apply push settings. Only non-default settings are sent.
    #[instrument(skip(self, config), fields(queue = %self.name, subscribers = config.subscribers.len()))]
    pub async fn update(&self, config: &PushConfig) -> Result<bool, QueueError> {
        let request = ApiRequest::post(self.queue_path(), codec::push_config_to_wire(config));
        let response = self.transport.send(request).await?;
        Ok(self.accepted("update", &response))
    }

    /// Add subscriber URLs to a push queue.
    #[instrument(skip(self, urls), fields(queue = %self.name, count = urls.len()))]
    pub async fn add_subscribers(&self, urls: &[String]) -> Result<bool, QueueError> {
        let request = ApiRequest::post(
            format!("{}/subscribers", self.queue_path()),
            codec::subscribers_to_wire(urls),
        );
        let response = self.transport.send(request).await?;
        Ok(self.accepted("add_subscribers", &response))
    }

    /// Remove subscriber URLs from a push queue.
    #[instrument(skip(self, urls), fields(queue = %self.name, count = urls.len()))]
    pub async fn remove_subscribers(&self, urls: &[String]) -> Result<bool, QueueError> {
        let request = ApiRequest::delete_with_body(
            format!("{}/subscribers", self.queue_path()),
            codec::subscribers_to_wire(urls),
        );
        let response = self.transport.send(request).await?;
        Ok(self.accepted("remove_subscribers", &response))
    }

    /// Remove every message from the queue.
    #[instrument(skip(self), fields(queue = %self.name))]
    pub async fn clear_messages(&self) -> Result<bool, QueueError> {
        let request = ApiRequest::post(
            format!("{}/clear", self.queue_path()),
            codec::empty_object(),
        );
        let response = self.transport.send(request).await?;
        Ok(self.accepted("clear_messages", &response))
    }

    // ========================================================================
    // Message operations
    // ========================================================================

    /// Enqueue one message.
    ///
    /// Returns the message with its assigned id, or `None` if the service
    /// rejected it.
    pub async fn add_message(
        &self,
        body: impl Into<String>,
        options: MessageOptions,
    ) -> Result<Option<Message>, QueueError> {
        let added = self
            .add_messages(&[Message::with_options(body, options)])
            .await?;
        Ok(added.into_iter().next())
    }

    /// Enqueue a batch of messages.
    ///
    /// On success each submitted message is returned with the id the service
    /// assigned to it, matched by position. A rejected batch returns an empty
    /// list. An empty input sends nothing.
    #[instrument(skip(self, messages), fields(queue = %self.name, count = messages.len()))]
    pub async fn add_messages(&self, messages: &[Message]) -> Result<Vec<Message>, QueueError> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let request = ApiRequest::post(self.messages_path(), codec::messages_to_wire(messages));
        let response = self.transport.send(request).await?;
        if !self.accepted("add_messages", &response) {
            return Ok(Vec::new());
        }

        let ids = codec::ids_from_wire(&response.body)?;
        if ids.len() < messages.len() {
            warn!(
                submitted = messages.len(),
                assigned = ids.len(),
                "Service assigned fewer ids than messages submitted"
            );
        }

        Ok(codec::correlate_ids(messages, &ids))
    }

    /// Reserve one message for `timeout` seconds.
    pub async fn get_message(&self, timeout: u64) -> Result<Option<Message>, QueueError> {
        let messages = self.get_messages(1, timeout).await?;
        Ok(messages.into_iter().next())
    }

    /// Reserve up to `n` messages for `timeout` seconds each.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Validation` if `n` is outside 1..=100.
    #[instrument(skip(self), fields(queue = %self.name))]
    pub async fn get_messages(&self, n: u32, timeout: u64) -> Result<Vec<Message>, QueueError> {
        validate_batch_size(n)?;

        let path = format!("{}?n={}&timeout={}", self.messages_path(), n, timeout);
        let response = self.transport.send(ApiRequest::get(path)).await?;
        if !self.accepted("get_messages", &response) {
            return Ok(Vec::new());
        }

        Ok(codec::messages_from_wire(&response.body)?)
    }

    /// Look at up to `n` messages without reserving them.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Validation` if `n` is outside 1..=100.
    #[instrument(skip(self), fields(queue = %self.name))]
    pub async fn peek_messages(&self, n: u32) -> Result<Vec<Message>, QueueError> {
        validate_batch_size(n)?;

        let path = format!("{}/peek?n={}", self.messages_path(), n);
        let response = self.transport.send(ApiRequest::get(path)).await?;
        if !self.accepted("peek_messages", &response) {
            return Ok(Vec::new());
        }

        Ok(codec::messages_from_wire(&response.body)?)
    }

    /// Return a reserved message to the queue, visible again after `delay` seconds.
    #[instrument(skip(self, message), fields(queue = %self.name, message_id = %message.id))]
    pub async fn release_message(&self, message: &Message, delay: u64) -> Result<bool, QueueError> {
        let path = format!("{}/release", self.message_path(message)?);
        let response = self
            .transport
            .send(ApiRequest::post(path, codec::release_to_wire(delay)))
            .await?;
        Ok(self.accepted("release_message", &response))
    }

    /// Extend a reservation by the message's timeout.
    #[instrument(skip(self, message), fields(queue = %self.name, message_id = %message.id))]
    pub async fn touch_message(&self, message: &Message) -> Result<bool, QueueError> {
        let path = format!("{}/touch", self.message_path(message)?);
        let response = self
            .transport
            .send(ApiRequest::post(path, codec::empty_object()))
            .await?;
        Ok(self.accepted("touch_message", &response))
    }

    /// Acknowledge a message, removing it from the queue.
    #[instrument(skip(self, message), fields(queue = %self.name, message_id = %message.id))]
    pub async fn delete_message(&self, message: &Message) -> Result<bool, QueueError> {
        let path = self.message_path(message)?;
        let response = self.transport.send(ApiRequest::delete(path)).await?;
        Ok(self.accepted("delete_message", &response))
    }

    /// Delivery status of a pushed message for each subscriber.
    #[instrument(skip(self, message), fields(queue = %self.name, message_id = %message.id))]
    pub async fn get_push_status(&self, message: &Message) -> Result<Vec<PushInfo>, QueueError> {
        let path = format!("{}/subscribers", self.message_path(message)?);
        let response = self.transport.send(ApiRequest::get(path)).await?;
        if !self.accepted("get_push_status", &response) {
            return Ok(Vec::new());
        }

        Ok(codec::push_statuses_from_wire(&response.body)?)
    }
}

fn validate_batch_size(n: u32) -> Result<(), ValidationError> {
    if n == 0 || n > MAX_MESSAGES_PER_REQUEST {
        return Err(ValidationError::OutOfRange {
            field: "n".to_string(),
            message: format!("must be between 1 and {}", MAX_MESSAGES_PER_REQUEST),
        });
    }
    Ok(())
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").field("name", &self.name).finish()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
