//! Queue client: entry point for creating, binding and listing queues.

use crate::codec;
use crate::config::ClientConfig;
use crate::error::QueueError;
use crate::message::QueueName;
use crate::pagination::{self, ListQueuesOptions, QueueStream};
use crate::queue::Queue;
use crate::transport::{ApiRequest, HttpTransport, Transport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Client for one IronMQ project.
///
/// Cloning is cheap; clones and every [`Queue`] they produce share one
/// transport.
///
/// # Examples
///
/// ```no_run
/// use ironmq_client::{Client, ClientConfig, MessageOptions};
///
/// # async fn example() -> Result<(), ironmq_client::QueueError> {
/// let client = Client::new(ClientConfig::new("my-project", "my-token"))?;
///
/// let queue = client.create_or_get_queue(Some("jobs")).await?;
/// queue.add_message("hello", MessageOptions::default()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client that talks to the service over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Configuration` if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self, QueueError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client from `ironmq.*` files and `IRONMQ_*` environment variables.
    pub fn from_env() -> Result<Self, QueueError> {
        Self::new(ClientConfig::load()?)
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Bind a handle to an existing queue without contacting the service.
    pub fn queue(&self, name: &str) -> Result<Queue, QueueError> {
        let name = QueueName::new(name)?;
        Ok(Queue::new(name, Arc::clone(&self.transport)))
    }

    /// Create the queue if needed and return a handle to it.
    ///
    /// A missing or blank name is replaced by a random unique one. The
    /// service treats creation as idempotent; a rejected request is logged and
    /// the handle is still returned.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` only if the service cannot be reached.
    #[instrument(skip(self))]
    pub async fn create_or_get_queue(&self, name: Option<&str>) -> Result<Queue, QueueError> {
        let name = match name {
            Some(name) if !name.trim().is_empty() => QueueName::new(name)?,
            _ => QueueName::generate(),
        };
        let queue = Queue::new(name, Arc::clone(&self.transport));

        let request = ApiRequest::post(queue.queue_path(), codec::empty_object());
        let response = self.transport.send(request).await?;

        if response.is_success() {
            info!(queue = %queue.name(), "Queue ready");
        } else {
            warn!(
                queue = %queue.name(),
                status = response.status,
                "Queue create request rejected"
            );
        }

        Ok(queue)
    }

    /// Lazily list the project's queues.
    pub fn list_queues(&self, options: ListQueuesOptions) -> QueueStream {
        self.list_queues_with_cancel(options, CancellationToken::new())
    }

    /// Lazily list the project's queues until `cancel` fires.
    ///
    /// Each call walks the pages with its own cursor.
    pub fn list_queues_with_cancel(
        &self,
        options: ListQueuesOptions,
        cancel: CancellationToken,
    ) -> QueueStream {
        pagination::queue_stream(Arc::clone(&self.transport), options, cancel)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &"<Transport>")
            .finish()
    }
}
