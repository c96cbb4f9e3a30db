//! # IronMQ Client
//!
//! Async client for the IronMQ v1 hosted message queue service.
//!
//! This library provides:
//! - Queue creation, lookup and paged, cancellable listing
//! - Message lifecycle operations: add, reserve, peek, touch, release, delete
//! - Push queue administration and delivery status
//! - Layered configuration from files and environment variables
//!
//! ## Module Organization
//!
//! - [`error`] - Error types for all queue operations
//! - [`cloud`] - Hosting regions and their endpoints
//! - [`config`] - Client configuration and loading
//! - [`message`] - Message structures and identifiers
//! - [`push`] - Push queue settings and delivery status
//! - [`codec`] - Wire format for requests and responses
//! - [`transport`] - HTTP transport seam
//! - [`queue`] - Queue handle and per-queue operations
//! - [`pagination`] - Paged queue listing
//! - [`client`] - Entry point for creating and listing queues
//!
//! ## Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use ironmq_client::{Client, ClientConfig, ListQueuesOptions, MessageOptions};
//!
//! # async fn example() -> Result<(), ironmq_client::QueueError> {
//! let client = Client::new(ClientConfig::new("my-project", "my-token"))?;
//!
//! let queue = client.create_or_get_queue(Some("demo")).await?;
//! queue.add_message("x", MessageOptions::default()).await?;
//!
//! if let Some(message) = queue.get_message(60).await? {
//!     queue.delete_message(&message).await?;
//! }
//!
//! let mut queues = client.list_queues(ListQueuesOptions::default());
//! while let Some(queue) = queues.next().await {
//!     println!("{}", queue?.name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod cloud;
pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod pagination;
pub mod push;
pub mod queue;
pub mod transport;

// Re-export commonly used types at crate root for convenience
pub use client::Client;
pub use cloud::Cloud;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ConfigurationError, QueueError, ValidationError};
pub use message::{Message, MessageId, MessageOptions, QueueName};
pub use pagination::{ListQueuesOptions, QueueStream};
pub use push::{PushConfig, PushInfo, PushType};
pub use queue::{Queue, QueueInfo};
pub use tokio_util::sync::CancellationToken;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, Transport};
