//! Paged enumeration of queues.
//!
//! The service lists queues a page at a time. [`queue_stream`] walks the pages
//! lazily: a page is fetched only when the consumer has drained the previous
//! one, and the walk stops at the first short page.

use crate::codec;
use crate::error::{QueueError, ValidationError};
use crate::message::QueueName;
use crate::queue::Queue;
use crate::transport::{ApiRequest, HttpMethod, Transport};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Page size the service uses when none is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Largest page size the service accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Stream of queue handles produced by a listing
pub type QueueStream = Pin<Box<dyn Stream<Item = Result<Queue, QueueError>> + Send>>;

/// Where a queue listing starts and how many queues each page holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQueuesOptions {
    /// Zero-based page to fetch first
    pub start_page: u32,
    pub page_size: u32,
}

impl Default for ListQueuesOptions {
    fn default() -> Self {
        Self {
            start_page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQueuesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_page(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Check the page size is one the service accepts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::OutOfRange {
                field: "page_size".to_string(),
                message: format!("must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }
        Ok(())
    }

    /// Request path for `page`; `per_page` is sent only for a non-default size.
    pub fn page_path(&self, page: u32) -> String {
        if self.page_size == DEFAULT_PAGE_SIZE {
            format!("queues?page={}", page)
        } else {
            format!("queues?page={}&per_page={}", page, self.page_size)
        }
    }
}

/// Lazily list queues page by page.
///
/// `cancel` is checked before every page fetch. Cancelling ends the stream
/// without an error; handles already yielded stay valid. A failed page fetch
/// is yielded as the final item.
pub fn queue_stream(
    transport: Arc<dyn Transport>,
    options: ListQueuesOptions,
    cancel: CancellationToken,
) -> QueueStream {
    let stream = async_stream::stream! {
        if let Err(e) = options.validate() {
            yield Err(QueueError::from(e));
            return;
        }

        let mut page = options.start_page;
        loop {
            if cancel.is_cancelled() {
                debug!(page, "Queue listing cancelled");
                break;
            }

            let path = options.page_path(page);
            let response = match transport.send(ApiRequest::get(path.clone())).await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            };

            if !response.is_success() {
                warn!(page, status = response.status, "Queue listing page rejected");
                yield Err(QueueError::UnexpectedStatus {
                    method: HttpMethod::Get.to_string(),
                    path,
                    status: response.status,
                });
                break;
            }

            let infos = match codec::queue_list_from_wire(&response.body) {
                Ok(infos) => infos,
                Err(e) => {
                    yield Err(QueueError::from(e));
                    break;
                }
            };

            let fetched = infos.len();
            debug!(page, fetched, "Fetched queue listing page");

            for info in infos {
                match QueueName::new(info.name) {
                    Ok(name) => {
                        yield Ok(Queue::new(name, Arc::clone(&transport)));
                    }
                    Err(e) => {
                        yield Err(QueueError::from(e));
                    }
                }
            }

            if fetched != options.page_size as usize {
                break;
            }
            page = match page.checked_add(1) {
                Some(next) => next,
                None => {
                    warn!(page, "Queue listing reached the last addressable page");
                    break;
                }
            };
        }
    };

    Box::pin(stream)
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
