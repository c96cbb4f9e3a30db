//! Wire format mapping for request and response payloads.
//!
//! Encoders build JSON objects field by field and leave out every field that
//! still holds its documented default, so the service applies its own
//! defaults and payloads stay small. Decoders project response objects onto
//! typed records; fields the service omits fall back to the same defaults.

use crate::message::{
    Message, MessageId, DEFAULT_DELAY_SECS, DEFAULT_EXPIRES_IN_SECS, DEFAULT_TIMEOUT_SECS,
};
use crate::push::{PushConfig, PushInfo, PushType, DEFAULT_RETRIES, DEFAULT_RETRIES_DELAY_SECS};
use crate::queue::QueueInfo;
use serde::Deserialize;
use serde_json::{Map, Value};

// ============================================================================
// Encoding
// ============================================================================

/// Empty JSON object, the body for requests that carry no parameters.
pub fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Encode one message, omitting defaulted fields.
///
/// `delay` is compared against its documented default of 0.
pub fn message_to_wire(message: &Message) -> Value {
    let mut object = Map::new();
    object.insert("body".to_string(), Value::from(message.body.as_str()));

    if message.timeout != DEFAULT_TIMEOUT_SECS {
        object.insert("timeout".to_string(), Value::from(message.timeout));
    }
    if message.delay != DEFAULT_DELAY_SECS {
        object.insert("delay".to_string(), Value::from(message.delay));
    }
    if message.expires_in != DEFAULT_EXPIRES_IN_SECS {
        object.insert("expires_in".to_string(), Value::from(message.expires_in));
    }
    if message.id.is_assigned() {
        object.insert("id".to_string(), Value::from(message.id.as_u64()));
    }

    Value::Object(object)
}

/// Encode a batch as `{"messages": [...]}`, preserving submission order.
pub fn messages_to_wire(messages: &[Message]) -> Value {
    let encoded: Vec<Value> = messages.iter().map(message_to_wire).collect();

    let mut object = Map::new();
    object.insert("messages".to_string(), Value::Array(encoded));
    Value::Object(object)
}

/// Encode queue push settings, omitting defaulted fields and an empty subscriber list.
pub fn push_config_to_wire(config: &PushConfig) -> Value {
    let mut object = Map::new();

    if config.push_type != PushType::default() {
        let push_type = match config.push_type {
            PushType::Unicast => "unicast",
            PushType::Multicast => "multicast",
        };
        object.insert("push_type".to_string(), Value::from(push_type));
    }
    if config.retries != DEFAULT_RETRIES {
        object.insert("retries".to_string(), Value::from(config.retries));
    }
    if config.retries_delay != DEFAULT_RETRIES_DELAY_SECS {
        object.insert("retries_delay".to_string(), Value::from(config.retries_delay));
    }
    if !config.subscribers.is_empty() {
        object.insert(
            "subscribers".to_string(),
            subscriber_urls_to_wire(&config.subscribers),
        );
    }

    Value::Object(object)
}

/// Encode a subscriber list as `{"subscribers": [{"url": ...}]}`, or `{}` when empty.
pub fn subscribers_to_wire(urls: &[String]) -> Value {
    let mut object = Map::new();
    if !urls.is_empty() {
        object.insert("subscribers".to_string(), subscriber_urls_to_wire(urls));
    }
    Value::Object(object)
}

/// Encode the release body; a zero delay is left to the service default.
pub fn release_to_wire(delay: u64) -> Value {
    let mut object = Map::new();
    if delay != 0 {
        object.insert("delay".to_string(), Value::from(delay));
    }
    Value::Object(object)
}

fn subscriber_urls_to_wire(urls: &[String]) -> Value {
    Value::Array(
        urls.iter()
            .map(|url| {
                let mut entry = Map::new();
                entry.insert("url".to_string(), Value::from(url.as_str()));
                Value::Object(entry)
            })
            .collect(),
    )
}

// ============================================================================
// Decoding
// ============================================================================

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    body: String,
    #[serde(default = "default_timeout")]
    timeout: u64,
    #[serde(default)]
    delay: u64,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
    #[serde(default)]
    id: MessageId,
    #[serde(default)]
    reserved_count: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN_SECS
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message {
            body: wire.body,
            timeout: wire.timeout,
            delay: wire.delay,
            expires_in: wire.expires_in,
            id: wire.id,
            reserved_count: wire.reserved_count,
        }
    }
}

#[derive(Deserialize)]
struct WireMessages {
    #[serde(default)]
    messages: Vec<WireMessage>,
}

#[derive(Deserialize)]
struct WireIds {
    #[serde(default)]
    ids: Vec<MessageId>,
}

#[derive(Deserialize)]
struct WirePushStatuses {
    #[serde(default)]
    subscribers: Vec<PushInfo>,
}

#[derive(Deserialize)]
struct WireUrl {
    url: String,
}

#[derive(Deserialize)]
struct WireQueueInfo {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    project_id: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    push_type: Option<PushType>,
    #[serde(default)]
    retries: Option<u32>,
    #[serde(default)]
    retries_delay: Option<u64>,
    #[serde(default)]
    subscribers: Vec<WireUrl>,
}

impl From<WireQueueInfo> for QueueInfo {
    fn from(wire: WireQueueInfo) -> Self {
        QueueInfo {
            id: wire.id,
            name: wire.name,
            project_id: wire.project_id,
            size: wire.size,
            push_type: wire.push_type,
            retries: wire.retries,
            retries_delay: wire.retries_delay,
            subscribers: wire.subscribers.into_iter().map(|s| s.url).collect(),
        }
    }
}

/// Decode a single message object.
pub fn message_from_wire(value: Value) -> Result<Message, serde_json::Error> {
    serde_json::from_value::<WireMessage>(value).map(Message::from)
}

/// Decode a `{"messages": [...]}` body in service order.
pub fn messages_from_wire(body: &[u8]) -> Result<Vec<Message>, serde_json::Error> {
    let wire: WireMessages = serde_json::from_slice(body)?;
    Ok(wire.messages.into_iter().map(Message::from).collect())
}

/// Decode the `{"ids": [...]}` body returned when messages are added.
pub fn ids_from_wire(body: &[u8]) -> Result<Vec<MessageId>, serde_json::Error> {
    let wire: WireIds = serde_json::from_slice(body)?;
    Ok(wire.ids)
}

/// Pair submitted messages with the identifiers the service assigned.
///
/// The Nth message receives the Nth identifier. When fewer identifiers than
/// messages come back, only the prefix with an identifier is returned; extra
/// identifiers are ignored.
pub fn correlate_ids(submitted: &[Message], ids: &[MessageId]) -> Vec<Message> {
    submitted
        .iter()
        .zip(ids)
        .map(|(message, id)| Message {
            id: *id,
            ..message.clone()
        })
        .collect()
}

/// Decode the `{"subscribers": [...]}` push status body.
pub fn push_statuses_from_wire(body: &[u8]) -> Result<Vec<PushInfo>, serde_json::Error> {
    let wire: WirePushStatuses = serde_json::from_slice(body)?;
    Ok(wire.subscribers)
}

/// Decode a queue info object.
pub fn queue_info_from_wire(body: &[u8]) -> Result<QueueInfo, serde_json::Error> {
    let wire: WireQueueInfo = serde_json::from_slice(body)?;
    Ok(wire.into())
}

/// Decode one page of the queue listing, a bare JSON array.
pub fn queue_list_from_wire(body: &[u8]) -> Result<Vec<QueueInfo>, serde_json::Error> {
    let wire: Vec<WireQueueInfo> = serde_json::from_slice(body)?;
    Ok(wire.into_iter().map(QueueInfo::from).collect())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
