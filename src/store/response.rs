//! Structured decoding of the store's v2 key API responses
//!
//! Every decoder here is pure: it takes the status code, the index header and
//! the raw body, and either yields a typed outcome or a typed error. Nothing
//! is extracted by pattern matching on text except the version marker, which
//! older stores return as plain text.

use crate::common::{Error, Result};
use serde::Deserialize;

/// Response header carrying the store's current index
pub const INDEX_HEADER: &str = "x-etcd-index";

/// Substring every store version response contains
pub const SERVER_MARKER: &str = "etcd";

/// errorCode for "Key not found"
pub const KEY_NOT_FOUND: u64 = 100;

/// errorCode for "The event in requested index is outdated and cleared"
pub const EVENT_INDEX_CLEARED: u64 = 401;

/// Successful key operation (`get`, `set`, watch event)
#[derive(Debug, Clone, Deserialize)]
pub struct NodeResponse {
    pub action: String,
    pub node: Node,
    #[serde(rename = "prevNode", default)]
    pub prev_node: Option<Node>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub dir: bool,
    #[serde(rename = "modifiedIndex", default)]
    pub modified_index: Option<u64>,
    #[serde(rename = "createdIndex", default)]
    pub created_index: Option<u64>,
    #[serde(default)]
    pub ttl: Option<i64>,
}

/// Error body returned alongside non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "errorCode")]
    pub error_code: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub index: Option<u64>,
}

impl From<ErrorBody> for Error {
    fn from(body: ErrorBody) -> Self {
        let message = match body.cause {
            Some(cause) => format!("{} ({})", body.message, cause),
            None => body.message,
        };
        Error::Store {
            code: body.error_code,
            message,
        }
    }
}

/// Result of the connectivity probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Connected { version: String },
    Unreachable(String),
    Malformed(String),
}

impl Probe {
    pub fn is_connected(&self) -> bool {
        matches!(self, Probe::Connected { .. })
    }

    /// Collapse into the error taxonomy. Unreachable and malformed stay
    /// distinct variants so they are reported with distinct messages.
    pub fn into_result(self) -> Result<String> {
        match self {
            Probe::Connected { version } => Ok(version),
            Probe::Unreachable(reason) => Err(Error::Unreachable(reason)),
            Probe::Malformed(reason) => Err(Error::MalformedResponse(reason)),
        }
    }
}

/// Result of a single-key read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Present { value: String, index: u64 },
    Absent { index: u64 },
}

/// Result of a single-key long-poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Changed { value: String, index: u64 },
    TimedOut,
}

pub fn decode_version(body: &str) -> Probe {
    let body = body.trim();
    if body.is_empty() {
        return Probe::Unreachable("empty version response".into());
    }
    if !body.contains(SERVER_MARKER) {
        return Probe::Malformed(format!("version response lacks server marker: {}", body));
    }
    Probe::Connected {
        version: body.to_string(),
    }
}

/// waitIndex that resumes strictly after `observed`.
///
/// The store yields the first event at or above waitIndex, and everything up
/// to `observed` was already covered by the read.
pub fn resume_index(observed: u64) -> u64 {
    observed.saturating_add(1)
}

pub fn parse_index_header(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse().ok())
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(|b| b.is_ascii_whitespace())
}

fn parse_node(body: &[u8]) -> Result<NodeResponse> {
    serde_json::from_slice(body)
        .map_err(|e| Error::MalformedResponse(format!("undecodable key response: {}", e)))
}

fn parse_error(body: &[u8]) -> Result<ErrorBody> {
    serde_json::from_slice(body)
        .map_err(|e| Error::MalformedResponse(format!("undecodable error response: {}", e)))
}

fn node_value(response: NodeResponse) -> Result<(String, Option<u64>)> {
    if response.node.dir {
        return Err(Error::MalformedResponse(format!(
            "{} is a directory, not a status key",
            response.node.key.unwrap_or_default()
        )));
    }
    match response.node.value {
        Some(value) => Ok((value, response.node.modified_index)),
        None => Err(Error::MalformedResponse(format!(
            "'{}' event carried no value",
            response.action
        ))),
    }
}

/// Decode a `GET /v2/keys/{key}` response.
///
/// An absent key must still report the store index, from the header or the
/// error body; without it a watch cannot be resumed and the read fails.
pub fn decode_read(status: u16, index_header: Option<u64>, body: &[u8]) -> Result<ReadOutcome> {
    if (200..300).contains(&status) {
        let (value, modified) = node_value(parse_node(body)?)?;
        let index = index_header.or(modified).ok_or_else(|| {
            Error::MalformedResponse("read response carried no index".into())
        })?;
        return Ok(ReadOutcome::Present { value, index });
    }

    let error = parse_error(body)?;
    if error.error_code != KEY_NOT_FOUND {
        return Err(error.into());
    }
    match index_header.or(error.index) {
        Some(index) => Ok(ReadOutcome::Absent { index }),
        None => Err(Error::MalformedResponse(
            "key-not-found response carried no index".into(),
        )),
    }
}

/// Decode a `GET /v2/keys/{key}?wait=true` response.
pub fn decode_watch(body: &[u8]) -> Result<WatchOutcome> {
    if is_blank(body) {
        return Ok(WatchOutcome::TimedOut);
    }

    let raw: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| Error::MalformedResponse(format!("undecodable watch response: {}", e)))?;
    if raw.get("errorCode").is_some() {
        let error: ErrorBody = serde_json::from_value(raw)
            .map_err(|e| Error::MalformedResponse(format!("undecodable error response: {}", e)))?;
        return Err(error.into());
    }

    let response: NodeResponse = serde_json::from_value(raw)
        .map_err(|e| Error::MalformedResponse(format!("undecodable watch event: {}", e)))?;
    let (value, modified) = node_value(response)?;
    Ok(WatchOutcome::Changed {
        value,
        index: modified.unwrap_or_default(),
    })
}

/// Decode a `PUT /v2/keys/{key}` response. Any non-error response is an ack.
pub fn decode_write(status: u16, body: &[u8]) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    match parse_error(body) {
        Ok(error) => Err(Error::Publish(format!(
            "store rejected write ({}): {}",
            error.error_code, error.message
        ))),
        Err(_) => Err(Error::Publish(format!("store returned HTTP {}", status))),
    }
}
