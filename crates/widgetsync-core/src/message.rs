//! Protocol messages.
//!
//! `Frame` is the unit a kernel moves between the process and the frontend.
//! The `data` of a `comm_msg` frame carries one of the widget methods below.

use crate::Guid;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Widget protocol version stamped on every non-close outbound message.
pub const PROTOCOL_VERSION: &str = "2.0.0";

/// Property name to serialized value. Used both for partial patches and
/// for full snapshots.
pub type State = serde_json::Map<String, Value>;

/// Kernel-level frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum Frame {
    /// Announce a new channel to the peer.
    CommOpen {
        comm_id: Guid,
        target_name: String,
        #[serde(default)]
        metadata: Value,
        #[serde(default)]
        data: Value,
    },
    /// A message on an open channel.
    CommMsg {
        comm_id: Guid,
        #[serde(default)]
        metadata: Value,
        #[serde(default)]
        data: Value,
    },
    /// Tear down a channel.
    CommClose {
        comm_id: Guid,
        #[serde(default)]
        metadata: Value,
        #[serde(default)]
        data: Value,
    },
    /// Rich output for the presentation layer.
    DisplayData {
        data: Value,
        #[serde(default)]
        metadata: Value,
        #[serde(default)]
        transient: Value,
    },
}

impl Frame {
    /// The channel this frame addresses, if any.
    pub fn comm_id(&self) -> Option<Guid> {
        match self {
            Frame::CommOpen { comm_id, .. }
            | Frame::CommMsg { comm_id, .. }
            | Frame::CommClose { comm_id, .. } => Some(*comm_id),
            Frame::DisplayData { .. } => None,
        }
    }
}

/// An inbound message as seen by a transport: `{metadata, content}` where
/// `content.data` holds the method payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommMessage {
    #[serde(default)]
    pub metadata: Value,
    pub content: Value,
}

impl CommMessage {
    /// Build a message from the pieces of a `comm_msg` frame.
    pub fn new(comm_id: Guid, metadata: Value, data: Value) -> Self {
        Self {
            metadata,
            content: serde_json::json!({ "comm_id": comm_id, "data": data }),
        }
    }

    /// The method payload (`Value::Null` when absent).
    pub fn data(&self) -> &Value {
        &self.content["data"]
    }
}

/// Methods a peer may send to a transport.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Inbound {
    /// Apply a partial state patch.
    Update {
        #[serde(default)]
        state: Option<State>,
    },
    /// Resend the full state.
    RequestState,
    /// Application-defined payload for registered listeners.
    Custom {
        #[serde(default)]
        content: Option<Value>,
    },
    /// Anything else; ignored.
    #[serde(other)]
    Unknown,
}

impl Inbound {
    pub fn parse(data: &Value) -> Result<Self, serde_json::Error> {
        Inbound::deserialize(data)
    }
}

/// Methods a transport sends to its peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Outbound {
    Update { state: State },
    Custom { content: Value },
}

/// Payload of the `comm_open` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenData {
    pub state: State,
}

/// Metadata attached to open, update and custom messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
        }
    }
}
