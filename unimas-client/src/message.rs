//! Message model and the `/`-separated text wire format.
//!
//! Every frame is `<sender>/<recipient>/<kind>/<body>`. Decoding splits on the
//! first three separators only, so the body may itself contain `/`.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Reserved broadcast recipient, also the router's control address.
pub const RECIPIENT_GLOBAL: &str = "GLOBAL";

/// Largest frame a single `recv` will read.
pub const MESSAGE_MAX_SIZE: usize = 65536;

/// Field separator on the wire.
pub const SEPARATOR: char = '/';

/// Type tag carried in the third field of a frame.
///
/// Tags the router may invent later are kept as [`MessageKind::Other`] so
/// they survive a decode/encode cycle untouched. Kinds compare and hash by
/// their wire tag, so `Other("USER_MSG")` equals `UserMsg`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    UserMsg,
    AddMetaAgent,
    RemoveMetaAgent,
    Error,
    AddPortal,
    RemovePortal,
    LoadTable,
    AddRouter,
    LoadAddresses,
    RequestRouterAddresses,
    Other(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::UserMsg => "USER_MSG",
            MessageKind::AddMetaAgent => "ADD_METAAGENT",
            MessageKind::RemoveMetaAgent => "REMOVE_METAAGENT",
            MessageKind::Error => "ERROR",
            MessageKind::AddPortal => "ADD_PORTAL",
            MessageKind::RemovePortal => "REMOVE_PORTAL",
            MessageKind::LoadTable => "LOAD_TABLE",
            MessageKind::AddRouter => "ADD_ROUTER",
            MessageKind::LoadAddresses => "LOAD_ADDRESSES",
            MessageKind::RequestRouterAddresses => "REQUEST_ROUTER_ADDRESSES",
            MessageKind::Other(tag) => tag,
        }
    }
}

impl PartialEq for MessageKind {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for MessageKind {}

impl Hash for MessageKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for MessageKind {
    fn from(tag: &str) -> Self {
        match tag {
            "USER_MSG" => MessageKind::UserMsg,
            "ADD_METAAGENT" => MessageKind::AddMetaAgent,
            "REMOVE_METAAGENT" => MessageKind::RemoveMetaAgent,
            "ERROR" => MessageKind::Error,
            "ADD_PORTAL" => MessageKind::AddPortal,
            "REMOVE_PORTAL" => MessageKind::RemovePortal,
            "LOAD_TABLE" => MessageKind::LoadTable,
            "ADD_ROUTER" => MessageKind::AddRouter,
            "LOAD_ADDRESSES" => MessageKind::LoadAddresses,
            "REQUEST_ROUTER_ADDRESSES" => MessageKind::RequestRouterAddresses,
            other => MessageKind::Other(other.to_string()),
        }
    }
}

impl From<String> for MessageKind {
    fn from(tag: String) -> Self {
        MessageKind::from(tag.as_str())
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single directed message.
///
/// Fields are fixed at construction. The one change a [`crate::Client`] makes
/// before sending, stamping its own name as sender, goes through
/// [`Message::with_sender`] and yields a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender: String,
    recipient: String,
    kind: MessageKind,
    body: String,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        kind: impl Into<MessageKind>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            kind: kind.into(),
            body: body.into(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the same message spoken by `sender`.
    pub fn with_sender(self, sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            ..self
        }
    }

    /// Renders the wire form. Fields are not escaped; a `/` in sender,
    /// recipient or kind produces a frame that decodes differently.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses one frame from raw bytes read off the socket.
    pub fn decode(bytes: &[u8]) -> Result<Self, ClientError> {
        std::str::from_utf8(bytes)?.parse()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.sender, self.recipient, self.kind, self.body
        )
    }
}

impl FromStr for Message {
    type Err = ClientError;

    fn from_str(frame: &str) -> Result<Self, Self::Err> {
        let mut parts = frame.splitn(4, SEPARATOR);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(sender), Some(recipient), Some(kind), Some(body)) => {
                Ok(Message::new(sender, recipient, kind, body))
            }
            _ => Err(ClientError::MalformedMessage(frame.to_string())),
        }
    }
}
