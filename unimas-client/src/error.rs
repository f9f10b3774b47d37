use std::io;

use thiserror::Error;

/// Errors returned by [`crate::Client`] and the message codec.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid client name '{0}': names may not contain '/' or be the reserved GLOBAL")]
    InvalidName(String),

    #[error("the connection is not opened")]
    NotConnected,

    #[error("failed to connect to router at {addr}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed message, expected <sender>/<recipient>/<kind>/<body>: {0:?}")]
    MalformedMessage(String),

    #[error("message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("timed out waiting for a message")]
    Timeout,

    #[error("router closed the connection")]
    ConnectionClosed,

    #[error("receive timeout must be non-zero")]
    InvalidTimeout,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
