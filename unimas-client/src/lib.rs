//! Blocking client for a uni-mas message router.
//!
//! A client registers with the router under a name, exchanges `/`-separated
//! text frames over a single TCP connection, and deregisters when it leaves.
//! Each module focuses on a concrete responsibility:
//!
//! - [`message`] defines [`Message`], [`MessageKind`] and the wire codec.
//! - [`client`] owns the socket and the connect/send/recv/disconnect
//!   lifecycle.
//! - [`error`] holds [`ClientError`], returned by every fallible operation.
//! - [`cli`] parses the command-line interface of the `unimas` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application.

pub mod cli;
pub mod client;
pub mod error;
pub mod message;

pub use client::{Client, ConnectOptions, DEFAULT_ADDRESS, DEFAULT_PORT};
pub use error::ClientError;
pub use message::{MESSAGE_MAX_SIZE, Message, MessageKind, RECIPIENT_GLOBAL};
