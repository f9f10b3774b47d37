use std::{
    io::{self, Read, Write},
    net::{Shutdown, SocketAddr, TcpStream},
    time::Duration,
};

use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    message::{MESSAGE_MAX_SIZE, Message, MessageKind, RECIPIENT_GLOBAL, SEPARATOR},
};

/// Router host used when none is given.
pub const DEFAULT_ADDRESS: &str = "localhost";

/// Router port used when none is given.
pub const DEFAULT_PORT: u16 = 42069;

/// Where [`Client::connect`] should find the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub address: String,
    pub port: u16,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ConnectOptions {
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// A named participant holding one blocking TCP connection to a router.
///
/// # Connection Lifecycle
///
/// - [`Client::connect`] opens the socket and registers the name with an
///   `ADD_METAAGENT` frame.
/// - [`Client::send`] and [`Client::recv`] exchange single frames.
/// - [`Client::disconnect`] deregisters with `REMOVE_METAAGENT` and closes the
///   socket.
///
/// # Framing
///
/// Each `send` is one write and each `recv` is one read of at most
/// [`MESSAGE_MAX_SIZE`] bytes decoded as exactly one message. Frames that the
/// transport splits or coalesces are not reassembled; the router is expected
/// to write one frame per write as well.
///
/// # Example
///
/// ```no_run
/// use unimas_client::{Client, ConnectOptions, Message, MessageKind};
///
/// # fn main() -> Result<(), unimas_client::ClientError> {
/// let mut client = Client::new("agent1")?;
/// client.connect(&ConnectOptions::default())?;
/// client.send(Message::new("", "agent2", MessageKind::UserMsg, "hello"))?;
/// let reply = client.recv()?;
/// println!("{} says {}", reply.sender(), reply.body());
/// client.disconnect()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    name: String,
    /// Present exactly while connected.
    stream: Option<TcpStream>,
}

impl Client {
    /// Creates an unconnected client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidName`] if `name` contains `/` or equals
    /// `GLOBAL` ignoring case.
    pub fn new(name: impl Into<String>) -> Result<Self, ClientError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, stream: None })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn peer_addr(&self) -> Result<SocketAddr, ClientError> {
        Ok(self.stream()?.peer_addr()?)
    }

    /// Opens a connection to the router and registers this client.
    ///
    /// A single connection attempt is made. On failure nothing is written and
    /// the client keeps whatever connection it had before. Once the new
    /// connection is registered, a previously open socket is dropped without
    /// deregistering it.
    pub fn connect(&mut self, options: &ConnectOptions) -> Result<(), ClientError> {
        let mut stream = establish_connection(options)?;
        write_frame(&mut stream, &self.control_message(MessageKind::AddMetaAgent))?;

        info!(name = %self.name, router = %options.endpoint(), "registered with router");
        if self.stream.replace(stream).is_some() {
            warn!(name = %self.name, "replaced open router connection without deregistering");
        }
        Ok(())
    }

    /// Sends `message` as this client.
    ///
    /// Whatever sender the caller put on the message is replaced with this
    /// client's name.
    pub fn send(&mut self, message: Message) -> Result<(), ClientError> {
        let message = message.with_sender(self.name.as_str());
        write_frame(self.stream_mut()?, &message)?;

        debug!(
            recipient = message.recipient(),
            kind = %message.kind(),
            bytes = message.body().len(),
            "sent message"
        );
        Ok(())
    }

    /// Blocks until one frame arrives and decodes it.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Timeout`] if a receive timeout is set and expires
    /// - [`ClientError::ConnectionClosed`] if the router closed the socket
    /// - [`ClientError::MalformedMessage`] if the bytes hold fewer than three
    ///   separators
    pub fn recv(&mut self) -> Result<Message, ClientError> {
        let stream = self.stream_mut()?;
        let mut buffer = vec![0u8; MESSAGE_MAX_SIZE];

        let read = read_once(stream, &mut buffer)?;
        if read == 0 {
            return Err(ClientError::ConnectionClosed);
        }

        let message = Message::decode(&buffer[..read])?;
        debug!(
            sender = message.sender(),
            kind = %message.kind(),
            bytes = read,
            "received message"
        );
        Ok(message)
    }

    /// Sets how long subsequent [`Client::recv`] calls may block. `None`
    /// blocks indefinitely.
    pub fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> Result<(), ClientError> {
        let stream = self.stream()?;
        if timeout == Some(Duration::ZERO) {
            return Err(ClientError::InvalidTimeout);
        }
        stream.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Deregisters from the router and closes the socket.
    ///
    /// The socket is released even when the farewell write fails; that
    /// write error is still returned.
    pub fn disconnect(&mut self) -> Result<(), ClientError> {
        let mut stream = self.stream.take().ok_or(ClientError::NotConnected)?;

        let farewell = self.control_message(MessageKind::RemoveMetaAgent);
        let written = write_frame(&mut stream, &farewell);
        close_connection(stream);
        written?;

        info!(name = %self.name, "deregistered from router");
        Ok(())
    }

    fn control_message(&self, kind: MessageKind) -> Message {
        Message::new(self.name.as_str(), RECIPIENT_GLOBAL, kind, "")
    }

    fn stream(&self) -> Result<&TcpStream, ClientError> {
        self.stream.as_ref().ok_or(ClientError::NotConnected)
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream, ClientError> {
        self.stream.as_mut().ok_or(ClientError::NotConnected)
    }
}

fn validate_name(name: &str) -> Result<(), ClientError> {
    if name.contains(SEPARATOR) || name.eq_ignore_ascii_case(RECIPIENT_GLOBAL) {
        return Err(ClientError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn establish_connection(options: &ConnectOptions) -> Result<TcpStream, ClientError> {
    let stream = TcpStream::connect((options.address.as_str(), options.port)).map_err(
        |source| ClientError::Connect {
            addr: options.endpoint(),
            source,
        },
    )?;

    debug!(router = %options.endpoint(), "tcp connection established");
    Ok(stream)
}

fn write_frame(stream: &mut TcpStream, message: &Message) -> io::Result<()> {
    stream.write_all(message.encode().as_bytes())?;
    stream.flush()
}

fn read_once(stream: &mut TcpStream, buffer: &mut [u8]) -> Result<usize, ClientError> {
    loop {
        match stream.read(buffer) {
            Ok(read) => return Ok(read),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            // Unix reports an expired SO_RCVTIMEO as WouldBlock, Windows as TimedOut.
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                return Err(ClientError::Timeout);
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn close_connection(stream: TcpStream) {
    if let Err(error) = stream.shutdown(Shutdown::Both) {
        warn!(?error, "failed to shut down router connection cleanly");
    }
}
