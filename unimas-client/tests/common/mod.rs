//! Blocking stub router shared by the integration tests.

#![allow(dead_code)]

use std::{
    io::{Read, Write},
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use unimas_client::{ConnectOptions, Message};

/// Upper bound on any single stub-side read so a broken client fails the test instead of hanging it.
pub const IO_TIMEOUT: Duration = Duration::from_secs(5);

pub const REGISTER_ME: &str = "me/GLOBAL/ADD_METAAGENT/";
pub const DEREGISTER_ME: &str = "me/GLOBAL/REMOVE_METAAGENT/";

/// Accepts exactly one connection on an ephemeral port and runs `script` against it.
pub fn spawn_router<T, F>(script: F) -> Result<(ConnectOptions, JoinHandle<Result<T>>)>
where
    T: Send + 'static,
    F: FnOnce(TcpStream) -> Result<T> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").context("failed to bind stub router")?;
    let port = listener.local_addr()?.port();

    let handle = thread::Builder::new()
        .name("stub-router".into())
        .spawn(move || {
            let (stream, _) = listener.accept().context("stub router accept failed")?;
            stream.set_read_timeout(Some(IO_TIMEOUT))?;
            script(stream)
        })
        .context("failed to spawn stub router")?;

    let options = ConnectOptions::default()
        .with_address("127.0.0.1")
        .with_port(port);
    Ok((options, handle))
}

pub fn join<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("stub router panicked"))?
}

/// Reads exactly `len` bytes and returns them as text.
pub fn read_text(stream: &mut TcpStream, len: usize) -> Result<String> {
    let mut buffer = vec![0u8; len];
    stream
        .read_exact(&mut buffer)
        .context("stub router short read")?;
    Ok(String::from_utf8(buffer)?)
}

/// Reads the registration frame the client must send first.
pub fn expect_registration(stream: &mut TcpStream) -> Result<Message> {
    let text = read_text(stream, REGISTER_ME.len())?;
    Ok(text.parse()?)
}

/// Reads until the client closes its side.
pub fn read_until_closed(stream: &mut TcpStream) -> Result<String> {
    let mut rest = String::new();
    stream
        .read_to_string(&mut rest)
        .context("stub router failed to read until close")?;
    Ok(rest)
}

pub fn write_text(stream: &mut TcpStream, frame: &str) -> Result<()> {
    stream.write_all(frame.as_bytes())?;
    stream.flush()?;
    Ok(())
}
