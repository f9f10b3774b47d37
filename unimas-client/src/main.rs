use std::{
    io::{self, Write},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use unimas_client::{
    Client, ClientError, ConnectOptions, Message,
    cli::{Cli, Command, ListenArgs, SendArgs},
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Stdout carries received messages, so diagnostics go to stderr.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let options = ConnectOptions::from(&cli.router);

    let mut client = Client::new(cli.name.as_str()).context("invalid --name")?;
    client
        .connect(&options)
        .with_context(|| format!("could not register with router at {}", options.endpoint()))?;

    let outcome = match cli.command {
        Command::Send(args) => send_one(&mut client, args),
        Command::Listen(args) => listen(&mut client, &args),
    };

    let disconnected = client
        .disconnect()
        .context("failed to deregister from router");
    outcome?;
    disconnected
}

fn send_one(client: &mut Client, args: SendArgs) -> Result<()> {
    let message = Message::new(client.name(), args.to, args.kind, args.body);
    client.send(message).context("failed to send message")?;
    Ok(())
}

fn listen(client: &mut Client, args: &ListenArgs) -> Result<()> {
    if let Some(seconds) = args.timeout {
        let timeout = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("invalid --timeout {seconds}"))?;
        client
            .set_recv_timeout(Some(timeout))
            .context("failed to configure receive timeout")?;
    }

    let mut stdout = io::stdout().lock();
    let mut received = 0usize;

    while args.count.map_or(true, |limit| received < limit) {
        let message = match client.recv() {
            Ok(message) => message,
            Err(ClientError::Timeout) => {
                info!("no message before timeout, stopping");
                break;
            }
            Err(err) => return Err(err).context("failed to receive message"),
        };

        render_message(&mut stdout, &message, args.json)?;
        received += 1;
    }

    info!(received, "stopped listening");
    Ok(())
}

fn render_message<W: Write>(out: &mut W, message: &Message, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, message)?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "[{}] {} -> {}: {}",
            message.kind(),
            message.sender(),
            message.recipient(),
            message.body()
        )?;
    }
    out.flush()?;
    Ok(())
}
