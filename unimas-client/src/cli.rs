use clap::{Args, Parser, Subcommand};

use crate::client::{ConnectOptions, DEFAULT_ADDRESS, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub router: RouterArgs,

    /// Name this client registers under. May not contain '/' or be GLOBAL.
    #[arg(long, global = true, default_value = "unimas-cli")]
    pub name: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register, send a single message, then deregister.
    Send(SendArgs),
    /// Register and print incoming messages until a limit is reached.
    Listen(ListenArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RouterArgs {
    /// Host name or IP address of the router.
    #[arg(long, global = true, default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// TCP port the router listens on.
    #[arg(long, global = true, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl From<&RouterArgs> for ConnectOptions {
    fn from(args: &RouterArgs) -> Self {
        ConnectOptions::default()
            .with_address(args.address.clone())
            .with_port(args.port)
    }
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Recipient name, or GLOBAL to address the router.
    #[arg(long)]
    pub to: String,

    /// Message type tag written verbatim on the wire.
    #[arg(long, default_value = "USER_MSG")]
    pub kind: String,

    /// Message payload. May contain '/'.
    pub body: String,
}

#[derive(Args, Debug, Clone)]
pub struct ListenArgs {
    /// Stop after this many messages.
    #[arg(long)]
    pub count: Option<usize>,

    /// Stop once no message arrives for this many seconds.
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Print each message as a JSON object instead of a readable line.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["unimas", "send", "--to", "bob", "hi"]).expect("parse");
        assert_eq!(ConnectOptions::from(&cli.router), ConnectOptions::default());
        assert_eq!(cli.name, "unimas-cli");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.to, "bob");
                assert_eq!(args.kind, "USER_MSG");
                assert_eq!(args.body, "hi");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_options_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "unimas", "listen", "--name", "me", "--address", "127.0.0.1", "--port", "7000",
            "--count", "2", "--json",
        ])
        .expect("parse");

        assert_eq!(cli.name, "me");
        assert_eq!(ConnectOptions::from(&cli.router).endpoint(), "127.0.0.1:7000");
        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.count, Some(2));
                assert_eq!(args.timeout, None);
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
