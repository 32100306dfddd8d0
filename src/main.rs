//! remotectl - command-line client for the remote-control socket.
//!
//! One subcommand per protocol command. Prints the server's JSON reply on
//! success; prints `error: <reason>` and exits 1 on failure. `mcp-serve`
//! runs the MCP stdio bridge instead.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use remote_control::constants::DEFAULT_SOCKET_PATH;
use remote_control::{McpBridge, RemoteClient};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "remotectl")]
#[command(version)]
#[command(about = "Drive a running application over its remote-control socket")]
struct Cli {
    /// Remote-control socket path
    #[arg(long, global = true, env = "REMOTE_CONTROL_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Seconds to wait for each reply
    #[arg(long, global = true, default_value_t = 10.0)]
    timeout: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Action {
    Tap,
    Down,
    Up,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Down => "down",
            Self::Up => "up",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server answers
    Ping,
    /// Print frame counter, UI context, console and display state
    State,
    /// Block until N more frames have been presented
    Wait {
        /// Frames to wait for
        frames: i64,
    },
    /// Capture the next presented frame
    Screenshot {
        /// Destination file (made absolute before sending)
        path: PathBuf,
    },
    /// Inject a key
    SendKey {
        /// Key name, e.g. `enter`, `left`, `f1`, `a`
        key: String,
        #[arg(long, value_enum, default_value_t = Action::Tap)]
        action: Action,
        /// Number of times to send the key (0 sends nothing)
        #[arg(long, default_value_t = 1)]
        repeat: u32,
        /// Frames to wait after each send
        #[arg(long, default_value_t = 0)]
        wait_between: i64,
    },
    /// Tap several keys in order
    SendKeys {
        /// Key names
        #[arg(required = true)]
        keys: Vec<String>,
        /// Frames to wait after each key
        #[arg(long, default_value_t = 0)]
        wait_between: i64,
    },
    /// Inject committed text
    SendText {
        /// Text to type
        text: String,
    },
    /// Run a debug console command
    Console {
        /// Console command line
        command: String,
    },
    /// Ask the application to quit
    Quit,
    /// Serve MCP JSON-RPC on stdin/stdout, forwarding tool calls to the socket
    McpServe,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(Some(reply)) => {
            println!("{reply}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs one subcommand. Returns the reply to print, if any.
fn run(cli: Cli) -> Result<Option<Value>> {
    let timeout = Duration::try_from_secs_f64(cli.timeout).context("invalid --timeout")?;
    let client = RemoteClient::new(cli.socket).with_timeout(timeout);
    log::debug!("Using socket {}", client.socket_path().display());

    let reply = match cli.command {
        Commands::Ping => client.call(&json!({"cmd": "ping"}))?,
        Commands::State => client.state()?,
        Commands::Wait { frames } => client.call(&json!({"cmd": "wait_frames", "frames": frames}))?,
        Commands::Screenshot { path } => {
            let path = std::path::absolute(&path)
                .with_context(|| format!("resolve {}", path.display()))?;
            client.call(&json!({"cmd": "screenshot", "path": path.display().to_string()}))?
        }
        Commands::SendKey {
            key,
            action,
            repeat,
            wait_between,
        } => {
            client.send_key_sequence(&key, action.as_str(), repeat, wait_between)?;
            json!({"ok": true})
        }
        Commands::SendKeys { keys, wait_between } => {
            client.tap_keys(&keys, wait_between)?;
            json!({"ok": true})
        }
        Commands::SendText { text } => client.call(&json!({"cmd": "send_text", "text": text}))?,
        Commands::Console { command } => {
            client.call(&json!({"cmd": "console_exec", "command": command}))?
        }
        Commands::Quit => client.call(&json!({"cmd": "quit"}))?,
        Commands::McpServe => {
            let stdin = std::io::stdin();
            McpBridge::new(client).serve(stdin.lock(), std::io::stdout().lock())?;
            return Ok(None);
        }
    };
    Ok(Some(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_send_key_flags() {
        let cli = Cli::try_parse_from([
            "remotectl",
            "--socket",
            "/tmp/x.sock",
            "send-key",
            "enter",
            "--action",
            "down",
            "--repeat",
            "3",
            "--wait-between",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.socket, PathBuf::from("/tmp/x.sock"));
        let Commands::SendKey { key, action, repeat, wait_between } = cli.command else {
            panic!("expected send-key");
        };
        assert_eq!(key, "enter");
        assert_eq!(action.as_str(), "down");
        assert_eq!((repeat, wait_between), (3, 2));
    }

    #[test]
    fn test_mcp_serve_takes_global_socket() {
        let cli = Cli::try_parse_from(["remotectl", "mcp-serve", "--socket", "/tmp/app.sock"]).unwrap();
        assert!(matches!(cli.command, Commands::McpServe));
        assert_eq!(cli.socket, PathBuf::from("/tmp/app.sock"));
    }

    #[test]
    fn test_send_keys_requires_a_key() {
        assert!(Cli::try_parse_from(["remotectl", "send-keys"]).is_err());
    }
}
