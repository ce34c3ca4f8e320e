use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use padwire_frame::DEFAULT_MAX_MESSAGE;
use padwire_peer::Role;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod keygen;
pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a message and key to a responder and print the result.
    Send(SendArgs),
    /// Run a responder until killed.
    Serve(ServeArgs),
    /// Print a random key.
    Keygen(KeygenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub async fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args).await,
        Command::Serve(args) => serve::run(args).await,
        Command::Keygen(args) => keygen::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// File holding the message. One trailing newline is ignored.
    pub message_file: PathBuf,
    /// File holding the key. One trailing newline is ignored.
    pub key_file: PathBuf,
    /// Responder port.
    pub port: u16,
    /// Role the responder must serve.
    #[arg(long, env = "PADWIRE_ROLE", default_value = "encode")]
    pub role: Role,
    /// Responder host.
    #[arg(long, env = "PADWIRE_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Deadline for the handshake and for each whole frame (e.g. 5s, 500ms).
    #[arg(long, env = "PADWIRE_TIMEOUT", default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,
    /// Largest message accepted, in symbols.
    #[arg(long, env = "PADWIRE_MAX_MESSAGE", default_value_t = DEFAULT_MAX_MESSAGE)]
    pub max_message: usize,
    /// Result output format.
    #[arg(long, value_name = "FORMAT", default_value = "raw")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on. 0 picks a free port.
    pub port: u16,
    /// Role to serve.
    #[arg(long, env = "PADWIRE_ROLE", default_value = "encode")]
    pub role: Role,
    /// Address to bind.
    #[arg(long, env = "PADWIRE_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Connections served at once.
    #[arg(long, env = "PADWIRE_MAX_WORKERS", default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..))]
    pub max_workers: u16,
    /// Deadline for the handshake and for each whole frame (e.g. 5s, 500ms).
    #[arg(long, env = "PADWIRE_TIMEOUT", default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,
    /// Largest message accepted, in symbols.
    #[arg(long, env = "PADWIRE_MAX_MESSAGE", default_value_t = DEFAULT_MAX_MESSAGE)]
    pub max_message: usize,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Number of key symbols.
    pub length: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build details.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `5s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
