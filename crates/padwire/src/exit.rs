use std::fmt;
use std::io;
use std::path::Path;

use padwire_cipher::CipherError;
use padwire_peer::PeerError;

pub const SUCCESS: i32 = 0;
/// Local input could not be read or failed validation, or the responder
/// could not bind.
pub const FAILURE: i32 = 1;
/// Connecting, the handshake or the exchange itself failed.
pub const CONNECTION_FAILED: i32 = 2;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn input_error(path: &Path, err: io::Error) -> CliError {
    CliError::new(FAILURE, format!("cannot read {}: {err}", path.display()))
}

pub fn invalid_input(path: &Path, err: CipherError) -> CliError {
    CliError::new(FAILURE, format!("{}: {err}", path.display()))
}

/// Local validation problems are exit 1; everything on the wire is exit 2.
pub fn peer_error(context: &str, err: PeerError) -> CliError {
    let code = match err {
        PeerError::Cipher(_) | PeerError::SlotsClosed(_) => FAILURE,
        PeerError::Transport(_)
        | PeerError::Frame(_)
        | PeerError::HandshakeFailed(_)
        | PeerError::Protocol(_)
        | PeerError::Disconnected(_)
        | PeerError::Timeout(_) => CONNECTION_FAILED,
    };
    CliError::new(code, format!("{context}: {err}"))
}
