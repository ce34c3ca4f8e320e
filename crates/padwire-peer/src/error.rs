use std::time::Duration;

use padwire_frame::FrameError;

/// Errors that can occur in peer operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] padwire_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Text failed alphabet or key-length validation.
    #[error("invalid text: {0}")]
    Cipher(#[from] padwire_cipher::CipherError),

    /// The peer announced a different role.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// The peer sent something the exchange does not allow.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Peer disconnected.
    #[error("peer disconnected: {0}")]
    Disconnected(String),

    /// A frame or the handshake did not complete in time.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The responder's worker slots were closed while waiting for one.
    #[error("worker slots closed")]
    SlotsClosed(#[from] tokio::sync::AcquireError),
}

impl PeerError {
    /// Classify a frame error raised during `stage` of an exchange.
    ///
    /// An expired frame deadline becomes [`PeerError::Timeout`] and an early
    /// EOF becomes [`PeerError::Disconnected`].
    pub fn from_frame(err: FrameError, stage: &str) -> Self {
        match err {
            FrameError::TimedOut(after) => PeerError::Timeout(after),
            FrameError::ConnectionClosed => {
                PeerError::Disconnected(format!("connection closed during {stage}"))
            }
            other => PeerError::Frame(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;
