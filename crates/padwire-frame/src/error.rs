use std::time::Duration;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The message exceeds the configured maximum size.
    ///
    /// Every payload byte is one symbol, so both numbers count symbols.
    #[error("message too large ({size} symbols, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// An outbound payload contains the frame delimiter.
    #[error("payload contains the frame delimiter at offset {offset}")]
    DelimiterInPayload { offset: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// A whole frame was not read or written before its deadline.
    #[error("frame not completed within {0:?}")]
    TimedOut(Duration),
}

impl FrameError {
    /// True when the error came from an expired frame deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FrameError::TimedOut(_))
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
