use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// End-of-message marker: "@@".
pub const DELIMITER: [u8; 2] = *b"@@";

/// Default maximum message size: 96,000 symbols (one byte each).
pub const DEFAULT_MAX_MESSAGE: usize = 96_000;

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────────┬───────────┐
/// │ Payload (N bytes)    │ "@@" (2B) │
/// └──────────────────────┴───────────┘
/// ```
///
/// The payload must not contain the delimiter itself.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if let Some(offset) = find_delimiter(payload, 0) {
        return Err(FrameError::DelimiterInPayload { offset });
    }
    dst.reserve(payload.len() + DELIMITER.len());
    dst.put_slice(payload);
    dst.put_slice(&DELIMITER);
    Ok(())
}

/// Find the first delimiter in `haystack` starting at byte `from`.
///
/// Returns the offset of the delimiter's first byte.
pub fn find_delimiter(haystack: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(DELIMITER.len())
        .position(|window| window == DELIMITER)
        .map(|pos| from + pos)
}

/// Decode one delimited message from the front of `src`.
///
/// `scanned` is how many bytes of `src` were already searched without
/// finding a delimiter; the search resumes one byte before that point so a
/// delimiter split across two reads is still found. It is reset to zero
/// once a message is split off.
///
/// Returns `Ok(None)` if `src` does not hold a complete message yet. On
/// success the message and its delimiter are consumed and every byte after
/// the delimiter stays in `src` as carry for the next call.
pub fn decode_frame(
    src: &mut BytesMut,
    scanned: &mut usize,
    max_message: usize,
) -> Result<Option<Bytes>> {
    let from = scanned.saturating_sub(DELIMITER.len() - 1);

    match find_delimiter(&src[..], from) {
        Some(pos) => {
            if pos > max_message {
                return Err(FrameError::MessageTooLarge {
                    size: pos,
                    max: max_message,
                });
            }
            let message = src.split_to(pos).freeze();
            src.advance(DELIMITER.len());
            *scanned = 0;
            Ok(Some(message))
        }
        None => {
            *scanned = src.len();
            // A trailing delimiter byte may still complete a max-length message.
            if src.len() > max_message.saturating_add(DELIMITER.len() - 1) {
                return Err(FrameError::MessageTooLarge {
                    size: src.len(),
                    max: max_message,
                });
            }
            Ok(None)
        }
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum message size in symbols, delimiter excluded. Default: 96,000.
    pub max_message_len: usize,
    /// Deadline for reading one whole frame, however many reads it takes.
    pub read_timeout: Option<Duration>,
    /// Deadline for writing and flushing one whole frame.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl FrameConfig {
    /// Same limits with one timeout applied to both directions.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self.write_timeout = Some(timeout);
        self
    }
}
