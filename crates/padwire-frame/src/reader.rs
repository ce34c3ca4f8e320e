use std::io::ErrorKind;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec::{decode_frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete delimited messages from any `AsyncRead` stream.
///
/// Handles partial reads internally; callers always get complete messages.
/// Bytes that arrive after a delimiter are kept as carry and served by the
/// next [`read_frame`](FrameReader::read_frame) call before the stream is
/// touched again.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    scanned: usize,
    config: FrameConfig,
}

impl<T: AsyncRead + Unpin> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            scanned: 0,
            config,
        }
    }

    /// Read the next complete message.
    ///
    /// With a `read_timeout` configured the whole frame must arrive before
    /// the deadline, so a peer sending one byte at a time still gets
    /// `Err(FrameError::TimedOut)`. Returns `Err(FrameError::ConnectionClosed)`
    /// when EOF is reached before a delimiter, and
    /// `Err(FrameError::MessageTooLarge)` as soon as the buffered bytes can no
    /// longer form a message within the limit.
    ///
    /// Bytes read before a deadline expires stay buffered.
    pub async fn read_frame(&mut self) -> Result<Bytes> {
        match self.config.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fill_frame())
                .await
                .map_err(|_| FrameError::TimedOut(limit))?,
            None => self.fill_frame().await,
        }
    }

    async fn fill_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(message) =
                decode_frame(&mut self.buf, &mut self.scanned, self.config.max_message_len)?
            {
                tracing::trace!(
                    size = message.len(),
                    carry = self.buf.len(),
                    "decoded frame"
                );
                return Ok(message);
            }

            self.buf.reserve(READ_CHUNK_SIZE);
            let read = match self.inner.read_buf(&mut self.buf).await {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }
        }
    }

    /// Bytes received past the last delimiter and not yet returned.
    #[cfg(test)]
    fn carry(&self) -> &[u8] {
        &self.buf
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Any carry is discarded.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum message size for subsequent decoding.
    pub fn set_max_message_len(&mut self, max_message_len: usize) {
        self.config.max_message_len = max_message_len;
    }

    /// Replace the per-frame read deadline.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.config.read_timeout = timeout;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
