use std::io::ErrorKind;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete delimited messages to any `AsyncWrite` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: AsyncWrite + Unpin> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send one message followed by the delimiter.
    ///
    /// Short writes are resumed until every byte is out. A write that
    /// reports zero bytes means the peer is gone. With a `write_timeout`
    /// configured, draining and flushing the whole frame must finish before
    /// the deadline or `FrameError::TimedOut` is returned.
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_message_len {
            return Err(FrameError::MessageTooLarge {
                size: payload.len(),
                max: self.config.max_message_len,
            });
        }

        self.buf.clear();
        encode_frame(payload, &mut self.buf)?;

        match self.config.write_timeout {
            Some(limit) => tokio::time::timeout(limit, self.drain())
                .await
                .map_err(|_| FrameError::TimedOut(limit))??,
            None => self.drain().await?,
        }
        tracing::trace!(size = payload.len(), "sent frame");
        Ok(())
    }

    async fn drain(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]).await {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        self.flush().await
    }

    /// Flush the underlying stream.
    pub async fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush().await {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Send FIN so the peer sees end of stream after the last frame.
    ///
    /// Errors from a peer that is already gone are ignored.
    pub async fn shutdown(&mut self) {
        let _ = self.inner.shutdown().await;
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum message size for subsequent encoding.
    pub fn set_max_message_len(&mut self, max_message_len: usize) {
        self.config.max_message_len = max_message_len;
    }

    /// Replace the per-frame write deadline.
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) {
        self.config.write_timeout = timeout;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
