use bytes::Bytes;
use padwire_cipher::{check_key, Text};
use padwire_frame::{FrameReader, FrameWriter};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{PeerError, Result};
use crate::handshake::{handshake_responder, HandshakeConfig, Role};
use crate::listener::ResponderConfig;

/// Where a responder connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Accepted, nothing read yet.
    Accepted,
    /// Waiting for or checking the role tag.
    Authenticating,
    /// Role accepted; waiting for the message.
    Authenticated,
    /// Message accepted; waiting for the key or sending the result.
    Transferring,
    /// Result sent.
    Done,
    /// Closed early on a protocol violation or transport failure.
    Rejected,
}

/// What a completed exchange looked like, without any of its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub id: u64,
    pub role: Role,
    pub message_len: usize,
    pub key_len: usize,
}

/// One responder-side exchange over an accepted connection.
///
/// Every frame read or written after the handshake must complete within the
/// configured `io_timeout`; the handshake as a whole is bounded by
/// `handshake.timeout`.
pub struct ResponderSession<R, W> {
    id: u64,
    role: Role,
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    max_message_len: usize,
    handshake: HandshakeConfig,
    state: ConnectionState,
}

impl<R, W> ResponderSession<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        id: u64,
        mut reader: FrameReader<R>,
        mut writer: FrameWriter<W>,
        config: &ResponderConfig,
    ) -> Self {
        reader.set_read_timeout(Some(config.io_timeout));
        writer.set_write_timeout(Some(config.io_timeout));
        Self {
            id,
            role: config.role,
            reader,
            writer,
            max_message_len: config.max_message_len,
            handshake: config.handshake.clone(),
            state: ConnectionState::Accepted,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Run the exchange to completion.
    ///
    /// On any error the session is left in [`ConnectionState::Rejected`] and
    /// the caller is expected to close the connection.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        let result = self.drive().await;
        if result.is_err() {
            self.state = ConnectionState::Rejected;
        }
        result
    }

    /// Consume the session and return the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        (self.reader.into_inner(), self.writer.into_inner())
    }

    async fn drive(&mut self) -> Result<SessionSummary> {
        self.state = ConnectionState::Authenticating;
        // Nothing larger than a tag is accepted before the peer is authenticated.
        self.reader.set_max_message_len(self.handshake.max_tag_len);
        handshake_responder(&mut self.reader, &mut self.writer, self.role, &self.handshake)
            .await?;
        self.reader.set_max_message_len(self.max_message_len);
        self.writer.set_max_message_len(self.max_message_len);
        self.state = ConnectionState::Authenticated;
        tracing::debug!(conn = self.id, role = %self.role, "handshake accepted");

        let message = self.receive("message").await?;
        let message = Text::parse_bounded(message, self.max_message_len)?;
        self.state = ConnectionState::Transferring;

        let key = Text::parse(self.receive("key").await?)?;
        check_key(&message, &key)?;

        let result = self.role.direction().apply(&message, &key)?;
        self.writer
            .send(result.as_bytes())
            .await
            .map_err(|err| PeerError::from_frame(err, "result"))?;
        self.state = ConnectionState::Done;

        Ok(SessionSummary {
            id: self.id,
            role: self.role,
            message_len: message.len(),
            key_len: key.len(),
        })
    }

    async fn receive(&mut self, stage: &str) -> Result<Bytes> {
        let frame = self
            .reader
            .read_frame()
            .await
            .map_err(|err| PeerError::from_frame(err, stage))?;
        tracing::debug!(conn = self.id, stage, size = frame.len(), "received frame");
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use padwire_cipher::CipherError;
    use padwire_frame::FrameError;
    use tokio::io::AsyncWriteExt;

    use super::*;

    type MemorySession = ResponderSession<Cursor<Vec<u8>>, Cursor<Vec<u8>>>;

    fn session(role: Role, wire: &[u8]) -> MemorySession {
        let config = ResponderConfig {
            role,
            ..ResponderConfig::default()
        };
        ResponderSession::new(
            7,
            FrameReader::new(Cursor::new(wire.to_vec())),
            FrameWriter::new(Cursor::new(Vec::<u8>::new())),
            &config,
        )
    }

    fn sent(session: MemorySession) -> Vec<u8> {
        session.into_inner().1.into_inner()
    }

    #[tokio::test]
    async fn encodes_message() {
        let mut s = session(Role::Encode, b"encode@@HELLO WORLD@@XMCKLQWERTYUIOP@@");
        assert_eq!(s.state(), ConnectionState::Accepted);

        let summary = s.run().await.expect("exchange should succeed");
        assert_eq!(s.state(), ConnectionState::Done);
        assert_eq!(
            summary,
            SessionSummary {
                id: 7,
                role: Role::Encode,
                message_len: 11,
                key_len: 15,
            }
        );
        assert_eq!(sent(s), b"encode@@DQNVZPRSHDA@@");
    }

    #[tokio::test]
    async fn decodes_message() {
        let mut s = session(Role::Decode, b"decode@@DQNVZPRSHDA@@XMCKLQWERTYUIOP@@");
        s.run().await.expect("exchange should succeed");
        assert_eq!(sent(s), b"decode@@HELLO WORLD@@");
    }

    #[tokio::test]
    async fn frames_in_one_read_are_all_served() {
        // The whole exchange arrives in a single chunk and is split from carry.
        let mut s = session(Role::Encode, b"encode@@ABC@@BBB@@");
        s.run().await.expect("exchange should succeed");
        assert_eq!(sent(s), b"encode@@BCD@@");
    }

    #[tokio::test]
    async fn wrong_tag_rejected_after_reply() {
        let mut s = session(Role::Encode, b"decode@@HELLO@@WORLD@@");
        let err = s.run().await.unwrap_err();
        assert!(matches!(err, PeerError::HandshakeFailed(_)));
        assert_eq!(s.state(), ConnectionState::Rejected);
        assert_eq!(sent(s), b"encode@@");
    }

    #[tokio::test]
    async fn invalid_message_symbol_rejected() {
        let mut s = session(Role::Encode, b"encode@@hello@@KEYKEY@@");
        let err = s.run().await.unwrap_err();
        assert!(matches!(
            err,
            PeerError::Cipher(CipherError::InvalidSymbol { byte: b'h', offset: 0 })
        ));
        assert_eq!(s.state(), ConnectionState::Rejected);
        assert_eq!(sent(s), b"encode@@");
    }

    #[tokio::test]
    async fn invalid_key_symbol_rejected() {
        let mut s = session(Role::Encode, b"encode@@HELLO@@KEY$KEY@@");
        let err = s.run().await.unwrap_err();
        assert!(matches!(
            err,
            PeerError::Cipher(CipherError::InvalidSymbol { byte: b'$', offset: 3 })
        ));
    }

    #[tokio::test]
    async fn short_key_rejected() {
        let mut s = session(Role::Decode, b"decode@@HELLO WORLD@@SHORT@@");
        let err = s.run().await.unwrap_err();
        assert!(matches!(
            err,
            PeerError::Cipher(CipherError::KeyTooShort { key: 5, message: 11 })
        ));
        assert_eq!(sent(s), b"decode@@");
    }

    #[tokio::test]
    async fn disconnect_before_key() {
        let mut s = session(Role::Encode, b"encode@@HELLO@@KEY");
        let err = s.run().await.unwrap_err();
        assert!(matches!(err, PeerError::Disconnected(ref msg) if msg.contains("key")));
        assert_eq!(s.state(), ConnectionState::Rejected);
    }

    #[tokio::test]
    async fn oversized_tag_rejected_before_reply() {
        let mut wire = vec![b'A'; 4096];
        wire.extend_from_slice(b"@@");
        let mut s = session(Role::Encode, &wire);

        let err = s.run().await.unwrap_err();
        assert!(matches!(
            err,
            PeerError::Frame(FrameError::MessageTooLarge { .. })
        ));
        assert!(sent(s).is_empty());
    }

    #[tokio::test]
    async fn message_limit_applies_after_handshake() {
        let config = ResponderConfig {
            role: Role::Encode,
            max_message_len: 4,
            ..ResponderConfig::default()
        };
        let mut s = ResponderSession::new(
            1,
            FrameReader::new(Cursor::new(b"encode@@ABCDEFGH@@ABCDEFGH@@".to_vec())),
            FrameWriter::new(Cursor::new(Vec::<u8>::new())),
            &config,
        );

        let err = s.run().await.unwrap_err();
        assert!(matches!(
            err,
            PeerError::Frame(FrameError::MessageTooLarge { max: 4, .. })
        ));
    }

    #[tokio::test]
    async fn trickled_message_times_out_after_handshake() {
        let (mut client, server) = tokio::io::duplex(256);
        let (read, write) = tokio::io::split(server);
        let config = ResponderConfig {
            io_timeout: Duration::from_millis(150),
            ..ResponderConfig::default()
        };
        let mut s =
            ResponderSession::new(2, FrameReader::new(read), FrameWriter::new(write), &config);

        // Each byte beats the deadline on its own; the message frame never completes.
        let trickle = tokio::spawn(async move {
            client.write_all(b"encode@@").await?;
            for _ in 0..100 {
                client.write_all(b"A").await?;
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
            Ok::<_, std::io::Error>(())
        });

        let err = s.run().await.unwrap_err();
        assert!(matches!(err, PeerError::Timeout(d) if d == Duration::from_millis(150)));
        assert_eq!(s.state(), ConnectionState::Rejected);
        trickle.abort();
    }

    #[test]
    fn summary_serializes_without_text() {
        let summary = SessionSummary {
            id: 3,
            role: Role::Decode,
            message_len: 11,
            key_len: 20,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["role"], "decode");
        assert_eq!(json["message_len"], 11);
        assert_eq!(
            serde_json::to_string(&ConnectionState::Rejected).unwrap(),
            "\"rejected\""
        );
    }
}
