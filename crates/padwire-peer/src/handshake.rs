use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use padwire_cipher::Direction;
use padwire_frame::{FrameReader, FrameWriter};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;

use crate::error::{PeerError, Result};

/// Longest role tag accepted before a handshake is complete.
const DEFAULT_MAX_TAG_LEN: usize = 255;

/// The service a responder offers, announced by tag during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Plaintext + key -> ciphertext.
    Encode,
    /// Ciphertext + key -> plaintext.
    Decode,
}

impl Role {
    /// Wire tag announcing this role.
    pub fn tag(self) -> &'static str {
        match self {
            Role::Encode => "encode",
            Role::Decode => "decode",
        }
    }

    /// Transform direction a responder of this role applies.
    pub fn direction(self) -> Direction {
        match self {
            Role::Encode => Direction::Encode,
            Role::Decode => Direction::Decode,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "encode" => Ok(Role::Encode),
            "decode" => Ok(Role::Decode),
            other => Err(format!("unknown role '{other}' (expected encode or decode)")),
        }
    }
}

/// Configuration for the role handshake.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// Maximum tag frame size in bytes.
    ///
    /// Applied to the reader until the handshake completes so an
    /// unauthenticated peer cannot make the responder buffer a full message.
    pub max_tag_len: usize,
    /// Deadline for the whole handshake, tag and reply together.
    pub timeout: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            max_tag_len: DEFAULT_MAX_TAG_LEN,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Announce `role` and check the responder answers with the same tag.
pub async fn handshake_initiator<R, W>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    role: Role,
    config: &HandshakeConfig,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let deadline = Instant::now() + config.timeout;

    step(deadline, config.timeout, writer.send(role.tag().as_bytes())).await?;
    let reply = step(deadline, config.timeout, reader.read_frame()).await?;

    if reply.as_ref() != role.tag().as_bytes() {
        return Err(PeerError::HandshakeFailed(format!(
            "responder answered '{}' (expected '{}')",
            String::from_utf8_lossy(&reply),
            role.tag()
        )));
    }
    Ok(())
}

/// Read the initiator's tag and answer with our own.
///
/// The reply is sent whether or not the tags match, so a peer that reached
/// the wrong service learns that instead of seeing a silent close. A
/// mismatch is returned as [`PeerError::HandshakeFailed`] after the reply.
pub async fn handshake_responder<R, W>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    role: Role,
    config: &HandshakeConfig,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let deadline = Instant::now() + config.timeout;

    let tag = step(deadline, config.timeout, reader.read_frame()).await?;
    step(deadline, config.timeout, writer.send(role.tag().as_bytes())).await?;

    if tag.as_ref() != role.tag().as_bytes() {
        return Err(PeerError::HandshakeFailed(format!(
            "initiator asked for '{}' (serving '{}')",
            String::from_utf8_lossy(&tag),
            role.tag()
        )));
    }
    Ok(())
}

/// Run one handshake frame operation against the shared deadline.
async fn step<T>(
    deadline: Instant,
    timeout: Duration,
    op: impl Future<Output = padwire_frame::Result<T>>,
) -> Result<T> {
    match tokio::time::timeout_at(deadline, op).await {
        Ok(result) => result.map_err(|err| PeerError::from_frame(err, "handshake")),
        Err(_) => Err(PeerError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use padwire_frame::{FrameConfig, FrameError};
    use tokio::io::{AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};

    use super::*;

    type Framed = (FrameReader<ReadHalf<DuplexStream>>, FrameWriter<WriteHalf<DuplexStream>>);

    fn framed(stream: DuplexStream) -> Framed {
        let (read, write) = tokio::io::split(stream);
        (FrameReader::new(read), FrameWriter::new(write))
    }

    #[tokio::test]
    async fn successful_handshake() {
        let (client, server) = tokio::io::duplex(256);

        let responder = tokio::spawn(async move {
            let (mut reader, mut writer) = framed(server);
            handshake_responder(
                &mut reader,
                &mut writer,
                Role::Encode,
                &HandshakeConfig::default(),
            )
            .await
        });

        let (mut reader, mut writer) = framed(client);
        handshake_initiator(
            &mut reader,
            &mut writer,
            Role::Encode,
            &HandshakeConfig::default(),
        )
        .await
        .unwrap();
        responder.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn role_mismatch_fails_on_both_sides() {
        let (client, server) = tokio::io::duplex(256);

        let responder = tokio::spawn(async move {
            let (mut reader, mut writer) = framed(server);
            handshake_responder(
                &mut reader,
                &mut writer,
                Role::Decode,
                &HandshakeConfig::default(),
            )
            .await
        });

        let (mut reader, mut writer) = framed(client);
        let client_result = handshake_initiator(
            &mut reader,
            &mut writer,
            Role::Encode,
            &HandshakeConfig::default(),
        )
        .await;

        assert!(matches!(client_result, Err(PeerError::HandshakeFailed(_))));
        assert!(matches!(
            responder.await.unwrap(),
            Err(PeerError::HandshakeFailed(_))
        ));
    }

    #[tokio::test]
    async fn responder_replies_with_own_tag_on_mismatch() {
        let mut reader = FrameReader::new(Cursor::new(b"encode@@".to_vec()));
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let result = handshake_responder(
            &mut reader,
            &mut writer,
            Role::Decode,
            &HandshakeConfig::default(),
        )
        .await;

        assert!(matches!(result, Err(PeerError::HandshakeFailed(_))));
        assert_eq!(writer.into_inner().into_inner(), b"decode@@");
    }

    #[tokio::test]
    async fn unknown_tag_rejected() {
        let mut reader = FrameReader::new(Cursor::new(b"GET / HTTP@@".to_vec()));
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let result = handshake_responder(
            &mut reader,
            &mut writer,
            Role::Encode,
            &HandshakeConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(PeerError::HandshakeFailed(_))));
    }

    #[tokio::test]
    async fn oversized_tag_rejected() {
        let mut wire = vec![b'X'; 1024];
        wire.extend_from_slice(b"@@");
        let cfg = FrameConfig {
            max_message_len: HandshakeConfig::default().max_tag_len,
            ..FrameConfig::default()
        };
        let mut reader = FrameReader::with_config(Cursor::new(wire), cfg);
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let result = handshake_responder(
            &mut reader,
            &mut writer,
            Role::Encode,
            &HandshakeConfig::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(PeerError::Frame(FrameError::MessageTooLarge { .. }))
        ));
        assert!(writer.into_inner().into_inner().is_empty());
    }

    #[tokio::test]
    async fn closed_before_reply_is_disconnect() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let result = handshake_initiator(
            &mut reader,
            &mut writer,
            Role::Encode,
            &HandshakeConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(PeerError::Disconnected(_))));
    }

    #[tokio::test]
    async fn silent_peer_times_out() {
        let (_responder, client) = tokio::io::duplex(256);
        let (mut reader, mut writer) = framed(client);
        let cfg = HandshakeConfig {
            timeout: Duration::from_millis(25),
            ..HandshakeConfig::default()
        };

        let result = handshake_initiator(&mut reader, &mut writer, Role::Decode, &cfg).await;
        assert!(matches!(result, Err(PeerError::Timeout(d)) if d == Duration::from_millis(25)));
    }

    #[tokio::test]
    async fn trickled_tag_hits_handshake_deadline() {
        let (mut client, server) = tokio::io::duplex(256);
        // The frame layer has no deadline here; only the handshake bounds it.
        let (mut reader, mut writer) = framed(server);
        let cfg = HandshakeConfig {
            timeout: Duration::from_millis(200),
            ..HandshakeConfig::default()
        };

        let trickle = tokio::spawn(async move {
            for _ in 0..100 {
                if client.write_all(b"E").await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(40)).await;
            }
        });

        let start = std::time::Instant::now();
        let result = handshake_responder(&mut reader, &mut writer, Role::Encode, &cfg).await;
        assert!(matches!(result, Err(PeerError::Timeout(d)) if d == Duration::from_millis(200)));
        assert!(start.elapsed() < Duration::from_secs(2));
        trickle.abort();
    }

    #[test]
    fn role_parsing_and_display() {
        assert_eq!("encode".parse::<Role>().unwrap(), Role::Encode);
        assert_eq!("decode".parse::<Role>().unwrap(), Role::Decode);
        assert!("ENCODE".parse::<Role>().is_err());
        assert_eq!(Role::Decode.to_string(), "decode");
        assert_eq!(Role::Encode.direction(), Direction::Encode);
        assert_eq!(
            serde_json::to_string(&Role::Encode).unwrap(),
            "\"encode\""
        );
    }
}
