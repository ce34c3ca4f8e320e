use std::time::Duration;

use padwire_cipher::{check_key, Text};
use padwire_frame::{FrameConfig, FrameReader, FrameWriter, DEFAULT_MAX_MESSAGE};
use padwire_transport::TcpTransport;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{PeerError, Result};
use crate::handshake::{handshake_initiator, HandshakeConfig, Role};

/// Initiator behavior.
#[derive(Debug, Clone)]
pub struct InitiatorConfig {
    /// Role the responder must announce.
    pub role: Role,
    /// Deadline for each whole frame read or written after the handshake.
    pub io_timeout: Duration,
    /// Largest message accepted locally and from the responder, in symbols.
    pub max_message_len: usize,
    /// Tag size limit and overall deadline for the role handshake.
    pub handshake: HandshakeConfig,
}

impl Default for InitiatorConfig {
    fn default() -> Self {
        Self {
            role: Role::Encode,
            io_timeout: Duration::from_secs(30),
            max_message_len: DEFAULT_MAX_MESSAGE,
            handshake: HandshakeConfig::default(),
        }
    }
}

/// Connect to a responder and transform `message` with `key`.
pub async fn transform_remote(
    host: &str,
    port: u16,
    role: Role,
    message: &Text,
    key: &Text,
) -> Result<Text> {
    let config = InitiatorConfig {
        role,
        ..InitiatorConfig::default()
    };
    transform_remote_with_config(host, port, message, key, &config).await
}

/// Connect with explicit configuration.
///
/// The key is checked against the message before any connection is made.
pub async fn transform_remote_with_config(
    host: &str,
    port: u16,
    message: &Text,
    key: &Text,
    config: &InitiatorConfig,
) -> Result<Text> {
    check_key(message, key)?;
    if message.len() > config.max_message_len {
        return Err(padwire_cipher::CipherError::TooLong {
            len: message.len(),
            max: config.max_message_len,
        }
        .into());
    }

    let stream = TcpTransport::connect(host, port).await?;
    let frame_config = FrameConfig {
        max_message_len: config.max_message_len,
        ..FrameConfig::default()
    }
    .with_timeout(config.io_timeout);

    let (read_half, write_half) = stream.into_split();
    let mut reader = FrameReader::with_config(read_half, frame_config.clone());
    let mut writer = FrameWriter::with_config(write_half, frame_config);

    let result = exchange(&mut reader, &mut writer, message, key, config).await;
    writer.shutdown().await;
    result
}

/// Run the initiator side of one exchange over an open connection.
///
/// Only the first `message.len()` key symbols are sent; the responder never
/// uses the rest. The result must have exactly the message's length and be
/// made of alphabet symbols.
pub async fn exchange<R, W>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    message: &Text,
    key: &Text,
    config: &InitiatorConfig,
) -> Result<Text>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    check_key(message, key)?;

    reader.set_max_message_len(config.handshake.max_tag_len);
    handshake_initiator(reader, writer, config.role, &config.handshake).await?;
    reader.set_max_message_len(config.max_message_len);
    tracing::debug!(role = %config.role, "handshake accepted");

    writer
        .send(message.as_bytes())
        .await
        .map_err(|err| PeerError::from_frame(err, "message"))?;
    writer
        .send(&key.as_bytes()[..message.len()])
        .await
        .map_err(|err| PeerError::from_frame(err, "key"))?;

    let reply = reader
        .read_frame()
        .await
        .map_err(|err| PeerError::from_frame(err, "result"))?;
    let result = Text::parse(reply)
        .map_err(|err| PeerError::Protocol(format!("responder sent invalid result: {err}")))?;
    if result.len() != message.len() {
        return Err(PeerError::Protocol(format!(
            "result has {} symbols, message had {}",
            result.len(),
            message.len()
        )));
    }
    tracing::debug!(size = result.len(), "received result");
    Ok(result)
}
