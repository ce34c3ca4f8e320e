use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::ChannelStream;

/// TCP listener transport.
///
/// Provides bind/accept/connect over IPv4 or IPv6. Address resolution is
/// delegated to tokio; every resolved address is tried in order until one
/// succeeds.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `host:port`.
    ///
    /// Port `0` asks the OS for an ephemeral port; use [`local_addr`] to find
    /// out which one was chosen.
    ///
    /// [`local_addr`]: TcpTransport::local_addr
    pub async fn bind(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{host}:{port}");
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| TransportError::Bind {
                addr: addr.clone(),
                source: e,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| TransportError::Bind { addr, source: e })?;

        info!(%local_addr, "listening on tcp socket");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Wait for the next incoming connection.
    pub async fn accept(&self) -> Result<ChannelStream> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;
        debug!(%addr, "accepted connection");
        Ok(ChannelStream::from_tcp(stream))
    }

    /// Connect to a listening peer at `host:port`.
    pub async fn connect(host: &str, port: u16) -> Result<ChannelStream> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| TransportError::Connect {
                addr: format!("{host}:{port}"),
                source: e,
            })?;
        debug!(host, port, "connected to tcp socket");
        Ok(ChannelStream::from_tcp(stream))
    }

    /// The address this transport is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("local_addr", &self.local_addr)
            .finish()
    }
}
