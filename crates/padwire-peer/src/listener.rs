use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use padwire_frame::{FrameConfig, FrameReader, FrameWriter, DEFAULT_MAX_MESSAGE};
use padwire_transport::{ChannelStream, TcpTransport};
use tokio::io::AsyncWriteExt;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};

use crate::error::Result;
use crate::handshake::{HandshakeConfig, Role};
use crate::session::{ResponderSession, SessionSummary};

/// Responder behavior.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// Role announced during the handshake and applied to every exchange.
    pub role: Role,
    /// Connections served at once. Further clients wait in the accept backlog.
    pub max_workers: usize,
    /// Deadline for each whole frame read or written after the handshake.
    pub io_timeout: Duration,
    /// Largest message or key accepted, in symbols.
    pub max_message_len: usize,
    /// Tag size limit and overall deadline for the role handshake.
    pub handshake: HandshakeConfig,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            role: Role::Encode,
            max_workers: 5,
            io_timeout: Duration::from_secs(30),
            max_message_len: DEFAULT_MAX_MESSAGE,
            handshake: HandshakeConfig::default(),
        }
    }
}

/// Accepts connections and serves each one on its own task.
///
/// A worker slot is a semaphore permit. The accept loop takes a permit
/// before it accepts, so at most `max_workers` connections are served at
/// once and the rest wait in the kernel backlog. The permit moves into the
/// connection's task and is returned when that task ends, however it ends.
pub struct Responder {
    transport: TcpTransport,
    config: ResponderConfig,
    slots: Arc<Semaphore>,
    workers: JoinSet<()>,
    next_conn_id: u64,
}

impl Responder {
    /// Bind to `host:port`. A `max_workers` of zero is raised to one.
    pub async fn bind(host: &str, port: u16, mut config: ResponderConfig) -> Result<Self> {
        let transport = TcpTransport::bind(host, port).await?;
        config.max_workers = config.max_workers.max(1);
        let slots = Arc::new(Semaphore::new(config.max_workers));
        Ok(Self {
            transport,
            config,
            slots,
            workers: JoinSet::new(),
            next_conn_id: 1,
        })
    }

    /// Bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Accept and serve connections forever.
    ///
    /// A failed accept is logged and the loop continues; nothing a single
    /// connection does stops the responder. This future never completes.
    pub async fn serve(&mut self) {
        tracing::info!(
            addr = %self.local_addr(),
            role = %self.config.role,
            max_workers = self.config.max_workers,
            "responder ready"
        );
        loop {
            if let Err(err) = self.accept_next().await {
                tracing::warn!(error = %err, "accept failed");
            }
        }
    }

    /// Accept `count` connections, then wait for every worker to finish.
    pub async fn serve_connections(&mut self, count: usize) {
        for _ in 0..count {
            if let Err(err) = self.accept_next().await {
                tracing::warn!(error = %err, "accept failed");
            }
        }
        self.join_workers().await;
    }

    /// Wait for every running worker.
    pub async fn join_workers(&mut self) {
        while let Some(outcome) = self.workers.join_next().await {
            log_worker_exit(outcome);
        }
    }

    /// Wait for a slot, accept one connection and hand both to a new task.
    async fn accept_next(&mut self) -> Result<()> {
        let permit = Arc::clone(&self.slots).acquire_owned().await?;
        let stream = self.transport.accept().await?;

        let id = self.next_conn_id;
        self.next_conn_id += 1;
        let config = self.config.clone();

        self.workers.spawn(serve_connection(id, stream, config, permit));
        self.reap_finished();
        Ok(())
    }

    fn reap_finished(&mut self) {
        while let Some(outcome) = self.workers.try_join_next() {
            log_worker_exit(outcome);
        }
    }
}

fn log_worker_exit(outcome: std::result::Result<(), JoinError>) {
    if let Err(err) = outcome {
        if err.is_panic() {
            tracing::error!("connection worker panicked");
        }
    }
}

async fn serve_connection(
    id: u64,
    stream: ChannelStream,
    config: ResponderConfig,
    permit: OwnedSemaphorePermit,
) {
    // Declared first so it drops last, after the socket is closed.
    let _permit = permit;
    let peer = stream.peer_addr();
    tracing::debug!(conn = id, ?peer, "worker started");

    match run_session(id, stream, &config).await {
        Ok(summary) => tracing::info!(
            conn = id,
            role = %summary.role,
            message_len = summary.message_len,
            key_len = summary.key_len,
            "exchange complete"
        ),
        Err(err) => tracing::warn!(conn = id, ?peer, error = %err, "connection rejected"),
    }
}

async fn run_session(
    id: u64,
    stream: ChannelStream,
    config: &ResponderConfig,
) -> Result<SessionSummary> {
    let frame_config = FrameConfig {
        max_message_len: config.max_message_len,
        ..FrameConfig::default()
    }
    .with_timeout(config.io_timeout);

    let (read_half, write_half) = stream.into_split();
    let reader = FrameReader::with_config(read_half, frame_config.clone());
    let writer = FrameWriter::with_config(write_half, frame_config);

    let mut session = ResponderSession::new(id, reader, writer, config);
    let result = session.run().await;
    tracing::trace!(conn = id, state = ?session.state(), "session ended");

    let (_, mut write_half) = session.into_inner();
    let _ = write_half.shutdown().await;
    result
}
