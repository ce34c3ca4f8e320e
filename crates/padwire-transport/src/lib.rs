//! TCP byte-stream transport.
//!
//! This is the lowest layer of padwire. It knows nothing about frames or
//! ciphers: it binds, accepts and connects, and hands out [`ChannelStream`]s
//! that implement `AsyncRead + AsyncWrite` and split into owned halves.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::ChannelStream;
pub use tcp::TcpTransport;
