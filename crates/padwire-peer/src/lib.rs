//! Initiator and responder roles.
//!
//! An initiator connects, proves it wants the responder's role, sends a
//! message and a key, and reads back the transformed text. A responder
//! accepts connections under a fixed number of worker slots and runs each
//! exchange on its own tokio task. Every frame, and the handshake as a whole,
//! runs against a deadline, so a peer that stalls or trickles bytes loses its
//! slot instead of holding it.

pub mod connector;
pub mod error;
pub mod handshake;
pub mod listener;
pub mod session;

pub use connector::{exchange, transform_remote, transform_remote_with_config, InitiatorConfig};
pub use error::{PeerError, Result};
pub use handshake::{handshake_initiator, handshake_responder, HandshakeConfig, Role};
pub use listener::{Responder, ResponderConfig};
pub use session::{ConnectionState, ResponderSession, SessionSummary};
