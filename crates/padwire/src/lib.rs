//! One-time-pad text exchange over delimiter-framed TCP connections.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP listener and connected streams
//! - [`frame`]: `@@`-delimited message framing with carry-over reassembly
//! - [`cipher`]: the 27-symbol alphabet, pad transform and key generation
//! - [`peer`]: role handshake, initiator exchange and the bounded responder

/// Re-export transport types.
pub mod transport {
    pub use padwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use padwire_frame::*;
}

/// Re-export cipher types.
pub mod cipher {
    pub use padwire_cipher::*;
}

/// Re-export peer types.
pub mod peer {
    pub use padwire_peer::*;
}
