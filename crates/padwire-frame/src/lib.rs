//! Delimiter-terminated message framing.
//!
//! Every logical unit on the wire is a run of payload bytes followed by the
//! two-byte delimiter `@@`. The delimiter is not an alphabet symbol, so it
//! can never occur inside a valid payload.
//!
//! [`FrameReader`] reassembles units from arbitrarily chunked reads and keeps
//! whatever arrived past a delimiter as carry for the next call.
//! [`FrameWriter`] drains a unit completely, treating short writes as
//! continuation points. Both run on tokio streams and bound each whole frame,
//! not each read, by the configured deadline.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, find_delimiter, FrameConfig, DEFAULT_MAX_MESSAGE, DELIMITER,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
