/// Errors raised while validating text or applying the transform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    /// A byte outside `A`-`Z` and space was found.
    #[error("invalid symbol 0x{byte:02x} at offset {offset}")]
    InvalidSymbol { byte: u8, offset: usize },

    /// The key holds fewer symbols than the message.
    #[error("key too short ({key} symbols, message has {message})")]
    KeyTooShort { key: usize, message: usize },

    /// The text exceeds the configured maximum length.
    #[error("text too long ({len} symbols, max {max})")]
    TooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, CipherError>;
