use std::fmt;

use bytes::Bytes;

use crate::error::{CipherError, Result};

/// The 27 symbols in ordinal order: `A`=0 ... `Z`=25, space=26.
pub const ALPHABET: &[u8; 27] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ ";

/// Number of symbols in [`ALPHABET`].
pub const ALPHABET_LEN: u8 = 27;

const SPACE_ORDINAL: u8 = 26;

/// Ordinal of an alphabet symbol, or `None` for any other byte.
#[inline]
pub fn ordinal(symbol: u8) -> Option<u8> {
    match symbol {
        b'A'..=b'Z' => Some(symbol - b'A'),
        b' ' => Some(SPACE_ORDINAL),
        _ => None,
    }
}

/// Symbol for an ordinal. Ordinals wrap modulo 27.
#[inline]
pub fn symbol(ordinal: u8) -> u8 {
    ALPHABET[usize::from(ordinal % ALPHABET_LEN)]
}

/// True if `byte` is one of the 27 alphabet symbols.
#[inline]
pub fn is_symbol(byte: u8) -> bool {
    ordinal(byte).is_some()
}

/// Check every byte of `bytes`, reporting the first offender.
pub fn validate(bytes: &[u8]) -> Result<()> {
    match bytes.iter().position(|&b| !is_symbol(b)) {
        Some(offset) => Err(CipherError::InvalidSymbol {
            byte: bytes[offset],
            offset,
        }),
        None => Ok(()),
    }
}

/// A run of validated alphabet symbols.
///
/// Used for plaintext, ciphertext and key material alike.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Text(Bytes);

impl Text {
    /// Validate `bytes` and wrap them.
    pub fn parse(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        validate(&bytes)?;
        Ok(Self(bytes))
    }

    /// Validate `bytes` against the alphabet and a length limit.
    pub fn parse_bounded(bytes: impl Into<Bytes>, max_len: usize) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() > max_len {
            return Err(CipherError::TooLong {
                len: bytes.len(),
                max: max_len,
            });
        }
        Self::parse(bytes)
    }

    /// Wrap symbols produced by the transform or the key generator.
    pub(crate) fn from_valid(bytes: Vec<u8>) -> Self {
        debug_assert!(validate(&bytes).is_ok());
        Self(Bytes::from(bytes))
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw symbol bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The symbols as a string slice.
    pub fn as_str(&self) -> &str {
        // Alphabet symbols are ASCII.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Consume and return the underlying bytes.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for Text {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Text may be key material; only its size is printed.
        write!(f, "Text(<{} symbols>)", self.len())
    }
}

impl std::str::FromStr for Text {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(Bytes::copy_from_slice(s.as_bytes()))
    }
}
