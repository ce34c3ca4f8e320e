use serde::{Deserialize, Serialize};

use crate::alphabet::{ordinal, symbol, Text, ALPHABET_LEN};
use crate::error::{CipherError, Result};

/// Which way the pad is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Plaintext + key -> ciphertext.
    Encode,
    /// Ciphertext - key -> plaintext.
    Decode,
}

impl Direction {
    /// Apply the transform in this direction.
    pub fn apply(self, text: &Text, key: &Text) -> Result<Text> {
        match self {
            Direction::Encode => encode(text, key),
            Direction::Decode => decode(text, key),
        }
    }
}

/// Reject a key holding fewer symbols than the text it must cover.
pub fn check_key(text: &Text, key: &Text) -> Result<()> {
    if key.len() < text.len() {
        return Err(CipherError::KeyTooShort {
            key: key.len(),
            message: text.len(),
        });
    }
    Ok(())
}

/// `c[i] = (p[i] + k[i]) mod 27`. Key symbols past the plaintext are unused.
pub fn encode(plaintext: &Text, key: &Text) -> Result<Text> {
    check_key(plaintext, key)?;
    Ok(combine(plaintext, key, |p, k| p + k))
}

/// `p[i] = (c[i] - k[i] + 27) mod 27`. Key symbols past the ciphertext are unused.
pub fn decode(ciphertext: &Text, key: &Text) -> Result<Text> {
    check_key(ciphertext, key)?;
    Ok(combine(ciphertext, key, |c, k| c + ALPHABET_LEN - k))
}

fn combine(text: &Text, key: &Text, op: impl Fn(u8, u8) -> u8) -> Text {
    let out = text
        .as_bytes()
        .iter()
        .zip(key.as_bytes())
        .map(|(&t, &k)| symbol(op(ord(t), ord(k))))
        .collect();
    Text::from_valid(out)
}

#[inline]
fn ord(symbol: u8) -> u8 {
    // `Text` guarantees every byte is an alphabet symbol.
    ordinal(symbol).unwrap_or_default()
}
