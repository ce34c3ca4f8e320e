//! Alphabet validation and the one-time-pad transform.
//!
//! Text is restricted to the 27 symbols `A`-`Z` and space. [`Text`] is the
//! validated form: anything holding one has already been checked, so the
//! transform never sees a foreign byte.
//!
//! This is a teaching cipher. It offers no security beyond what a correctly
//! used one-time pad gives, and nothing here protects key material.

pub mod alphabet;
pub mod error;
pub mod keygen;
pub mod transform;

pub use alphabet::{Text, ALPHABET, ALPHABET_LEN};
pub use error::{CipherError, Result};
pub use keygen::{generate_key, generate_key_with};
pub use transform::{check_key, decode, encode, Direction};
