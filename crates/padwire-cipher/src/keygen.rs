use rand::Rng;

use crate::alphabet::{symbol, Text, ALPHABET_LEN};

/// Generate `len` key symbols sampled uniformly from the alphabet.
pub fn generate_key(len: usize) -> Text {
    generate_key_with(&mut rand::thread_rng(), len)
}

/// Generate `len` key symbols from a caller-supplied RNG.
pub fn generate_key_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Text {
    let symbols = (0..len)
        .map(|_| symbol(rng.gen_range(0..ALPHABET_LEN)))
        .collect();
    Text::from_valid(symbols)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::alphabet::{validate, ALPHABET};

    #[test]
    fn generates_requested_length() {
        assert_eq!(generate_key(0).len(), 0);
        assert_eq!(generate_key(1024).len(), 1024);
    }

    #[test]
    fn output_is_alphabet_valid() {
        let key = generate_key(4096);
        assert!(validate(key.as_bytes()).is_ok());
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = generate_key_with(&mut StdRng::seed_from_u64(7), 64);
        let b = generate_key_with(&mut StdRng::seed_from_u64(7), 64);
        assert_eq!(a, b);
    }

    #[test]
    fn every_symbol_appears() {
        let key = generate_key_with(&mut StdRng::seed_from_u64(42), 27 * 200);
        for sym in ALPHABET.iter() {
            assert!(key.as_bytes().contains(sym), "missing {:?}", *sym as char);
        }
    }
}
