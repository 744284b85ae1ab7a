//! Order reference codes.

use rand::Rng;

/// Length of a reference code.
pub const REFERENCE_CODE_LENGTH: usize = 20;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random reference code of lowercase letters and digits.
#[must_use]
pub fn generate_reference_code() -> String {
    let mut rng = rand::rng();
    (0..REFERENCE_CODE_LENGTH)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_code_shape() {
        let code = generate_reference_code();
        assert_eq!(code.len(), REFERENCE_CODE_LENGTH);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_reference_codes_differ() {
        assert_ne!(generate_reference_code(), generate_reference_code());
    }
}
