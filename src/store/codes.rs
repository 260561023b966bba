//! Join code generation.

use super::Registry;
use crate::error::{EngineError, EngineResult};
use rand::Rng;

/// 24-letter alphabet for join codes; I and O are excluded because they read
/// as 1 and 0 on a phone screen.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const CODE_LENGTH: usize = 4;

/// Collision retries before giving up. The code space holds 24^4 ≈ 330k
/// codes, so hitting this cap means something is badly wrong.
const MAX_CODE_ATTEMPTS: usize = 1000;

fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

impl Registry {
    /// Draw codes until one is free of collisions with live sessions.
    /// Callers must hold the registry write lock and insert the returned code
    /// before releasing it.
    pub(super) fn free_code(&self) -> EngineResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = random_code();
            if !self.codes.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(EngineError::Internal(
            "join code space exhausted".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_four_letters_from_the_safe_alphabet() {
        for _ in 0..100 {
            let code = random_code();
            assert_eq!(code.len(), 4);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
            assert!(!code.contains('I'));
            assert!(!code.contains('O'));
        }
    }

    #[test]
    fn test_free_code_skips_taken_codes() {
        // Not a collision test (the space is huge); just the happy path.
        let registry = Registry::default();
        let code = registry.free_code().unwrap();
        assert_eq!(code.len(), 4);
    }
}
