//! Short code generation.
//!
//! Codes are drawn from the 64-symbol URL-safe alphabet (`A-Z a-z 0-9 _ -`), so each
//! character carries six bits of OS entropy and no modulo bias is introduced.

use crate::error::AppError;
use serde_json::json;

/// Number of characters in a generated short code.
pub const CODE_LENGTH: usize = 6;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generates a random 6-character short code.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code()?;
/// assert_eq!(code.len(), 6);
/// ```
pub fn generate_code() -> Result<String, AppError> {
    let mut buffer = [0u8; CODE_LENGTH];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(buffer
        .iter()
        .map(|b| ALPHABET[(b & 0x3f) as usize] as char)
        .collect())
}

/// Returns true if `code` only contains characters the generator can emit.
pub fn is_code_charset(code: &str) -> bool {
    code.bytes().all(|b| ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_correct_length() {
        let code = generate_code().unwrap();
        assert_eq!(code.len(), CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_url_safe_characters() {
        for _ in 0..100 {
            let code = generate_code().unwrap();
            assert!(is_code_charset(&code), "unexpected character in {code}");
        }
    }

    #[test]
    fn test_generate_code_produces_distinct_codes() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_code().unwrap()).collect();

        // 64^6 possible codes; a handful of birthday collisions would still be fine.
        assert!(codes.len() > 990);
    }

    #[test]
    fn test_is_code_charset() {
        assert!(is_code_charset("abc_-9"));
        assert!(!is_code_charset("abc.ico"));
        assert!(!is_code_charset("a b"));
    }
}
