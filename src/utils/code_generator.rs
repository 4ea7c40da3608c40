//! Short code generation and validation.
//!
//! Codes are drawn from the OS CSPRNG and mapped onto a 62-symbol alphabet
//! (digits, lowercase, uppercase) with a plain modulo. The resulting bias
//! toward the first eight symbols is small and does not matter at the code
//! lengths in use.

/// Alphabet short codes are drawn from.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Longest code the schema accepts.
pub const MAX_CODE_LENGTH: usize = 10;

/// Generates a random short code of `length` characters.
///
/// # Errors
///
/// Returns an error if the system random number generator fails.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(10)?;
/// assert_eq!(code.len(), 10);
/// assert!(is_valid_code(&code));
/// ```
pub fn generate_code(length: usize) -> Result<String, getrandom::Error> {
    let mut buffer = vec![0u8; length];
    getrandom::fill(&mut buffer)?;

    Ok(buffer
        .into_iter()
        .map(|b| ALPHABET[b as usize % ALPHABET.len()] as char)
        .collect())
}

/// Returns true if `code` could have been allocated: 1 to 10 alphanumeric
/// ASCII characters.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LENGTH
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_requested_length() {
        for length in [1, 6, MAX_CODE_LENGTH] {
            assert_eq!(generate_code(length).unwrap().len(), length);
        }
    }

    #[test]
    fn test_generate_code_uses_alphabet_only() {
        for _ in 0..100 {
            let code = generate_code(MAX_CODE_LENGTH).unwrap();
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)), "bad code {code}");
        }
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let codes: HashSet<String> = (0..1000)
            .map(|_| generate_code(MAX_CODE_LENGTH).unwrap())
            .collect();

        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_alphabet_has_no_duplicates() {
        let unique: HashSet<&u8> = ALPHABET.iter().collect();
        assert_eq!(unique.len(), 62);
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("a"));
        assert!(is_valid_code("aB3dE5gH9k"));
        assert!(is_valid_code("0123456789"));
    }

    #[test]
    fn test_is_valid_code_rejects_bad_input() {
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("aB3dE5gH9kX"));
        assert!(!is_valid_code("abc-def"));
        assert!(!is_valid_code("abc_def"));
        assert!(!is_valid_code("héllo"));
        assert!(!is_valid_code("favicon.ico"));
    }
}
