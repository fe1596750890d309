// src/services/token.rs
// DOCUMENTATION: Bearer secrets (itinerary edit/share tokens, admin token)

use uuid::Uuid;

/// 128 random bits as 32 hex characters
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Compare a presented secret with the stored one in time that depends only
/// on the lengths, never on where the first differing byte is
pub fn matches(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    let mut diff = a.len() ^ b.len();
    for (i, y) in b.iter().enumerate() {
        let x = a.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens() {
        let a = generate();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, generate());
    }

    #[test]
    fn test_matches() {
        let secret = generate();
        assert!(matches(&secret, &secret.clone()));
        assert!(!matches("", &secret));
        assert!(!matches(&secret[..31], &secret));
        assert!(!matches(&format!("{}0", secret), &secret));

        let mut flipped = secret.clone().into_bytes();
        flipped[0] = if flipped[0] == b'a' { b'b' } else { b'a' };
        assert!(!matches(&String::from_utf8(flipped).unwrap(), &secret));
    }

    #[test]
    fn test_empty_secrets() {
        assert!(matches("", ""));
        assert!(!matches("x", ""));
    }
}
