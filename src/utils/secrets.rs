//! Handling of credential material in logs and responses.
//!
//! API keys never appear verbatim outside the process environment: logs get
//! masked values, and the sources endpoint exposes only an HMAC fingerprint
//! that is stable per key but useless for recovery.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Query/body keys whose values must never be logged in full.
const SENSITIVE_KEYS: &[&str] = &["password", "api_key", "secret", "token", "key", "auth"];

/// Masks a sensitive string for logging, keeping `visible_chars` at each
/// end. Values too short to keep anything visible are fully masked.
pub fn mask_string(value: &str, visible_chars: usize) -> String {
    if value.chars().count() <= visible_chars * 2 {
        return "*".repeat(value.chars().count());
    }

    let chars: Vec<char> = value.chars().collect();
    let head: String = chars[..visible_chars].iter().collect();
    let tail: String = chars[chars.len() - visible_chars..].iter().collect();

    format!("{}{}{}", head, "*".repeat(chars.len() - visible_chars * 2), tail)
}

/// Returns true when a parameter name looks like it carries a credential.
pub fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|s| lower.contains(s))
}

/// Masks credential-looking values in query pairs before logging.
pub fn sanitize_query_pairs(pairs: &[(String, String)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| {
            if is_sensitive_key(k) {
                (k.clone(), mask_string(v, 4))
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

/// Computes a stable fingerprint of an API key: HMAC-SHA256 keyed by the
/// server secret, hex-encoded, truncated to 16 characters.
///
/// The fingerprint identifies which key is configured (e.g. across
/// deployments) without exposing the key itself.
pub fn fingerprint_api_key(api_key: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(api_key.as_bytes());

    let mut hex = hex::encode(mac.finalize().into_bytes());
    hex.truncate(16);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_ends() {
        assert_eq!(mask_string("fsq3abcdef123456", 4), "fsq3********3456");
    }

    #[test]
    fn test_mask_short_value_fully() {
        assert_eq!(mask_string("abcd1234", 4), "********");
        assert_eq!(mask_string("abc", 4), "***");
    }

    #[test]
    fn test_sensitive_key_detection() {
        assert!(is_sensitive_key("api_key"));
        assert!(is_sensitive_key("YELP_API_KEY"));
        assert!(is_sensitive_key("Authorization"));
        assert!(is_sensitive_key("client_secret"));
        assert!(!is_sensitive_key("location"));
        assert!(!is_sensitive_key("limit"));
    }

    #[test]
    fn test_sanitize_query_pairs() {
        let pairs = vec![
            ("location".to_string(), "New York".to_string()),
            ("api_key".to_string(), "super-secret-value".to_string()),
        ];

        let sanitized = sanitize_query_pairs(&pairs);

        assert_eq!(sanitized[0].1, "New York");
        assert_ne!(sanitized[1].1, "super-secret-value");
        assert!(sanitized[1].1.contains('*'));
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let fp1 = fingerprint_api_key("key-a", "secret");
        let fp2 = fingerprint_api_key("key-a", "secret");

        assert_eq!(fp1, fp2);
        assert_eq!(fp1.len(), 16);
    }

    #[test]
    fn test_fingerprint_depends_on_key_and_secret() {
        assert_ne!(
            fingerprint_api_key("key-a", "secret"),
            fingerprint_api_key("key-b", "secret")
        );
        assert_ne!(
            fingerprint_api_key("key-a", "secret-1"),
            fingerprint_api_key("key-a", "secret-2")
        );
    }
}
