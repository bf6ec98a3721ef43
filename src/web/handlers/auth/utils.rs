//! Small helpers for tokens, cookies, and username validation.

use anyhow::{Context, Result};
use axum::http::HeaderMap;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use sha2::{Digest, Sha256};

/// Username shape for local registration: printable, no whitespace, short
/// enough for the page. OAuth usernames (provider profile ids) are inserted
/// directly and never pass through this check.
pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9@._-]{1,64}$").is_ok_and(|regex| regex.is_match(username))
}

/// Create an opaque token for the session cookie or the OAuth state cookie.
/// The raw value only ever travels in the cookie; the store sees a hash.
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never touch the store.
pub fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Extract a cookie value by name from the request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn valid_username_accepts_reasonable_names() {
        assert!(valid_username("alice"));
        assert!(valid_username("alice@example.com"));
        assert!(valid_username("a_b-c.d"));
    }

    #[test]
    fn valid_username_rejects_junk() {
        assert!(!valid_username(""));
        assert!(!valid_username("has space"));
        assert!(!valid_username("line\nbreak"));
        assert!(!valid_username(&"x".repeat(65)));
    }

    #[test]
    fn generated_tokens_are_unique_and_url_safe() {
        let one = generate_token().unwrap();
        let two = generate_token().unwrap();
        assert_ne!(one, two);
        // 32 bytes, unpadded URL-safe base64
        assert_eq!(one.len(), 43);
        assert!(one
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn hash_token_is_stable_and_opaque() {
        let token = "some-token";
        assert_eq!(hash_token(token), hash_token(token));
        assert_ne!(hash_token(token), hash_token("other-token"));
        assert_eq!(hash_token(token).len(), 32);
    }

    #[test]
    fn cookie_value_parses_multiple_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("other=1; confide_session=abc ; last=z"),
        );
        assert_eq!(
            cookie_value(&headers, "confide_session").as_deref(),
            Some("abc")
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
