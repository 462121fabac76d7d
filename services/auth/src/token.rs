//! Authentication token codec
//!
//! A token binds a username to the time it was issued. On the wire it is
//! the URL-safe base64 encoding (no padding) of
//!
//! ```text
//! {username}:{issued_at}:{integrity_tag}
//! ```
//!
//! where `issued_at` is seconds since the Unix epoch and `integrity_tag`
//! is the lowercase hex digest of `username || issued_at`.
//!
//! With [`IntegrityMode::Unkeyed`] the digest is a plain SHA-256 over
//! public values: anyone who knows a valid username can mint a token that
//! [`TokenCodec::validate`] accepts. This is demo-grade authentication.
//! [`IntegrityMode::Keyed`] replaces the digest with HMAC-SHA256 under a
//! server-side secret.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::credentials::CredentialStore;

type HmacSha256 = Hmac<Sha256>;

/// Field delimiter inside the decoded token
pub const TOKEN_DELIMITER: char = ':';

/// Default maximum token age: 24 hours
pub const DEFAULT_MAX_AGE_SECS: u64 = 86_400;

/// Reasons a token is rejected
///
/// Callers treat every variant the same way: the token is invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not valid base64 text")]
    Decode,

    #[error("token does not have the expected fields")]
    Malformed,

    #[error("token names an unknown user")]
    UnknownUser,

    #[error("token expired")]
    Expired,

    #[error("token integrity tag mismatch")]
    TagMismatch,

    #[error("token secret cannot be used as a MAC key")]
    InvalidSecret,
}

/// How the integrity tag is computed
#[derive(Clone)]
pub enum IntegrityMode {
    /// SHA-256 of public values; forgeable by anyone who knows a username
    Unkeyed,
    /// HMAC-SHA256 keyed with a server secret
    Keyed(Arc<[u8]>),
}

impl std::fmt::Debug for IntegrityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityMode::Unkeyed => f.write_str("Unkeyed"),
            IntegrityMode::Keyed(_) => f.write_str("Keyed(..)"),
        }
    }
}

/// Decoded token fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub username: String,
    pub issued_at: u64,
    pub integrity_tag: String,
}

impl AuthToken {
    /// Opaque string safe for URL carriage
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}{TOKEN_DELIMITER}{}{TOKEN_DELIMITER}{}",
            self.username, self.issued_at, self.integrity_tag
        );
        URL_SAFE_NO_PAD.encode(raw)
    }

    /// Reverse [`AuthToken::encode`] without checking the tag or age
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| TokenError::Decode)?;
        let raw = String::from_utf8(bytes).map_err(|_| TokenError::Decode)?;

        let parts: Vec<&str> = raw.split(TOKEN_DELIMITER).collect();
        let [username, issued_at, integrity_tag] = parts.as_slice() else {
            return Err(TokenError::Malformed);
        };

        if username.is_empty()
            || integrity_tag.is_empty()
            || issued_at.is_empty()
            || !issued_at.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(TokenError::Malformed);
        }
        let issued_at = issued_at.parse().map_err(|_| TokenError::Malformed)?;

        Ok(Self {
            username: username.to_string(),
            issued_at,
            integrity_tag: integrity_tag.to_string(),
        })
    }
}

/// Mints and validates tokens for accounts of a [`CredentialStore`]
#[derive(Debug, Clone)]
pub struct TokenCodec {
    credentials: Arc<CredentialStore>,
    integrity: IntegrityMode,
    max_age_secs: u64,
}

impl TokenCodec {
    pub fn new(credentials: Arc<CredentialStore>, integrity: IntegrityMode, max_age_secs: u64) -> Self {
        Self {
            credentials,
            integrity,
            max_age_secs,
        }
    }

    /// Codec with the legacy unkeyed tag and a 24 hour lifetime
    pub fn unkeyed(credentials: Arc<CredentialStore>) -> Self {
        Self::new(credentials, IntegrityMode::Unkeyed, DEFAULT_MAX_AGE_SECS)
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    /// Mint a token for `username` issued now
    pub fn mint(&self, username: &str) -> Result<String, TokenError> {
        self.mint_at(username, current_epoch_secs())
    }

    /// Mint a token for `username` issued at `issued_at`
    pub fn mint_at(&self, username: &str, issued_at: u64) -> Result<String, TokenError> {
        if !self.credentials.contains(username) {
            return Err(TokenError::UnknownUser);
        }

        let token = AuthToken {
            username: username.to_string(),
            issued_at,
            integrity_tag: self.integrity_tag(username, issued_at)?,
        };
        Ok(token.encode())
    }

    /// Validate `token` against the current time and return its username
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        self.validate_at(token, current_epoch_secs())
    }

    /// Validate `token` as if the current time were `now`
    pub fn validate_at(&self, token: &str, now: u64) -> Result<String, TokenError> {
        let result = self.check(token, now);
        if let Err(e) = &result {
            debug!("Rejected auth token: {}", e);
        }
        result
    }

    fn check(&self, token: &str, now: u64) -> Result<String, TokenError> {
        let decoded = AuthToken::decode(token)?;

        if !self.credentials.contains(&decoded.username) {
            return Err(TokenError::UnknownUser);
        }

        if now.saturating_sub(decoded.issued_at) > self.max_age_secs {
            return Err(TokenError::Expired);
        }

        let expected = self.integrity_tag(&decoded.username, decoded.issued_at)?;
        if !constant_time_eq(expected.as_bytes(), decoded.integrity_tag.as_bytes()) {
            return Err(TokenError::TagMismatch);
        }

        Ok(decoded.username)
    }

    fn integrity_tag(&self, username: &str, issued_at: u64) -> Result<String, TokenError> {
        match &self.integrity {
            IntegrityMode::Unkeyed => Ok(unkeyed_tag(username, issued_at)),
            IntegrityMode::Keyed(secret) => {
                let mut mac =
                    HmacSha256::new_from_slice(secret).map_err(|_| TokenError::InvalidSecret)?;
                mac.update(username.as_bytes());
                mac.update(issued_at.to_string().as_bytes());
                Ok(hex::encode(mac.finalize().into_bytes()))
            }
        }
    }
}

/// SHA-256 of `username || issued_at` as lowercase hex
pub fn unkeyed_tag(username: &str, issued_at: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(issued_at.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Current time in seconds since the Unix epoch
pub fn current_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::DEMO_ACCOUNTS;

    const NOW: u64 = 1_760_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::unkeyed(Arc::new(CredentialStore::demo().unwrap()))
    }

    fn keyed_codec(secret: &str) -> TokenCodec {
        TokenCodec::new(
            Arc::new(CredentialStore::demo().unwrap()),
            IntegrityMode::Keyed(Arc::from(secret.as_bytes())),
            DEFAULT_MAX_AGE_SECS,
        )
    }

    #[test]
    fn test_mint_then_validate_returns_username() {
        let codec = codec();

        for (username, _) in DEMO_ACCOUNTS {
            let token = codec.mint(username).unwrap();
            assert_eq!(codec.validate(&token).unwrap(), username);
        }
    }

    #[test]
    fn test_token_is_url_safe_and_decodable() {
        let token = codec().mint_at("admin", NOW).unwrap();

        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "token {token} is not URL safe"
        );

        let decoded = AuthToken::decode(&token).unwrap();
        assert_eq!(decoded.username, "admin");
        assert_eq!(decoded.issued_at, NOW);
        assert_eq!(decoded.integrity_tag, unkeyed_tag("admin", NOW));
        assert_eq!(decoded.integrity_tag.len(), 64);
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = codec();

        let at_limit = codec.mint_at("scout", NOW - 86_400).unwrap();
        assert_eq!(codec.validate_at(&at_limit, NOW).unwrap(), "scout");

        let past_limit = codec.mint_at("scout", NOW - 86_401).unwrap();
        assert_eq!(codec.validate_at(&past_limit, NOW), Err(TokenError::Expired));
    }

    #[test]
    fn test_single_character_tampering_is_detected() {
        let codec = codec();
        let token = codec.mint_at("manager", NOW).unwrap();
        let alphabet = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

        for (i, original) in token.char_indices() {
            for replacement in alphabet.chars().filter(|c| *c != original) {
                let mut tampered = token.clone();
                tampered.replace_range(i..i + 1, &replacement.to_string());
                assert!(
                    codec.validate_at(&tampered, NOW).is_err(),
                    "tampered token accepted at position {i} with {replacement}"
                );
            }
        }
    }

    #[test]
    fn test_unkeyed_tokens_can_be_forged_from_a_username() {
        // Pins the known weakness of the unkeyed tag: no secret is needed.
        let codec = codec();
        let issued_at = current_epoch_secs();

        let raw = format!("admin:{}:{}", issued_at, {
            let mut hasher = Sha256::new();
            hasher.update(format!("admin{issued_at}").as_bytes());
            hex::encode(hasher.finalize())
        });
        let forged = URL_SAFE_NO_PAD.encode(raw);

        assert_eq!(codec.validate(&forged).unwrap(), "admin");
    }

    #[test]
    fn test_keyed_tokens_resist_forgery() {
        let codec = keyed_codec("server-secret");
        let forged = AuthToken {
            username: "admin".to_string(),
            issued_at: NOW,
            integrity_tag: unkeyed_tag("admin", NOW),
        }
        .encode();
        assert_eq!(codec.validate_at(&forged, NOW), Err(TokenError::TagMismatch));

        let token = codec.mint_at("admin", NOW).unwrap();
        assert_eq!(codec.validate_at(&token, NOW).unwrap(), "admin");

        let other_key = keyed_codec("another-secret");
        assert_eq!(
            other_key.validate_at(&token, NOW),
            Err(TokenError::TagMismatch)
        );
    }

    #[test]
    fn test_rejects_unknown_users() {
        let codec = codec();
        assert_eq!(codec.mint("mallory"), Err(TokenError::UnknownUser));

        let token = AuthToken {
            username: "mallory".to_string(),
            issued_at: NOW,
            integrity_tag: unkeyed_tag("mallory", NOW),
        }
        .encode();
        assert_eq!(codec.validate_at(&token, NOW), Err(TokenError::UnknownUser));
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        let codec = codec();
        let encode = |raw: &str| URL_SAFE_NO_PAD.encode(raw);

        assert_eq!(codec.validate_at("", NOW), Err(TokenError::Malformed));
        assert_eq!(codec.validate_at("%%%", NOW), Err(TokenError::Decode));
        assert_eq!(
            codec.validate_at(&URL_SAFE_NO_PAD.encode([0xff, 0xfe]), NOW),
            Err(TokenError::Decode)
        );

        let tag = unkeyed_tag("admin", NOW);
        for raw in [
            format!("admin:{NOW}"),
            format!("admin:{NOW}:{tag}:extra"),
            format!("admin:+{NOW}:{tag}"),
            format!("admin:{NOW}:"),
            format!(":{NOW}:{tag}"),
            format!("admin::{tag}"),
        ] {
            assert_eq!(
                codec.validate_at(&encode(&raw), NOW),
                Err(TokenError::Malformed),
                "{raw} should be malformed"
            );
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        let codec = keyed_codec("server-secret");
        let rendered = format!("{:?}", codec);
        assert!(rendered.contains("Keyed(..)"));
        assert!(!rendered.contains("server-secret"));
    }
}
