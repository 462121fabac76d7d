//! Credential store
//!
//! A fixed set of accounts loaded once at process start. Passwords are
//! kept as salted Argon2id hashes; the plaintext is discarded after
//! construction.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::validation::{validate_password, validate_username};

/// Accounts available when no other credential source is configured
pub const DEMO_ACCOUNTS: [(&str, &str); 3] = [
    ("admin", "admin123"),
    ("scout", "scout123"),
    ("manager", "manager123"),
];

/// Argon2 memory cost in KiB for stored hashes
const HASH_MEMORY_KIB: u32 = 4096;
/// Argon2 passes for stored hashes
const HASH_ITERATIONS: u32 = 1;

/// Errors raised while building a credential store
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid username {username:?}: {reason}")]
    InvalidUsername { username: String, reason: String },

    #[error("Invalid password for {username:?}: {reason}")]
    InvalidPassword { username: String, reason: String },

    #[error("Duplicate username {0:?}")]
    DuplicateUsername(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

/// Username and password submitted by the login form
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Stored account
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub username: String,
    pub password_hash: String,
}

/// Read-only username to password-hash mapping
#[derive(Debug, Clone)]
pub struct CredentialStore {
    records: HashMap<String, CredentialRecord>,
}

impl CredentialStore {
    /// Build a store from plaintext pairs, hashing each password
    pub fn from_plaintext<'a, I>(accounts: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let params = Params::new(HASH_MEMORY_KIB, HASH_ITERATIONS, 1, None)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut records = HashMap::new();
        for (username, password) in accounts {
            validate_username(username).map_err(|reason| CredentialError::InvalidUsername {
                username: username.to_string(),
                reason,
            })?;
            validate_password(password).map_err(|reason| CredentialError::InvalidPassword {
                username: username.to_string(),
                reason,
            })?;

            if records.contains_key(username) {
                return Err(CredentialError::DuplicateUsername(username.to_string()));
            }

            let salt = SaltString::generate(&mut rand::thread_rng());
            let password_hash = argon2
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| CredentialError::Hashing(e.to_string()))?
                .to_string();

            records.insert(
                username.to_string(),
                CredentialRecord {
                    username: username.to_string(),
                    password_hash,
                },
            );
        }

        info!("Credential store loaded with {} accounts", records.len());
        Ok(Self { records })
    }

    /// Store holding [`DEMO_ACCOUNTS`]
    pub fn demo() -> Result<Self, CredentialError> {
        Self::from_plaintext(DEMO_ACCOUNTS)
    }

    /// Check a password against the stored hash for `username`
    ///
    /// Unknown usernames and wrong passwords both yield `false`.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Some(record) = self.records.get(username) else {
            debug!("Credential check for unknown user");
            return false;
        };

        let Ok(parsed_hash) = PasswordHash::new(&record.password_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Whether `username` has an account
    pub fn contains(&self, username: &str) -> bool {
        self.records.contains_key(username)
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every single-character variant of `password`: substitutions,
    /// deletions and an appended character
    fn single_char_mutations(password: &str) -> Vec<String> {
        let chars: Vec<char> = password.chars().collect();
        let mut variants = Vec::new();

        for i in 0..chars.len() {
            let mut substituted = chars.clone();
            substituted[i] = if chars[i] == 'x' { 'y' } else { 'x' };
            variants.push(substituted.into_iter().collect());

            let mut deleted = chars.clone();
            deleted.remove(i);
            variants.push(deleted.into_iter().collect());
        }
        variants.push(format!("{password}!"));

        variants
    }

    #[test]
    fn test_demo_accounts_verify() {
        let store = CredentialStore::demo().unwrap();
        assert_eq!(store.len(), 3);

        for (username, password) in DEMO_ACCOUNTS {
            assert!(store.verify(username, password), "{username} should verify");
        }
    }

    #[test]
    fn test_single_character_mutations_are_rejected() {
        let store = CredentialStore::demo().unwrap();

        for (username, password) in DEMO_ACCOUNTS {
            for variant in single_char_mutations(password) {
                assert!(
                    !store.verify(username, &variant),
                    "{username} accepted mutated password {variant:?}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_user_and_cross_account_passwords() {
        let store = CredentialStore::demo().unwrap();

        assert!(!store.verify("nobody", "admin123"));
        assert!(!store.verify("", ""));
        assert!(!store.verify("admin", "scout123"));
        assert!(!store.verify("ADMIN", "admin123"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let store = CredentialStore::from_plaintext([("alpha", "same"), ("beta", "same")]).unwrap();

        let alpha = &store.records["alpha"].password_hash;
        let beta = &store.records["beta"].password_hash;
        assert_ne!(alpha, beta);
        assert!(alpha.starts_with("$argon2id$"));
        assert!(!alpha.contains("same"));
    }

    #[test]
    fn test_rejects_duplicate_and_invalid_usernames() {
        let duplicate = CredentialStore::from_plaintext([("admin", "a"), ("admin", "b")]);
        assert!(matches!(
            duplicate,
            Err(CredentialError::DuplicateUsername(name)) if name == "admin"
        ));

        let delimiter = CredentialStore::from_plaintext([("ad:min", "secret")]);
        assert!(matches!(
            delimiter,
            Err(CredentialError::InvalidUsername { .. })
        ));

        let empty_password = CredentialStore::from_plaintext([("admin", "")]);
        assert!(matches!(
            empty_password,
            Err(CredentialError::InvalidPassword { .. })
        ));
    }
}
