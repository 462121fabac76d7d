//! Authentication configuration

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    credentials::CredentialStore,
    session::SessionReconstructor,
    token::{DEFAULT_MAX_AGE_SECS, IntegrityMode, TokenCodec},
};

/// Token and session settings
#[derive(Clone)]
pub struct AuthConfig {
    /// Maximum token age in seconds (default: 24 hours)
    pub token_max_age_secs: u64,
    /// Secret for the keyed integrity tag; `None` keeps the unkeyed tag
    pub token_secret: Option<String>,
    /// Idle time after which a browsing session is dropped (default: 1 hour)
    pub session_idle_timeout_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_max_age_secs", &self.token_max_age_secs)
            .field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
            .field("session_idle_timeout_secs", &self.session_idle_timeout_secs)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_max_age_secs: DEFAULT_MAX_AGE_SECS,
            token_secret: None,
            session_idle_timeout_secs: 3600,
        }
    }
}

impl AuthConfig {
    /// Create a new AuthConfig from environment variables
    ///
    /// # Environment Variables
    /// - `TOKEN_MAX_AGE_SECS`: Token lifetime in seconds (default: 86400)
    /// - `TOKEN_SECRET`: Enables the HMAC-SHA256 integrity tag when set and non-empty
    /// - `SESSION_IDLE_TIMEOUT_SECS`: Session idle timeout in seconds (default: 3600)
    pub fn from_env() -> Result<Self> {
        let token_max_age_secs = std::env::var("TOKEN_MAX_AGE_SECS")
            .unwrap_or_else(|_| DEFAULT_MAX_AGE_SECS.to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid TOKEN_MAX_AGE_SECS: {}", e))?;

        let token_secret = std::env::var("TOKEN_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty());

        let session_idle_timeout_secs = std::env::var("SESSION_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid SESSION_IDLE_TIMEOUT_SECS: {}", e))?;

        Ok(AuthConfig {
            token_max_age_secs,
            token_secret,
            session_idle_timeout_secs,
        })
    }

    /// Integrity mode selected by `token_secret`
    pub fn integrity_mode(&self) -> IntegrityMode {
        match &self.token_secret {
            Some(secret) => IntegrityMode::Keyed(Arc::from(secret.as_bytes())),
            None => IntegrityMode::Unkeyed,
        }
    }

    /// Wire the token codec and session reconstructor for `credentials`
    pub fn build_reconstructor(&self, credentials: Arc<CredentialStore>) -> SessionReconstructor {
        let integrity = self.integrity_mode();
        match integrity {
            IntegrityMode::Unkeyed => {
                warn!("TOKEN_SECRET not set: auth tokens use an unkeyed tag and can be forged")
            }
            IntegrityMode::Keyed(_) => info!("Auth tokens use a keyed integrity tag"),
        }

        let codec = TokenCodec::new(credentials, integrity, self.token_max_age_secs);
        SessionReconstructor::new(codec)
    }
}
