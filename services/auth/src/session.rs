//! Session reconstruction
//!
//! The hosting layer keeps one [`SessionState`] per browsing session and
//! runs [`SessionReconstructor::reconstruct`] on every request. A fresh
//! session (e.g. after a page reload) becomes authenticated again when it
//! arrives with a valid carried token.
//!
//! `authenticated` can only become `true` through a password check in
//! [`SessionReconstructor::login`] or a token that passed
//! [`TokenCodec::validate`] in [`SessionReconstructor::reconstruct`].

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    carrier::CarrierUpdate,
    credentials::LoginCredentials,
    token::{TokenCodec, TokenError, current_epoch_secs},
};

/// Errors returned by [`SessionReconstructor::login`]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoginError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("failed to mint token: {0}")]
    Token(#[from] TokenError),
}

/// Transient state of one browsing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    session_id: Uuid,
    authenticated: bool,
    username: Option<String>,
    active_tab: Option<usize>,
    selected_record_index: Option<usize>,
}

impl SessionState {
    /// Unauthenticated session with a fresh identifier
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Unauthenticated session with a known identifier
    pub fn with_id(session_id: Uuid) -> Self {
        Self {
            session_id,
            authenticated: false,
            username: None,
            active_tab: None,
            selected_record_index: None,
        }
    }

    /// Identifier used to correlate log lines, not a credential
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn active_tab(&self) -> Option<usize> {
        self.active_tab
    }

    pub fn selected_record_index(&self) -> Option<usize> {
        self.selected_record_index
    }

    pub fn set_active_tab(&mut self, tab: usize) {
        self.active_tab = Some(tab);
    }

    pub fn select_record(&mut self, index: usize) {
        self.selected_record_index = Some(index);
    }

    fn authenticate(&mut self, username: String) {
        self.authenticated = true;
        self.username = Some(username);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of a successful password check
///
/// Only [`SessionReconstructor::authorize`] creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    username: String,
    token: String,
}

impl LoginGrant {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Token minted for the login
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Restores, establishes and ends authenticated sessions
#[derive(Debug, Clone)]
pub struct SessionReconstructor {
    codec: TokenCodec,
}

impl SessionReconstructor {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Bring `session` up to date with the carried token
    pub fn reconstruct(&self, carried_token: Option<&str>, session: SessionState) -> SessionState {
        self.reconstruct_at(carried_token, session, current_epoch_secs())
    }

    /// [`SessionReconstructor::reconstruct`] as if the current time were `now`
    pub fn reconstruct_at(
        &self,
        carried_token: Option<&str>,
        mut session: SessionState,
        now: u64,
    ) -> SessionState {
        if !session.authenticated {
            if let Some(token) = carried_token {
                if let Ok(username) = self.codec.validate_at(token, now) {
                    info!(
                        "Restored session {} for user: {}",
                        session.session_id, username
                    );
                    session.authenticate(username);
                }
            }
        }

        session.active_tab.get_or_insert(0);
        session.selected_record_index.get_or_insert(0);

        session
    }

    /// Check the password and authenticate `session`
    ///
    /// Returns the token the caller should place in the carrier. A failed
    /// check leaves `session` untouched.
    pub fn login(
        &self,
        session: &mut SessionState,
        credentials: &LoginCredentials,
    ) -> Result<String, LoginError> {
        let grant = self.authorize(credentials)?;
        Ok(self.admit(session, grant))
    }

    /// Check the password without touching any session
    ///
    /// The returned grant is redeemed with [`SessionReconstructor::admit`],
    /// so the hash check can run before the session is locked.
    pub fn authorize(&self, credentials: &LoginCredentials) -> Result<LoginGrant, LoginError> {
        if !self
            .codec
            .credentials()
            .verify(&credentials.username, &credentials.password)
        {
            warn!("Failed login attempt for user: {}", credentials.username);
            return Err(LoginError::InvalidCredentials);
        }

        let token = self.codec.mint(&credentials.username)?;
        Ok(LoginGrant {
            username: credentials.username.clone(),
            token,
        })
    }

    /// Authenticate `session` with a grant from a successful password check
    ///
    /// Returns the token to place in the carrier.
    pub fn admit(&self, session: &mut SessionState, grant: LoginGrant) -> String {
        info!(
            "User {} logged in (session {})",
            grant.username, session.session_id
        );
        session.authenticate(grant.username);
        grant.token
    }

    /// End the authenticated part of `session`
    ///
    /// The session identifier and active tab survive. The token value
    /// itself stays valid until it expires; only the carried copy is
    /// dropped.
    pub fn logout(&self, session: &mut SessionState) -> CarrierUpdate {
        if let Some(username) = session.username.take() {
            info!("User {} logged out (session {})", username, session.session_id);
        }
        session.authenticated = false;
        session.selected_record_index = Some(0);

        CarrierUpdate::Remove
    }

    /// Fresh token for an authenticated session
    ///
    /// Re-minting on every load moves `issued_at` forward, so an open
    /// session never reaches the token's nominal expiry.
    pub fn keep_alive(&self, session: &SessionState) -> CarrierUpdate {
        let Some(username) = session.username.as_deref().filter(|_| session.authenticated) else {
            return CarrierUpdate::Unchanged;
        };

        match self.codec.mint(username) {
            Ok(token) => CarrierUpdate::Set(token),
            Err(e) => {
                warn!("Keep-alive mint failed for user {}: {}", username, e);
                CarrierUpdate::Unchanged
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        carrier::{AUTH_PARAM, Carrier},
        credentials::CredentialStore,
        token::AuthToken,
    };
    use std::collections::HashMap;
    use std::sync::Arc;

    fn reconstructor() -> SessionReconstructor {
        let credentials = Arc::new(CredentialStore::demo().unwrap());
        SessionReconstructor::new(TokenCodec::unkeyed(credentials))
    }

    fn credentials(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_reload_with_carried_token_restores_login() {
        let reconstructor = reconstructor();
        let mut carrier: HashMap<String, String> = HashMap::new();

        let mut session = reconstructor.reconstruct(carrier.carried_token(), SessionState::new());
        assert!(!session.is_authenticated());

        let token = reconstructor
            .login(&mut session, &credentials("admin", "admin123"))
            .unwrap();
        carrier.apply(CarrierUpdate::Set(token));

        // Reload: the browsing session starts from scratch.
        let reloaded = reconstructor.reconstruct(carrier.carried_token(), SessionState::new());
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.username(), Some("admin"));
        assert_eq!(reloaded.active_tab(), Some(0));
        assert_eq!(reloaded.selected_record_index(), Some(0));
    }

    #[test]
    fn test_logout_removes_carried_token() {
        let reconstructor = reconstructor();
        let mut carrier: HashMap<String, String> = HashMap::new();

        let mut session = reconstructor.reconstruct(None, SessionState::new());
        let token = reconstructor
            .login(&mut session, &credentials("scout", "scout123"))
            .unwrap();
        carrier.apply(CarrierUpdate::Set(token));
        session.select_record(3);
        session.set_active_tab(2);

        let session_id = session.session_id();
        let update = reconstructor.logout(&mut session);
        assert_eq!(update, CarrierUpdate::Remove);
        carrier.apply(update);
        assert!(!carrier.contains_key(AUTH_PARAM));

        assert!(!session.is_authenticated());
        assert_eq!(session.username(), None);
        assert_eq!(session.session_id(), session_id);
        assert_eq!(session.selected_record_index(), Some(0));
        assert_eq!(session.active_tab(), Some(2));

        let session = reconstructor.reconstruct(carrier.carried_token(), session);
        assert!(!session.is_authenticated());

        let reloaded = reconstructor.reconstruct(carrier.carried_token(), SessionState::new());
        assert!(!reloaded.is_authenticated());
    }

    #[test]
    fn test_reconstruct_is_idempotent_for_authenticated_sessions() {
        let reconstructor = reconstructor();
        let mut session = reconstructor.reconstruct(None, SessionState::new());
        let token = reconstructor
            .login(&mut session, &credentials("manager", "manager123"))
            .unwrap();
        session.set_active_tab(3);
        session.select_record(1);

        let first = reconstructor.reconstruct(Some(token.as_str()), session);
        let second = reconstructor.reconstruct(Some(token.as_str()), first.clone());
        assert_eq!(first, second);
        assert_eq!(second.active_tab(), Some(3));
        assert_eq!(second.selected_record_index(), Some(1));
    }

    #[test]
    fn test_authenticated_session_wins_over_carried_token() {
        let reconstructor = reconstructor();
        let mut session = SessionState::new();
        reconstructor
            .login(&mut session, &credentials("admin", "admin123"))
            .unwrap();

        let scout_token = reconstructor.codec().mint("scout").unwrap();
        let session = reconstructor.reconstruct(Some(scout_token.as_str()), session);
        assert_eq!(session.username(), Some("admin"));

        let session = reconstructor.reconstruct(Some("garbage"), session);
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_invalid_tokens_leave_session_unauthenticated() {
        let reconstructor = reconstructor();
        let now = current_epoch_secs();
        let expired = reconstructor.codec().mint_at("admin", now - 86_401).unwrap();

        for token in ["", "not-a-token", expired.as_str()] {
            let session = reconstructor.reconstruct(Some(token), SessionState::new());
            assert!(!session.is_authenticated(), "{token:?} authenticated a session");
            assert_eq!(session.username(), None);
        }
    }

    #[test]
    fn test_failed_login_changes_nothing() {
        let reconstructor = reconstructor();
        let before = reconstructor.reconstruct(None, SessionState::new());
        let mut session = before.clone();

        let result = reconstructor.login(&mut session, &credentials("admin", "admin124"));
        assert_eq!(result, Err(LoginError::InvalidCredentials));
        assert_eq!(session, before);

        let result = reconstructor.login(&mut session, &credentials("ghost", "admin123"));
        assert_eq!(result, Err(LoginError::InvalidCredentials));
        assert_eq!(session, before);
    }

    #[test]
    fn test_grant_is_redeemed_on_a_later_session_state() {
        let reconstructor = reconstructor();
        let mut session = reconstructor.reconstruct(None, SessionState::new());
        session.set_active_tab(2);

        assert_eq!(
            reconstructor.authorize(&credentials("scout", "wrong")),
            Err(LoginError::InvalidCredentials)
        );

        let grant = reconstructor
            .authorize(&credentials("scout", "scout123"))
            .unwrap();
        assert_eq!(grant.username(), "scout");
        assert!(!session.is_authenticated());

        let token = reconstructor.admit(&mut session, grant.clone());
        assert_eq!(token, grant.token());
        assert!(session.is_authenticated());
        assert_eq!(session.username(), Some("scout"));
        assert_eq!(session.active_tab(), Some(2));
        assert_eq!(reconstructor.codec().validate(&token).unwrap(), "scout");
    }

    #[test]
    fn test_defaults_are_set_once() {
        let reconstructor = reconstructor();
        let mut session = SessionState::new();
        assert_eq!(session.active_tab(), None);

        session.set_active_tab(1);
        let session = reconstructor.reconstruct(None, session);
        assert_eq!(session.active_tab(), Some(1));
        assert_eq!(session.selected_record_index(), Some(0));
    }

    #[test]
    fn test_keep_alive_moves_issued_at_forward() {
        let reconstructor = reconstructor();
        let now = current_epoch_secs();
        let old = reconstructor.codec().mint_at("admin", now - 86_000).unwrap();

        let session = reconstructor.reconstruct(Some(old.as_str()), SessionState::new());
        assert!(session.is_authenticated());

        let CarrierUpdate::Set(fresh) = reconstructor.keep_alive(&session) else {
            panic!("authenticated session should get a fresh token");
        };
        let fresh_issued = AuthToken::decode(&fresh).unwrap().issued_at;
        assert!(fresh_issued >= now);

        // Past the old token's expiry, the re-minted one still restores the session.
        let later = now + 1_000;
        assert!(reconstructor.codec().validate_at(&old, later).is_err());
        let restored = reconstructor.reconstruct_at(Some(fresh.as_str()), SessionState::new(), later);
        assert!(restored.is_authenticated());

        assert_eq!(
            reconstructor.keep_alive(&SessionState::new()),
            CarrierUpdate::Unchanged
        );
    }
}
