//! Token-based session persistence for the scouting application
//!
//! - [`credentials`]: fixed username to password-hash mapping checked at login
//! - [`token`]: mints and validates the carried authentication token
//! - [`session`]: rebuilds per-browsing-session state from a carried token
//! - [`carrier`]: the `auth` key the token travels under
//!
//! ```rust
//! use std::{collections::HashMap, sync::Arc};
//! use auth::{
//!     carrier::{Carrier, CarrierUpdate},
//!     credentials::{CredentialStore, LoginCredentials},
//!     session::{SessionReconstructor, SessionState},
//!     token::TokenCodec,
//! };
//!
//! let credentials = Arc::new(CredentialStore::demo().unwrap());
//! let reconstructor = SessionReconstructor::new(TokenCodec::unkeyed(credentials));
//! let mut query: HashMap<String, String> = HashMap::new();
//!
//! let mut session = reconstructor.reconstruct(query.carried_token(), SessionState::new());
//! let login = LoginCredentials { username: "admin".into(), password: "admin123".into() };
//! let token = reconstructor.login(&mut session, &login).unwrap();
//! query.apply(CarrierUpdate::Set(token));
//!
//! // A reload starts from an empty session and only has the carried token.
//! let reloaded = reconstructor.reconstruct(query.carried_token(), SessionState::new());
//! assert_eq!(reloaded.username(), Some("admin"));
//! ```

pub mod carrier;
pub mod config;
pub mod credentials;
pub mod session;
pub mod token;
pub mod validation;
