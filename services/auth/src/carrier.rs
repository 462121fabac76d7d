//! Carried token transport
//!
//! The token travels in the page's addressable state under the `auth`
//! key, so a reload can restore the session without a password.

use std::collections::HashMap;

/// Key of the carried token
pub const AUTH_PARAM: &str = "auth";

/// Change requested on the carrier after a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarrierUpdate {
    /// Store this token under [`AUTH_PARAM`]
    Set(String),
    /// Drop the carried token
    Remove,
    /// Leave the carrier as it is
    Unchanged,
}

/// Addressable state able to hold the token
pub trait Carrier {
    /// Token currently carried, if any
    fn carried_token(&self) -> Option<&str>;

    /// Apply `update`
    fn apply(&mut self, update: CarrierUpdate);
}

/// Query parameters of the page address
impl Carrier for HashMap<String, String> {
    fn carried_token(&self) -> Option<&str> {
        self.get(AUTH_PARAM)
            .map(String::as_str)
            .filter(|token| !token.is_empty())
    }

    fn apply(&mut self, update: CarrierUpdate) {
        match update {
            CarrierUpdate::Set(token) => {
                self.insert(AUTH_PARAM.to_string(), token);
            }
            CarrierUpdate::Remove => {
                self.remove(AUTH_PARAM);
            }
            CarrierUpdate::Unchanged => {}
        }
    }
}
