//! Session user identity

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the header name the token is sent under
pub const TOKEN_NAME_KEY: &str = "tokenName";

/// Header used when no token name has been stored
pub const DEFAULT_TOKEN_NAME: &str = "Authorization";

/// Current user as seen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    pub token: String,
    pub token_name: String,
    pub roles: BTreeSet<String>,
    pub codes: BTreeSet<String>,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            token: String::new(),
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            roles: BTreeSet::new(),
            codes: BTreeSet::new(),
        }
    }
}

impl UserInfo {
    /// Restore a user from its persisted credentials.
    ///
    /// Only the token pair survives a reload; profile fields start empty.
    pub fn from_credentials(token: Option<String>, token_name: Option<String>) -> Self {
        Self {
            token: token.unwrap_or_default(),
            token_name: token_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_NAME.to_string()),
            ..Self::default()
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Overlay the fields present in `profile`
    pub fn merge(&mut self, profile: UserProfile) {
        let UserProfile {
            name,
            token_name,
            roles,
            codes,
        } = profile;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(token_name) = token_name {
            self.token_name = token_name;
        }
        if let Some(roles) = roles {
            self.roles = roles;
        }
        if let Some(codes) = codes {
            self.codes = codes;
        }
    }
}

/// Profile returned by the user info endpoint; every field is optional and
/// absent fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub token_name: Option<String>,
    #[serde(default)]
    pub roles: Option<BTreeSet<String>>,
    #[serde(default)]
    pub codes: Option<BTreeSet<String>>,
}
