//! User endpoints

use portico_core::UserProfile;
use portico_http::{ApiClient, ClientError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Credentials posted to the login endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
    /// Extra fields (captcha, tenant, ...) forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl LoginPayload {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPayload")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("extra", &self.extra)
            .finish()
    }
}

/// Token pair issued by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub token_value: String,
    pub token_name: String,
}

/// Calls to the `/user` endpoints
#[derive(Debug, Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `POST /user/login`
    pub async fn login(&self, payload: &LoginPayload) -> Result<LoginResult, ClientError> {
        let request = self.client.post("/user/login").json(payload);
        self.client.execute(request).await
    }

    /// `GET /user/info`
    ///
    /// A successful reply without data yields an empty profile.
    pub async fn query_user_info(&self) -> Result<UserProfile, ClientError> {
        let request = self.client.get("/user/info");
        let profile: Option<UserProfile> = self.client.execute(request).await?;
        Ok(profile.unwrap_or_default())
    }

    /// `GET /user/logout`
    ///
    /// Special codes are not dispatched: an expired session answering the
    /// logout call must not start another logout.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let request = self.client.get("/user/logout").without_special_codes();
        self.client.execute_raw(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_flattens_extra_fields() {
        let payload = LoginPayload::new("alice", "hunter2").with_field("captcha", "x7k2");
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            body,
            json!({"username": "alice", "password": "hunter2", "captcha": "x7k2"})
        );
    }

    #[test]
    fn test_payload_debug_hides_password() {
        let payload = LoginPayload::new("alice", "hunter2");
        let debug = format!("{payload:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_login_result_wire_names() {
        let result: LoginResult =
            serde_json::from_value(json!({"tokenValue": "abc", "tokenName": "satoken"})).unwrap();
        assert_eq!(result.token_value, "abc");
        assert_eq!(result.token_name, "satoken");
    }
}
