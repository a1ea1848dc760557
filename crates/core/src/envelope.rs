//! Backend response envelope and result codes

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Status code carried inside a response envelope.
///
/// The backend emits codes either as JSON strings (`"20000"`) or numbers
/// (`40001`); both normalize to the same decimal string so that lookups do
/// not depend on the wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(String);

impl ResultCode {
    /// Request succeeded
    pub const SUCCESS: &'static str = "20000";

    /// Login state has expired
    pub const LOGIN_EXPIRED: &'static str = "40001";

    /// Caller lacks the permission for this operation
    pub const PERMISSION_DENIED: &'static str = "40003";

    /// Account has been locked
    pub const ACCOUNT_LOCKED: &'static str = "40004";

    /// Server demands a fresh login
    pub const RELOGIN_REQUIRED: &'static str = "40005";

    /// Request is not authorized
    pub const UNAUTHORIZED: &'static str = "40300";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the success sentinel
    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }

    /// Read a code from an arbitrary JSON value
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => Self(s.clone()),
            other => Self(other.to_string()),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResultCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for ResultCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&String> for ResultCode {
    fn from(code: &String) -> Self {
        Self(code.clone())
    }
}

impl From<u32> for ResultCode {
    fn from(code: u32) -> Self {
        Self(code.to_string())
    }
}

impl PartialEq<str> for ResultCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ResultCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Uniform backend response wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = JsonValue> {
    pub success: bool,
    pub code: ResultCode,
    pub msg: String,
    #[serde(default)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Build a successful envelope around `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            code: ResultCode::new(ResultCode::SUCCESS),
            msg: "success".to_string(),
            data,
        }
    }

    /// Build a failed envelope
    pub fn error(code: impl Into<ResultCode>, msg: impl Into<String>, data: T) -> Self {
        let code = code.into();
        Self {
            success: code.is_success(),
            code,
            msg: msg.into(),
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

impl ApiResponse<JsonValue> {
    /// Interpret a response body as an envelope.
    ///
    /// Returns `None` when the body is not an object carrying `success`,
    /// `code` and `msg`; such bodies come from endpoints that do not use the
    /// envelope and must be passed through untouched.
    pub fn from_body(body: &JsonValue) -> Option<Self> {
        let object = body.as_object()?;
        if !(object.contains_key("success")
            && object.contains_key("code")
            && object.contains_key("msg"))
        {
            return None;
        }

        let msg = match &object["msg"] {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        };

        Some(Self {
            success: object["success"].as_bool().unwrap_or(false),
            code: ResultCode::from_json(&object["code"]),
            msg,
            data: object.get("data").cloned().unwrap_or(JsonValue::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_codes_normalize() {
        assert_eq!(ResultCode::from_json(&json!(40001)), ResultCode::from(40001_u32));
        assert_eq!(ResultCode::from_json(&json!("40001")), ResultCode::from("40001"));
        assert!(ResultCode::from_json(&json!("20000")).is_success());
        assert!(!ResultCode::from_json(&json!(20001)).is_success());
    }

    #[test]
    fn test_from_body_detects_envelope() {
        let body = json!({
            "success": false,
            "code": 40004,
            "msg": "account locked",
            "data": {"until": "tomorrow"}
        });

        let envelope = ApiResponse::from_body(&body).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.code, "40004");
        assert_eq!(envelope.msg, "account locked");
        assert_eq!(envelope.data, json!({"until": "tomorrow"}));
    }

    #[test]
    fn test_from_body_missing_data_is_null() {
        let body = json!({"success": true, "code": "20000", "msg": "ok"});
        let envelope = ApiResponse::from_body(&body).unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.data, JsonValue::Null);
    }

    #[test]
    fn test_from_body_rejects_non_envelope() {
        assert!(ApiResponse::from_body(&json!({"code": "20000", "msg": "ok"})).is_none());
        assert!(ApiResponse::from_body(&json!({"items": [1, 2, 3]})).is_none());
        assert!(ApiResponse::from_body(&json!([1, 2, 3])).is_none());
        assert!(ApiResponse::from_body(&json!("plain")).is_none());
    }

    #[test]
    fn test_success_flag_follows_code() {
        let ok = ApiResponse::ok(json!(1));
        assert!(ok.success && ok.is_success());

        let failed = ApiResponse::error(ResultCode::LOGIN_EXPIRED, "expired", JsonValue::Null);
        assert!(!failed.success);
        assert_eq!(failed.code, ResultCode::LOGIN_EXPIRED);
    }
}
