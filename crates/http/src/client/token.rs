//! Bearer token attachment

use portico_core::{DEFAULT_TOKEN_NAME, KeyValueStorage, TOKEN_KEY, TOKEN_NAME_KEY};
use reqwest::header::{HeaderName, HeaderValue};

/// Header carrying the stored token, or `None` when no token is stored.
///
/// The header name comes from storage and falls back to `Authorization`.
/// Stored values that cannot form a valid header are skipped with a warning.
pub fn bearer_header(storage: &dyn KeyValueStorage) -> Option<(HeaderName, HeaderValue)> {
    let token = storage.get_item(TOKEN_KEY).filter(|token| !token.is_empty())?;
    let token_name = storage
        .get_item(TOKEN_NAME_KEY)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_TOKEN_NAME.to_string());

    let name = match HeaderName::from_bytes(token_name.as_bytes()) {
        Ok(name) => name,
        Err(e) => {
            warn!("Stored token name {token_name:?} is not a valid header: {e}");
            return None;
        }
    };

    let mut value = match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored token is not a valid header value: {e}");
            return None;
        }
    };
    value.set_sensitive(true);

    Some((name, value))
}

/// Attach the stored bearer token to `request`
pub fn attach_token(
    request: reqwest::RequestBuilder,
    storage: &dyn KeyValueStorage,
) -> reqwest::RequestBuilder {
    match bearer_header(storage) {
        Some((name, value)) => {
            trace!(header = %name, "Attaching stored token");
            request.header(name, value)
        }
        None => request,
    }
}
