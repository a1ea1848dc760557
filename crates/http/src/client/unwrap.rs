//! Envelope unwrapping

use super::{error::ClientError, registry::SpecialCodeRegistry};
use portico_core::ApiResponse;
use serde_json::Value as JsonValue;

/// Extract the payload of a response body.
///
/// Envelopes with the success code yield their `data`. Any other code is
/// offered to `registry` and then fails with the server message. Bodies that
/// are not envelopes pass through unchanged.
pub async fn unwrap_response(
    body: JsonValue,
    registry: Option<&SpecialCodeRegistry>,
) -> Result<JsonValue, ClientError> {
    let Some(envelope) = ApiResponse::from_body(&body) else {
        return Ok(body);
    };

    if envelope.is_success() {
        return Ok(envelope.data);
    }

    debug!(code = %envelope.code, "Backend reported failure: {}", envelope.msg);

    if let Some(registry) = registry {
        registry
            .handle(&envelope.code, &envelope.msg, &envelope.data)
            .await;
    }

    Err(ClientError::Api {
        code: envelope.code,
        message: envelope.msg,
        data: envelope.data,
    })
}
