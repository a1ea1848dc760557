//! Transport failure policy

use super::error::ClientError;
use serde_json::Value as JsonValue;

/// Decides what a caller sees when a request fails below the envelope layer
/// (connection errors, timeouts, non-2xx statuses).
///
/// Returning `Ok` substitutes a payload for the failed request; returning
/// `Err` fails the call.
pub trait TransportErrorHandler: Send + Sync {
    fn handle_error(&self, error: ClientError) -> Result<JsonValue, ClientError>;
}

/// Default policy: the caller gets the error
#[derive(Debug, Clone, Copy, Default)]
pub struct PropagateErrors;

impl TransportErrorHandler for PropagateErrors {
    fn handle_error(&self, error: ClientError) -> Result<JsonValue, ClientError> {
        debug!("Propagating transport error: {error}");
        Err(error)
    }
}

impl<F> TransportErrorHandler for F
where
    F: Fn(ClientError) -> Result<JsonValue, ClientError> + Send + Sync,
{
    fn handle_error(&self, error: ClientError) -> Result<JsonValue, ClientError> {
        self(error)
    }
}
