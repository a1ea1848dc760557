//! Portico HTTP client
//!
//! Wraps `reqwest` with the conventions of an envelope-style backend: bearer
//! tokens read from durable storage, `{success, code, msg, data}` unwrapping,
//! and a registry of reactions to special result codes.

#[macro_use]
extern crate tracing;

pub mod client;

pub use reqwest::Method;

pub use client::{
    ApiClient, ApiClientBuilder, ApiRequest,
    error::ClientError,
    policy::{PropagateErrors, TransportErrorHandler},
    registry::{SpecialCodeHandler, SpecialCodeRegistry, handler_fn},
};
