//! Portico session management
//!
//! Holds the signed-in user, persists the token pair, and reacts to
//! auth-failure result codes by tearing the session down and sending the
//! user to the login route.

pub mod api;
pub mod context;
pub mod error;
pub mod handlers;
pub mod router;
pub mod store;

pub use api::{LoginPayload, LoginResult, UserApi};
pub use context::SessionContext;
pub use error::SessionError;
pub use router::{HistoryRouter, Location, Router};
pub use store::{NavigationPaths, SessionState, UserStore};
