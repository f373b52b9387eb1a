//! authgate: bearer-token request authorizer.
//!
//! Exposes the host pieces (settings, event envelope, HTTP router) for the binary
//! and for integration tests.

pub mod cli;
pub mod config;
pub mod host;
pub mod server;

pub use config::{load_settings, AuthgateSettings};
pub use host::{handle_event, AuthGate, AuthorizerResponse, TokenAuthorizerEvent};
pub use server::{build_router, ServeState};
