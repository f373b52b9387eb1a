pub mod clock;
pub mod errors;
pub mod jwk;
pub mod metrics;
pub mod prelude;
pub mod source;
pub mod store;
