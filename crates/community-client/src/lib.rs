//! JSON transport for the community backend.
//!
//! [`ApiClient`] wraps a `reqwest::Client` bound to one origin. Every call is
//! a single request with no retry. A non-2xx status becomes a
//! [`ClientError::Server`] carrying the backend's `message` field, or a
//! per-method fallback when the body has none.

pub mod endpoints;
pub mod error;
pub mod transport;

pub use error::ClientError;
pub use reqwest::Method;
pub use transport::{ApiClient, ApiClientBuilder};
