//! Solid pod access over HTTP.
//!
//! - `session`: client-credentials access tokens from the identity provider
//! - `client`: `HttpPodClient`, the reqwest-backed `PodClient`

pub mod client;
pub mod session;

pub use client::HttpPodClient;
pub use session::{SolidCredentials, SolidSession};

use expense_types::error::PodError;

/// Map a reqwest failure (connect, timeout, body read) to a transport error.
pub(crate) fn transport_error(e: reqwest::Error) -> PodError {
    PodError::Transport(e.to_string())
}
