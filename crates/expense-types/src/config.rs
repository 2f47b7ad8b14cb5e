//! Configuration types for the identity-provider session.

use std::fmt;
use std::str::FromStr;

/// How client credentials are presented to the identity provider's token
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    /// HTTP Basic `Authorization` header.
    ClientSecretBasic,
    /// `client_id` and `client_secret` as form fields.
    ClientSecretPost,
}

impl fmt::Display for AuthFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFlow::ClientSecretBasic => write!(f, "client_secret_basic"),
            AuthFlow::ClientSecretPost => write!(f, "client_secret_post"),
        }
    }
}

impl FromStr for AuthFlow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client_secret_basic" => Ok(AuthFlow::ClientSecretBasic),
            "client_secret_post" => Ok(AuthFlow::ClientSecretPost),
            other => Err(format!("unsupported auth flow: '{other}'")),
        }
    }
}
