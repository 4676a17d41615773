//! Insight session - token session manager for the Insight security API
//!
//! Acquires an access token with a signed one-time code, caches it, refreshes
//! it once it passes its soft expiry and logs in again when the refresh
//! token is dead or revoked.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

pub use api::{Endpoints, HttpTransport, Transport};
pub use auth::{
    AccessTokenClaims, Credentials, Session, SessionOptions, SessionStatus, TokenPackage,
};
pub use config::Config;
pub use error::{Error, Result};

/// Build a session over HTTP from a loaded configuration.
pub fn connect(config: &Config) -> Result<Session> {
    let endpoints = config.endpoints()?;
    let transport = HttpTransport::with_timeout(config.timeout())?;
    Ok(Session::with_options(
        Arc::new(transport),
        endpoints,
        &config.credentials(),
        config.session_options(),
    ))
}
